// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{health::HealthResponse, identity::IdentityResponse},
    auth::tokenwall,
    state::AppState,
};

pub mod health;
pub mod identity;

pub fn router(state: AppState) -> Router {
    let access_routes = Router::new()
        .route("/whoami", get(identity::whoami))
        .route_layer(from_fn_with_state(state.access_wall(), tokenwall));

    let activation_routes = Router::new()
        .route("/activation", get(identity::activation))
        .route_layer(from_fn_with_state(state.activation_wall(), tokenwall));

    let v1_routes = access_routes.merge(activation_routes);

    Router::new()
        .route("/health", get(health::liveness))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(health::liveness, identity::whoami, identity::activation),
    components(schemas(HealthResponse, IdentityResponse)),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Identity", description = "Token-gated identity resolution")
    )
)]
struct ApiDoc;
