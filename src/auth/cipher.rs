// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subject cipher (AES-256-CBC).
//!
//! The token subject (a user identifier) is never placed in the signed
//! payload in clear. It is encrypted under the process cipher key with a
//! fresh random IV per call.
//!
//! ## Envelope Layout
//!
//! ```text
//! base64url( ciphertext || iv )
//! ```
//!
//! The IV is always the trailing [`IV_LENGTH`] bytes; the ciphertext is
//! PKCS#7 padded and therefore a non-empty multiple of the block size.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64ct::{Base64UrlUnpadded, Encoding};
use ring::rand::{SecureRandom, SystemRandom};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Cipher key length in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// IV length in bytes (one AES block).
pub const IV_LENGTH: usize = 16;

const BLOCK_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("cipher key must be {KEY_LENGTH} bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("cipher IV length must be {IV_LENGTH}, got {0}")]
    InvalidIvLength(usize),

    #[error("failed to generate initialization vector")]
    Random,

    #[error("ciphertext envelope is malformed: {0}")]
    MalformedEnvelope(&'static str),

    #[error("decryption failed (bad key or padding)")]
    Decrypt,

    #[error("decrypted subject is not valid UTF-8")]
    InvalidUtf8,
}

/// Encrypts and decrypts token subjects.
///
/// Holds only immutable key material and a system RNG handle, so a single
/// instance is shared across all requests without locking.
#[derive(Clone)]
pub struct SubjectCipher {
    key: [u8; KEY_LENGTH],
    rng: SystemRandom,
}

impl SubjectCipher {
    /// Create a cipher from raw key bytes and the configured IV length.
    ///
    /// Both values come from process configuration; a mismatch is a
    /// startup error, never a per-request one.
    pub fn new(key: &[u8], iv_length: usize) -> Result<Self, CipherError> {
        if iv_length != IV_LENGTH {
            return Err(CipherError::InvalidIvLength(iv_length));
        }
        let key: [u8; KEY_LENGTH] = key
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;

        Ok(Self {
            key,
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt `plaintext` into a `ciphertext || iv` envelope.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut iv = [0u8; IV_LENGTH];
        self.rng.fill(&mut iv).map_err(|_| CipherError::Random)?;

        let encryptor = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|_| CipherError::InvalidKeyLength(self.key.len()))?;
        let mut envelope = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        envelope.extend_from_slice(&iv);

        Ok(Base64UrlUnpadded::encode_string(&envelope))
    }

    /// Decrypt an envelope produced by [`SubjectCipher::encrypt`].
    pub fn decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        let raw = Base64UrlUnpadded::decode_vec(envelope)
            .map_err(|_| CipherError::MalformedEnvelope("not base64url"))?;

        if raw.len() < BLOCK_SIZE + IV_LENGTH {
            return Err(CipherError::MalformedEnvelope("too short"));
        }

        let (ciphertext, iv) = raw.split_at(raw.len() - IV_LENGTH);
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::MalformedEnvelope("ciphertext is not block aligned"));
        }

        let decryptor = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|_| CipherError::MalformedEnvelope("bad iv"))?;
        let plaintext = decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}

impl std::fmt::Debug for SubjectCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn cipher() -> SubjectCipher {
        SubjectCipher::new(KEY, IV_LENGTH).unwrap()
    }

    #[test]
    fn round_trips_user_id() {
        let cipher = cipher();
        let id = "9aa98e23-24ec-4403-8517-ca27968cfe25";

        let envelope = cipher.encrypt(id).unwrap();
        assert_ne!(envelope, id);
        assert_eq!(cipher.decrypt(&envelope).unwrap(), id);
    }

    #[test]
    fn round_trips_empty_and_block_sized_input() {
        let cipher = cipher();
        for plaintext in ["", "exactly16bytes!!", "a"] {
            let envelope = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn fresh_iv_per_call() {
        let cipher = cipher();
        let a = cipher.encrypt("user_123").unwrap();
        let b = cipher.encrypt("user_123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn iv_is_trailing_segment() {
        let cipher = cipher();
        let envelope = cipher.encrypt("user_123").unwrap();
        let raw = Base64UrlUnpadded::decode_vec(&envelope).unwrap();
        // "user_123" pads to a single block, followed by the IV.
        assert_eq!(raw.len(), BLOCK_SIZE + IV_LENGTH);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            SubjectCipher::new(b"short", IV_LENGTH),
            Err(CipherError::InvalidKeyLength(5))
        ));
        assert!(matches!(
            SubjectCipher::new(KEY, 12),
            Err(CipherError::InvalidIvLength(12))
        ));
    }

    #[test]
    fn rejects_short_envelope() {
        let short = Base64UrlUnpadded::encode_string(&[0u8; IV_LENGTH]);
        assert!(matches!(
            cipher().decrypt(&short),
            Err(CipherError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn rejects_unaligned_envelope() {
        let unaligned = Base64UrlUnpadded::encode_string(&[7u8; BLOCK_SIZE + IV_LENGTH + 3]);
        assert!(matches!(
            cipher().decrypt(&unaligned),
            Err(CipherError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn rejects_non_base64_envelope() {
        assert!(matches!(
            cipher().decrypt("not a valid envelope!"),
            Err(CipherError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn wrong_key_does_not_recover_plaintext() {
        let envelope = cipher().encrypt("user_123").unwrap();
        let other = SubjectCipher::new(b"fedcba9876543210fedcba9876543210", IV_LENGTH).unwrap();
        match other.decrypt(&envelope) {
            Ok(plaintext) => assert_ne!(plaintext, "user_123"),
            Err(e) => assert!(matches!(e, CipherError::Decrypt | CipherError::InvalidUtf8)),
        }
    }

    #[test]
    fn debug_does_not_print_key() {
        assert_eq!(format!("{:?}", cipher()), "SubjectCipher { .. }");
    }
}
