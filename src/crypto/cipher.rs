//! AES-256-GCM encryption and decryption of individual attribute values.
//!
//! Every encryption generates a fresh random 96-bit nonce via the OS CSPRNG,
//! so identical plaintext under the same key never produces the same
//! envelope twice. The nonce travels at the front of the decoded envelope;
//! decryption splits it back out before verifying the authentication tag.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::key::MasterKey;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
///
/// Decrypt-side failures are routine — every legacy plaintext row read
/// through the codec ends up here — so no variant carries the offending
/// input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The stored value is not base64, or decodes to fewer bytes than a
    /// nonce and tag occupy.
    #[error("invalid envelope format")]
    InvalidFormat,

    /// AEAD encryption failed, or tag verification rejected the envelope
    /// (corrupted data, wrong key, or non-ciphertext input).
    #[error("aead operation failed")]
    AeadFailure,

    /// The envelope authenticated but the payload is not valid UTF-8.
    /// Cannot happen for envelopes produced by [`FieldCipher::encrypt`].
    #[error("decrypted payload is not valid utf-8")]
    NotUtf8,
}

/// Stateless AES-256-GCM engine bound to the process master key.
///
/// Construction is infallible: [`MasterKey`] enforces the key length. The
/// engine holds no mutable state and is safe to share across threads; each
/// call generates its own nonce.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Build the cipher from the master key.
    pub fn new(key: &MasterKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt a plaintext attribute value.
    ///
    /// Returns the standard-base64 envelope `nonce || ciphertext+tag`. Each
    /// call produces a distinct envelope for identical input because the
    /// nonce is freshly random. The random 96-bit nonce gives negligible
    /// collision probability for realistic per-key volumes; callers
    /// anticipating more than 2^32 encryptions under one key must rotate
    /// the key out of band.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::AeadFailure`] if the AEAD primitive fails.
    /// This is a fatal condition, not something to retry.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        use aes_gcm::aead::rand_core::RngCore;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::AeadFailure)?;

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(framed))
    }

    /// Decrypt an envelope produced by [`FieldCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if the envelope is not base64
    /// or is too short to hold a nonce and tag, and
    /// [`CipherError::AeadFailure`] if tag verification fails. Both are
    /// expected for legacy plaintext values and carry no input data.
    pub fn decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        let decoded = STANDARD
            .decode(envelope)
            .map_err(|_| CipherError::InvalidFormat)?;
        if decoded.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::InvalidFormat);
        }

        let (nonce_bytes, ciphertext) = decoded.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::AeadFailure)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8)
    }
}
