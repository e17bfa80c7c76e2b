//! [`MasterKey`]: the process-wide AES-256 master key.
//!
//! Decoded once at startup from its base64 configuration value and passed by
//! reference into [`FieldCipher`](super::cipher::FieldCipher) at construction
//! time. The key is immutable for the process lifetime and lives only in
//! memory; it is never rotated in-process and never persisted by this crate.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::cipher::KEY_LEN;

/// Errors produced when decoding the configured master key.
///
/// Any of these is fatal at startup: the service must never proceed with a
/// missing, default, or truncated key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The configured value is empty or whitespace-only.
    #[error("encryption key is not configured")]
    Missing,

    /// The configured value is not valid base64.
    #[error("encryption key is not valid base64")]
    NotBase64,

    /// The configured value decodes to the wrong number of bytes.
    #[error("encryption key must decode to {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size buffer holding the AES-256 master key.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which key material lives in RAM.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Decode a base64-encoded 256-bit key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] for an empty value,
    /// [`KeyError::NotBase64`] if decoding fails, and
    /// [`KeyError::InvalidLength`] if the decoded material is not exactly
    /// [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(KeyError::Missing);
        }

        let mut decoded = STANDARD.decode(encoded).map_err(|_| KeyError::NotBase64)?;
        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(KeyError::InvalidLength(len));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        // Wipe the intermediate buffer; only the MasterKey keeps the material.
        decoded.zeroize();

        Ok(Self { bytes })
    }

    /// Borrow the raw key bytes. Callers must treat them as read-only and
    /// must not log or persist them.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("MasterKey([REDACTED])")
    }
}
