//! AES-256-GCM attribute encryption primitives.
//!
//! This module is intentionally free of configuration and persistence
//! dependencies. It provides the master key type and the low-level
//! encrypt/decrypt operations used by the attribute codec.
//!
//! # Envelope format
//!
//! ```text
//! base64(nonce || ciphertext+tag)
//! ```
//!
//! The 12-byte nonce is generated fresh per encryption and carried at the
//! front of the decoded envelope; the 16-byte authentication tag is appended
//! to the ciphertext by the AEAD and is not separately framed.

pub mod cipher;
pub mod key;

pub use cipher::{CipherError, FieldCipher, KEY_LEN, NONCE_LEN};
pub use key::{KeyError, MasterKey};
