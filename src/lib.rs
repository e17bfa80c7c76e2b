//! `fieldseal` — transparent field-level encryption for persisted attributes.
//!
//! Sensitive text attributes are encrypted before they reach storage and
//! decrypted on read. Values written before encryption was introduced stay
//! readable: a stored value that does not authenticate as ciphertext is
//! returned unchanged.
//!
//! # Data flow
//!
//! 1. Application code sets a plain attribute value.
//! 2. The persistence layer calls [`AttributeCodec::to_storage`] before the
//!    marked attribute is written; the value is encrypted and an opaque
//!    base64 envelope is persisted.
//! 3. On read, the persistence layer calls [`AttributeCodec::from_storage`];
//!    the envelope is decrypted, or — for legacy plaintext rows — the stored
//!    text is returned as-is.
//!
//! # Envelope format
//!
//! ```text
//! base64(nonce || ciphertext+tag)
//! ```
//!
//! 12-byte random nonce, AES-256-GCM ciphertext with the 128-bit
//! authentication tag appended by the AEAD.
//!
//! # Key handling
//!
//! The AES-256 master key is read once at startup from the `ENCRYPTION_KEY`
//! environment variable (base64). Startup must abort if the key is missing or
//! malformed. Rotating the key without a data migration makes previously
//! encrypted values undecryptable — they degrade to the legacy-plaintext
//! fallback and surface as opaque base64 text.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod telemetry;

pub use codec::AttributeCodec;
pub use config::Config;
pub use crypto::cipher::{CipherError, FieldCipher};
pub use crypto::key::{KeyError, MasterKey};
