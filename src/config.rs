//! Configuration loading and validation.
//!
//! All values are read from environment variables at startup. The process
//! must abort with a clear error if the encryption key is missing or
//! malformed — it never proceeds with a default or absent key.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::key::{KeyError, MasterKey};

/// Validated crate configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded 256-bit AES master key. **Required.**
    ///
    /// Rotating this value without migrating stored data makes previously
    /// encrypted values permanently undecryptable — they degrade to the
    /// legacy-plaintext fallback. A deployment hazard, not a runtime error.
    pub encryption_key: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first
    /// failure.
    fn validate(&self) -> Result<()> {
        if self.encryption_key.trim().is_empty() {
            anyhow::bail!("ENCRYPTION_KEY is required and must not be empty");
        }
        Ok(())
    }

    /// Decode the configured master key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the value is not base64 or does not decode to
    /// a 256-bit key. Fatal at startup.
    pub fn master_key(&self) -> Result<MasterKey, KeyError> {
        MasterKey::from_base64(&self.encryption_key)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key value must never reach logs, so Debug is written by hand.
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn valid_key() -> String {
        STANDARD.encode([0x42u8; crate::crypto::cipher::KEY_LEN])
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_rejects_empty_key() {
        let cfg = Config {
            encryption_key: "".into(),
            log_level: default_log_level(),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_a_configured_key() {
        let cfg = Config {
            encryption_key: valid_key(),
            log_level: default_log_level(),
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn master_key_decodes_the_configured_value() {
        let cfg = Config {
            encryption_key: valid_key(),
            log_level: default_log_level(),
        };
        assert!(cfg.master_key().is_ok());
    }

    #[test]
    fn master_key_rejects_garbage() {
        let cfg = Config {
            encryption_key: "not a key".into(),
            log_level: default_log_level(),
        };
        assert!(cfg.master_key().is_err());
    }

    #[test]
    fn debug_redacts_the_key() {
        let cfg = Config {
            encryption_key: valid_key(),
            log_level: default_log_level(),
        };
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains(&cfg.encryption_key));
    }
}
