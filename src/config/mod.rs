//! Runtime configuration for an [`EntityMachine`](crate::machine::EntityMachine).
//!
//! # Example
//!
//! ```rust
//! use modality::config::{ConfigBuilder, MachineConfig};
//! use std::time::Duration;
//!
//! let config = ConfigBuilder::new()
//!     .hook_timeout(Duration::from_secs(5))
//!     .audit_hooks(false)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.post_hook_timeout(), Some(Duration::from_secs(5)));
//!
//! let parsed = MachineConfig::from_json(r#"{ "hook_timeout_ms": 5000, "audit_hooks": false }"#).unwrap();
//! assert_eq!(parsed, config);
//! ```

mod builder;

pub use builder::ConfigBuilder;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Machine settings.
///
/// Timeouts are optional; without one, hooks run to completion. A timeout
/// passed to
/// [`transition_within`](crate::machine::EntityMachine::transition_within)
/// overrides both values for that call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Default timeout for pre-hooks and reassignment hooks
    pub hook_timeout_ms: Option<u64>,

    /// Timeout for post-hooks; falls back to `hook_timeout_ms`
    pub post_hook_timeout_ms: Option<u64>,

    /// Record successful hook invocations, not just failures
    pub audit_hooks: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            hook_timeout_ms: None,
            post_hook_timeout_ms: None,
            audit_hooks: true,
        }
    }
}

impl MachineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hook_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout {
                field: "hook_timeout_ms",
            });
        }
        if self.post_hook_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout {
                field: "post_hook_timeout_ms",
            });
        }
        Ok(())
    }

    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }

    pub fn post_hook_timeout(&self) -> Option<Duration> {
        self.post_hook_timeout_ms
            .map(Duration::from_millis)
            .or_else(|| self.hook_timeout())
    }
}
