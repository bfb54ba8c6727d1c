//! Builder API for machine configuration.

use super::{ConfigError, MachineConfig};
use std::time::Duration;

/// Builder for [`MachineConfig`]
pub struct ConfigBuilder {
    config: MachineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
        }
    }

    /// Set the default hook timeout
    pub fn hook_timeout(mut self, timeout: Duration) -> Self {
        self.config.hook_timeout_ms = Some(millis(timeout));
        self
    }

    /// Set a separate timeout for post-hooks
    pub fn post_hook_timeout(mut self, timeout: Duration) -> Self {
        self.config.post_hook_timeout_ms = Some(millis(timeout));
        self
    }

    /// Record successful hook invocations (default `true`)
    pub fn audit_hooks(mut self, enabled: bool) -> Self {
        self.config.audit_hooks = enabled;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<MachineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
