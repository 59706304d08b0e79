use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use witlink_common::{AccelUnit, DecoderConfig};

use crate::error::ConfigError;
use crate::transport::{NOTIFY_CHAR_UUID, SERVICE_UUID, WRITE_CHAR_UUID};

/// Session settings. Every field has a default, so a config file only needs
/// to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub accel_unit: AccelUnit,
    /// delay between handshake steps
    pub settle_interval_ms: u64,
    pub poll_interval_ms: u64,
    /// register to poll, `None` disables polling
    pub poll_register: Option<u8>,
    pub poll_start_delay_ms: u64,
    /// count quaternion samples that are far from unit norm
    pub plausibility_check: bool,
    pub service_uuid: String,
    pub notify_char_uuid: String,
    pub write_char_uuid: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            accel_unit: AccelUnit::MetersPerSecondSquared,
            settle_interval_ms: 100,
            poll_interval_ms: 100,
            poll_register: Some(witlink_common::cmd::REG_QUATERNION),
            poll_start_delay_ms: 3000,
            plausibility_check: true,
            service_uuid: SERVICE_UUID.to_string(),
            notify_char_uuid: NOTIFY_CHAR_UUID.to_string(),
            write_char_uuid: WRITE_CHAR_UUID.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// A poll interval of zero would spin. Only checked while polling is on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_register.is_some() && self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll_interval_ms"));
        }
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            accel_unit: self.accel_unit,
        }
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_start_delay(&self) -> Duration {
        Duration::from_millis(self.poll_start_delay_ms)
    }
}
