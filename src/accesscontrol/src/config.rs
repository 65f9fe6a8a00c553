//! Access control configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AccessControlError, Result};
use crate::scope::DEFAULT_RESOLUTION_TTL;

/// Environment variable turning access control on or off
pub const ENV_ENABLED: &str = "ACCESSCONTROL_ENABLED";
/// Environment variable toggling evaluation metrics
pub const ENV_ENABLE_METRICS: &str = "ACCESSCONTROL_ENABLE_METRICS";
/// Environment variable toggling the scope resolution cache
pub const ENV_RESOLUTION_CACHE: &str = "ACCESSCONTROL_RESOLUTION_CACHE";
/// Environment variable holding the resolution cache TTL in seconds
pub const ENV_RESOLUTION_CACHE_TTL: &str = "ACCESSCONTROL_RESOLUTION_CACHE_TTL";

/// Access control configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Access control is enforced. Callers check
    /// [`AccessControl::is_disabled`](crate::AccessControl::is_disabled)
    /// before evaluating.
    pub enabled: bool,

    /// Record evaluation duration and count
    pub enable_metrics: bool,

    /// Cache scope resolutions per organization
    pub resolution_cache_enabled: bool,

    /// How long a resolution stays cached
    #[serde(with = "duration_secs")]
    pub resolution_cache_ttl: Duration,
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_metrics: true,
            resolution_cache_enabled: true,
            resolution_cache_ttl: DEFAULT_RESOLUTION_TTL,
        }
    }
}

impl AccessControlConfig {
    /// Defaults overridden by `ACCESSCONTROL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENABLED) {
            config.enabled = parse_bool(ENV_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_ENABLE_METRICS) {
            config.enable_metrics = parse_bool(ENV_ENABLE_METRICS, &value)?;
        }
        if let Some(value) = lookup(ENV_RESOLUTION_CACHE) {
            config.resolution_cache_enabled = parse_bool(ENV_RESOLUTION_CACHE, &value)?;
        }
        if let Some(value) = lookup(ENV_RESOLUTION_CACHE_TTL) {
            let secs = value.trim().parse::<u64>().map_err(|e| {
                AccessControlError::InvalidConfig(format!("{}={:?}: {}", ENV_RESOLUTION_CACHE_TTL, value, e))
            })?;
            config.resolution_cache_ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution_cache_enabled && self.resolution_cache_ttl.is_zero() {
            return Err(AccessControlError::InvalidConfig(
                "resolution cache is enabled with a zero TTL".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AccessControlError::InvalidConfig(format!(
            "{}={:?}: expected a boolean",
            key, other
        ))),
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
