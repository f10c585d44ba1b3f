//! cardiac.toml configuration parser.
//!
//! The file model keeps every field optional so a partial file (or none at
//! all) is valid. [`ResolverSettings`] is the resolved form with defaults
//! filled in, which is what the resolver and client consume.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candidates::NamingConventions;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardiacConfig {
    pub endpoint: Option<EndpointConfig>,
    pub health: Option<HealthConfig>,
    pub request: Option<RequestConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub api_url: Option<String>,
    pub local_url: Option<String>,
    pub default_backend: Option<String>,
    pub platform_domain: Option<String>,
    pub predict_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConfig {
    pub path: Option<String>,
    pub timeout: Option<String>,
    pub field: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub timeout: Option<String>,
}

impl CardiacConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The explicit backend override from the file, if any.
    pub fn api_url(&self) -> Option<&str> {
        self.endpoint.as_ref().and_then(|e| e.api_url.as_deref())
    }

    /// Resolve into concrete settings, filling unset fields with defaults.
    pub fn settings(&self) -> ConfigResult<ResolverSettings> {
        let defaults = ResolverSettings::default();
        let endpoint = self.endpoint.clone().unwrap_or_default();
        let health = self.health.clone().unwrap_or_default();
        let request = self.request.clone().unwrap_or_default();

        let health_timeout =
            timeout_setting("health.timeout", health.timeout, defaults.health_timeout)?;
        let request_timeout =
            timeout_setting("request.timeout", request.timeout, defaults.request_timeout)?;

        Ok(ResolverSettings {
            local_url: endpoint.local_url.unwrap_or(defaults.local_url),
            conventions: NamingConventions {
                default_backend: endpoint
                    .default_backend
                    .unwrap_or(defaults.conventions.default_backend),
                platform_domain: endpoint
                    .platform_domain
                    .unwrap_or(defaults.conventions.platform_domain),
                predict_path: endpoint
                    .predict_path
                    .unwrap_or(defaults.conventions.predict_path),
            },
            health_path: health.path.unwrap_or(defaults.health_path),
            health_timeout,
            health_field: health.field.unwrap_or(defaults.health_field),
            health_value: health.value.unwrap_or(defaults.health_value),
            request_timeout,
        })
    }
}

/// Concrete endpoint discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Backend used when the client runs on a loopback host.
    pub local_url: String,
    /// Conventions for deriving candidates from the host name.
    pub conventions: NamingConventions,
    /// Health route, relative to the backend root.
    pub health_path: String,
    /// Upper bound on each health probe.
    pub health_timeout: Duration,
    /// JSON field in the health body that signals liveness.
    pub health_field: String,
    /// Value of `health_field` meaning healthy.
    pub health_value: String,
    /// Upper bound on a prediction request.
    pub request_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            local_url: "http://localhost:8000/predict".to_string(),
            conventions: NamingConventions::default(),
            health_path: "/".to_string(),
            health_timeout: Duration::from_secs(3),
            health_field: "status".to_string(),
            health_value: "ok".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Resolve an optional timeout field. Zero is rejected: a zero bound
/// would fail every probe or request before it is sent.
fn timeout_setting(
    field: &'static str,
    value: Option<String>,
    default: Duration,
) -> ConfigResult<Duration> {
    let Some(value) = value else {
        return Ok(default);
    };
    match parse_duration(&value) {
        Some(timeout) if !timeout.is_zero() => Ok(timeout),
        _ => Err(ConfigError::InvalidDuration { field, value }),
    }
}

/// Parse a timeout such as "3s", "750ms", "2m" or a bare number of seconds.
///
/// Returns `None` for unknown units and for amounts that overflow.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (amount, unit) = s.split_at(digits_end);
    let amount: u64 = amount.parse().ok()?;
    match unit.trim_start() {
        "" | "s" => Some(Duration::from_secs(amount)),
        "ms" => Some(Duration::from_millis(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs),
        _ => None,
    }
}
