//! Health probe logic.
//!
//! A backend is healthy when its health route answers `200 OK` with a JSON
//! body whose marker field carries the expected value, e.g.
//! `{"status": "ok"}`.

use std::time::Duration;

use http::StatusCode;
use serde_json::Value;
use tracing::debug;

use cardiac_core::ResolverSettings;

use crate::transport::HttpTransport;

/// Result of a single health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// 200 with the healthy marker in the body.
    Healthy,
    /// The backend answered, but not with a healthy 200.
    Unhealthy,
    /// The probe could not be executed (connection error or timeout).
    Failed,
}

/// JSON field/value pair that marks a health body as healthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthMarker {
    pub field: String,
    pub value: String,
}

impl HealthMarker {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn from_settings(settings: &ResolverSettings) -> Self {
        Self::new(settings.health_field.clone(), settings.health_value.clone())
    }

    /// Whether `body` is a JSON object carrying this marker.
    pub fn matches(&self, body: &[u8]) -> bool {
        match serde_json::from_slice::<Value>(body) {
            Ok(json) => json.get(&self.field).and_then(Value::as_str) == Some(self.value.as_str()),
            Err(_) => false,
        }
    }
}

impl Default for HealthMarker {
    fn default() -> Self {
        Self::new("status", "ok")
    }
}

/// Probe `health_url` once, bounded by `timeout`.
pub async fn http_probe(
    transport: &dyn HttpTransport,
    health_url: &str,
    marker: &HealthMarker,
    timeout: Duration,
) -> ProbeResult {
    let response = match tokio::time::timeout(timeout, transport.get(health_url)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            debug!(error = %e, url = %health_url, "health probe request failed");
            return ProbeResult::Failed;
        }
        Err(_) => {
            debug!(url = %health_url, ?timeout, "health probe timed out");
            return ProbeResult::Failed;
        }
    };

    if response.status != StatusCode::OK {
        debug!(status = %response.status, url = %health_url, "health probe non-200");
        return ProbeResult::Unhealthy;
    }

    if !marker.matches(&response.body) {
        debug!(
            url = %health_url,
            field = %marker.field,
            "health probe body missing healthy marker"
        );
        return ProbeResult::Unhealthy;
    }

    ProbeResult::Healthy
}
