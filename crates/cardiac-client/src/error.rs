//! Prediction client error types.

use http::StatusCode;
use thiserror::Error;

use cardiac_resolver::TransportError;

/// Result type alias for prediction requests.
pub type PredictionResult<T> = Result<T, PredictionError>;

/// Errors surfaced by a prediction request.
///
/// Endpoint discovery never fails, so every variant describes the single
/// request made to the already-resolved endpoint.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("failed to encode prediction payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("prediction request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("backend at {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("backend at {endpoint} returned invalid JSON: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PredictionError {
    /// Message suitable for showing to the person filling in the form.
    pub const USER_MESSAGE: &'static str = "Failed to get prediction. Please try again.";

    pub fn user_message(&self) -> &'static str {
        Self::USER_MESSAGE
    }

    /// The endpoint the failed request was sent to, if one was resolved.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            PredictionError::Encode(_) => None,
            PredictionError::Transport { endpoint, .. }
            | PredictionError::Status { endpoint, .. }
            | PredictionError::Decode { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}
