//! cardiac-client — the prediction request path.
//!
//! Resolves the backend through `cardiac-resolver` and posts the feature
//! payload to it. Payloads and responses are opaque JSON; this crate does
//! not validate or reshape them.

pub mod client;
pub mod error;

pub use client::PredictionClient;
pub use error::{PredictionError, PredictionResult};
