//! Prediction client.
//!
//! Sends one opaque JSON payload to the resolved backend and hands back
//! the opaque JSON answer. No retries: a failed request is reported to the
//! caller, who decides what to show the user.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use cardiac_core::{Endpoint, ExecutionContext, ResolverSettings};
use cardiac_resolver::{EndpointResolver, HyperTransport, TransportError};

use crate::error::{PredictionError, PredictionResult};

/// Posts feature payloads to the backend chosen by an [`EndpointResolver`].
#[derive(Clone)]
pub struct PredictionClient {
    resolver: Arc<EndpointResolver>,
    request_timeout: Duration,
}

impl PredictionClient {
    /// Create a client sharing an existing resolver.
    pub fn new(resolver: Arc<EndpointResolver>) -> Self {
        let request_timeout = resolver.settings().request_timeout;
        Self {
            resolver,
            request_timeout,
        }
    }

    /// Create a client and its resolver over the default hyper transport.
    pub fn connect(
        context: ExecutionContext,
        settings: ResolverSettings,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(HyperTransport::new()?);
        let resolver = EndpointResolver::new(context, settings, transport);
        Ok(Self::new(Arc::new(resolver)))
    }

    /// Builder method: bound each prediction request by `timeout`.
    pub fn with_request_timeout(self, timeout: Duration) -> Self {
        Self {
            request_timeout: timeout,
            ..self
        }
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// The endpoint requests go to, if discovery has already completed.
    pub fn current_endpoint(&self) -> Option<Endpoint> {
        self.resolver.current()
    }

    /// POST `payload` to the backend and return its JSON response verbatim.
    pub async fn predict<T>(&self, payload: &T) -> PredictionResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(PredictionError::Encode)?;
        let endpoint = self.resolver.resolve().await;

        let result = self.send(&endpoint, Bytes::from(body)).await;
        if let Err(e) = &result {
            error!(endpoint = %endpoint, error = %e, "prediction request failed");
        }
        result
    }

    async fn send(&self, endpoint: &Endpoint, body: Bytes) -> PredictionResult<Value> {
        let transport = self.resolver.transport();
        let url = endpoint.url();
        debug!(%url, bytes = body.len(), "sending prediction request");

        let response =
            match tokio::time::timeout(self.request_timeout, transport.post_json(url, body)).await
            {
                Ok(Ok(response)) => response,
                Ok(Err(source)) => {
                    return Err(PredictionError::Transport {
                        endpoint: url.to_string(),
                        source,
                    });
                }
                Err(_) => {
                    return Err(PredictionError::Transport {
                        endpoint: url.to_string(),
                        source: TransportError::Timeout(self.request_timeout),
                    });
                }
            };

        if !response.status.is_success() {
            return Err(PredictionError::Status {
                endpoint: url.to_string(),
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| PredictionError::Decode {
            endpoint: url.to_string(),
            source,
        })
    }
}
