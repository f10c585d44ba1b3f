//! HTTP transport used for health probes and prediction requests.
//!
//! [`HttpTransport`] is the seam between discovery logic and the network:
//! the resolver and the prediction client only ever see this trait, so
//! tests inject a scripted implementation. [`HyperTransport`] is the real
//! one: one HTTP/1.1 connection per request over tokio TCP, wrapped in
//! rustls for `https` URLs.
//!
//! Timeouts are applied by callers, not by the transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::{TransportError, TransportResult};

const DEFAULT_USER_AGENT: &str = concat!("cardiac-resolver/", env!("CARGO_PKG_VERSION"));

/// Status and fully-buffered body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Boxed future alias for transport results.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + 'a>>;

/// Minimal HTTP client surface needed by discovery and prediction.
///
/// Implementations must not retry; each call is a single attempt.
pub trait HttpTransport: Send + Sync {
    /// Issue a GET to `url`.
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a>;

    /// POST `body` as `application/json` to `url`.
    fn post_json<'a>(&'a self, url: &'a str, body: Bytes) -> TransportFuture<'a>;
}

// ── TlsConfig ────────────────────────────────────────────────────────

/// TLS settings for `https` backends.
#[derive(Clone)]
pub struct TlsConfig {
    /// Pre-built `rustls` client configuration.
    pub client_config: Arc<rustls::ClientConfig>,
}

impl TlsConfig {
    /// Create a TLS config trusting the Mozilla root certificate store.
    pub fn with_webpki_roots() -> TransportResult<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .map_err(|e| TransportError::Tls(format!("tls protocol version error: {e}")))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

        Ok(Self {
            client_config: Arc::new(config),
        })
    }
}

impl From<Arc<rustls::ClientConfig>> for TlsConfig {
    fn from(client_config: Arc<rustls::ClientConfig>) -> Self {
        Self { client_config }
    }
}

// ── HyperTransport ───────────────────────────────────────────────────

/// Connection-per-request HTTP/1.1 client built on hyper.
#[derive(Clone)]
pub struct HyperTransport {
    tls: TlsConfig,
    user_agent: String,
}

impl HyperTransport {
    /// Create a transport trusting the Mozilla root store.
    pub fn new() -> TransportResult<Self> {
        Ok(Self::with_tls(TlsConfig::with_webpki_roots()?))
    }

    /// Create a transport with a caller-supplied TLS configuration.
    pub fn with_tls(tls: TlsConfig) -> Self {
        Self {
            tls,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Builder method: override the `user-agent` header.
    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..self
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
    ) -> TransportResult<HttpResponse> {
        let target = Target::parse(url)?;

        let builder = Request::builder()
            .method(method)
            .uri(target.path_and_query.as_str())
            .header(HOST, target.authority.as_str())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json");
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(body))?,
            None => builder.body(Full::new(Bytes::new()))?,
        };

        let stream = TcpStream::connect((target.host.as_str(), target.port))
            .await
            .map_err(|source| TransportError::Connect {
                authority: target.authority.clone(),
                source,
            })?;

        if !target.tls {
            return exchange(stream, request).await;
        }

        let server_name = ServerName::try_from(target.host.clone())
            .map_err(|e| TransportError::Tls(format!("invalid server name: {e}")))?;
        let connector = TlsConnector::from(self.tls.client_config.clone());
        let stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| TransportError::Tls(e.to_string()))?;
        exchange(stream, request).await
    }
}

impl HttpTransport for HyperTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        Box::pin(self.send(Method::GET, url, None))
    }

    fn post_json<'a>(&'a self, url: &'a str, body: Bytes) -> TransportFuture<'a> {
        Box::pin(self.send(Method::POST, url, Some(body)))
    }
}

/// Run one request/response exchange over an established stream.
async fn exchange<S>(stream: S, request: Request<Full<Bytes>>) -> TransportResult<HttpResponse>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "backend connection closed with error");
        }
    });

    let response = sender.send_request(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    Ok(HttpResponse { status, body })
}

/// Connection details extracted from an absolute URL.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    tls: bool,
    host: String,
    port: u16,
    authority: String,
    path_and_query: String,
}

impl Target {
    fn parse(url: &str) -> TransportResult<Self> {
        let invalid = |reason: &str| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
        let tls = match uri.scheme_str() {
            Some("https") => true,
            Some("http") => false,
            Some(other) => return Err(TransportError::UnsupportedScheme(other.to_string())),
            None => return Err(invalid("missing scheme")),
        };
        let authority = uri.authority().ok_or_else(|| invalid("missing host"))?;
        let host = authority
            .host()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = authority.port_u16().unwrap_or(if tls { 443 } else { 80 });
        let path_and_query = uri
            .path_and_query()
            .map(|p| p.as_str())
            .filter(|p| !p.is_empty())
            .unwrap_or("/")
            .to_string();

        Ok(Self {
            tls,
            host,
            port,
            authority: authority.as_str().to_string(),
            path_and_query,
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted transport for resolver tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// What the mock answers for a URL.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Respond with this status and body.
        Json(u16, &'static str),
        /// Never respond.
        Hang,
    }

    /// Records every request; unknown URLs fail with a connection error.
    pub struct MockTransport {
        routes: HashMap<String, MockReply>,
        calls: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                routes: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        pub fn route(mut self, url: &str, reply: MockReply) -> Self {
            self.routes.insert(url.to_string(), reply);
            self
        }

        /// Mark `url` healthy with the standard health body.
        pub fn healthy(self, url: &str) -> Self {
            self.route(url, MockReply::Json(200, r#"{"status":"ok","message":"running"}"#))
        }

        /// Delay every response, simulating network latency.
        pub fn with_delay(self, delay: Duration) -> Self {
            Self { delay, ..self }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn reply<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(url.to_string());
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                match self.routes.get(url) {
                    Some(MockReply::Json(status, body)) => Ok(HttpResponse {
                        status: StatusCode::from_u16(*status).unwrap(),
                        body: Bytes::copy_from_slice(body.as_bytes()),
                    }),
                    Some(MockReply::Hang) => std::future::pending().await,
                    None => Err(TransportError::Connect {
                        authority: url.to_string(),
                        source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
                    }),
                }
            })
        }
    }

    impl HttpTransport for MockTransport {
        fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
            self.reply(url)
        }

        fn post_json<'a>(&'a self, url: &'a str, _body: Bytes) -> TransportFuture<'a> {
            self.reply(url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_https_defaults_to_443() {
        let target = Target::parse("https://my-app-backend.onrender.com/predict").unwrap();
        assert!(target.tls);
        assert_eq!(target.host, "my-app-backend.onrender.com");
        assert_eq!(target.port, 443);
        assert_eq!(target.authority, "my-app-backend.onrender.com");
        assert_eq!(target.path_and_query, "/predict");
    }

    #[test]
    fn target_http_with_port_and_query() {
        let target = Target::parse("http://localhost:8000/predict?debug=1").unwrap();
        assert!(!target.tls);
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, 8000);
        assert_eq!(target.authority, "localhost:8000");
        assert_eq!(target.path_and_query, "/predict?debug=1");
    }

    #[test]
    fn target_without_path_uses_root() {
        let target = Target::parse("http://127.0.0.1:9000").unwrap();
        assert_eq!(target.path_and_query, "/");
        assert_eq!(target.port, 9000);
    }

    #[test]
    fn target_ipv6_host_is_unbracketed() {
        let target = Target::parse("http://[::1]:8000/").unwrap();
        assert_eq!(target.host, "::1");
        assert_eq!(target.authority, "[::1]:8000");
    }

    #[test]
    fn target_rejects_other_schemes() {
        let err = Target::parse("ftp://example.com/predict").unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn target_rejects_relative_urls() {
        let err = Target::parse("/predict").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn webpki_tls_config_builds() {
        assert!(TlsConfig::with_webpki_roots().is_ok());
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let transport = HyperTransport::new().unwrap();
        let err = transport.get("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }
}
