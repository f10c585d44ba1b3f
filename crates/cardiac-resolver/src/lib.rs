//! cardiac-resolver — runtime discovery of the prediction backend.
//!
//! Works out, once per client session, which backend URL prediction
//! requests go to, without a rebuild or redeploy when the backend moves.
//!
//! # Architecture
//!
//! ```text
//! EndpointResolver
//!   ├── ExecutionContext (host name, explicit override)
//!   ├── OnceCell<Endpoint>  ← first caller drives discovery, others await it
//!   └── discovery
//!       ├── override / loopback   → no network
//!       ├── generate_candidates() → ordered URLs
//!       ├── http_probe() per candidate, in order, bounded by a timeout
//!       └── fallback to the first candidate
//! ```
//!
//! Probe failures never reach the caller. The only failure visible
//! outside is a prediction request to an endpoint that turns out to be
//! unreachable, which is the client's concern.

pub mod error;
pub mod probe;
pub mod resolver;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use probe::{HealthMarker, ProbeResult, http_probe};
pub use resolver::{DiscoveryState, EndpointResolver, offline_choice, probe_candidates};
pub use transport::{HttpResponse, HttpTransport, HyperTransport, TlsConfig, TransportFuture};
