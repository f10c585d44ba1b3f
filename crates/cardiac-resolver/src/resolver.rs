//! Endpoint resolver — picks the backend URL once and caches it.
//!
//! Resolution order, first match wins:
//!
//! 1. explicit override from the execution context;
//! 2. the fixed local URL when running on a loopback host;
//! 3. the first host-derived candidate whose health probe succeeds;
//! 4. the first candidate, unprobed, when none is healthy.
//!
//! The first caller of [`EndpointResolver::resolve`] drives discovery;
//! callers arriving while it runs wait on the same once-cell and receive
//! the same endpoint. The result is never re-validated.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use cardiac_core::{
    CandidateEndpoint, Endpoint, ExecutionContext, ResolutionSource, ResolverSettings,
    generate_candidates, health_url, is_loopback,
};

use crate::probe::{HealthMarker, ProbeResult, http_probe};
use crate::transport::HttpTransport;

/// Progress of the one-time discovery sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Unstarted,
    InFlight,
    Complete,
}

/// Resolves and caches the backend endpoint for one client session.
pub struct EndpointResolver {
    context: ExecutionContext,
    settings: ResolverSettings,
    transport: Arc<dyn HttpTransport>,
    resolved: OnceCell<Endpoint>,
    in_flight: AtomicBool,
}

impl EndpointResolver {
    pub fn new(
        context: ExecutionContext,
        settings: ResolverSettings,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            context,
            settings,
            transport,
            resolved: OnceCell::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Return the backend endpoint, discovering it on first use.
    ///
    /// Never fails; an unreachable backend surfaces later as a request error.
    pub async fn resolve(&self) -> Endpoint {
        if let Some(endpoint) = self.resolved.get() {
            return endpoint.clone();
        }
        self.resolved.get_or_init(|| self.discover()).await.clone()
    }

    /// The cached endpoint, without triggering discovery.
    pub fn current(&self) -> Option<Endpoint> {
        self.resolved.get().cloned()
    }

    pub fn state(&self) -> DiscoveryState {
        if self.resolved.initialized() {
            DiscoveryState::Complete
        } else if self.in_flight.load(Ordering::Acquire) {
            DiscoveryState::InFlight
        } else {
            DiscoveryState::Unstarted
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Shared transport, for collaborators issuing requests to the endpoint.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    async fn discover(&self) -> Endpoint {
        let in_flight = InFlightGuard::enter(&self.in_flight);
        let endpoint = self.select().await;
        // The flag stays raised until the once-cell stores the endpoint, so
        // `state()` never drops back to `Unstarted` in between.
        in_flight.complete();
        endpoint
    }

    async fn select(&self) -> Endpoint {
        if let Some(endpoint) = static_choice(&self.context, &self.settings) {
            info!(url = %endpoint, source = %endpoint.source(), "backend endpoint selected");
            return endpoint;
        }

        let candidates = generate_candidates(&self.context.hostname, &self.settings.conventions);
        debug!(
            hostname = %self.context.hostname,
            candidates = candidates.len(),
            "probing backend candidates"
        );
        probe_candidates(self.transport.as_ref(), &candidates, &self.settings).await
    }
}

/// Raises the in-flight flag; lowers it again only if discovery is dropped
/// before completing.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag, armed: true }
    }

    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(false, Ordering::Release);
        }
    }
}

/// The endpoint chosen without any network access, if the context decides it.
fn static_choice(context: &ExecutionContext, settings: &ResolverSettings) -> Option<Endpoint> {
    if let Some(url) = context.explicit_override() {
        return Some(Endpoint::new(url, ResolutionSource::Override));
    }
    if is_loopback(&context.hostname) {
        return Some(Endpoint::new(
            settings.local_url.as_str(),
            ResolutionSource::Loopback,
        ));
    }
    None
}

/// What resolution would pick with no network at all: override, loopback,
/// then the first candidate.
pub fn offline_choice(context: &ExecutionContext, settings: &ResolverSettings) -> Endpoint {
    static_choice(context, settings).unwrap_or_else(|| {
        let candidates = generate_candidates(&context.hostname, &settings.conventions);
        fallback(&candidates, settings)
    })
}

/// Probe `candidates` in order and return the first healthy one, or the
/// first candidate if none is healthy.
///
/// Probes run one at a time; nothing past the first healthy candidate is
/// contacted.
pub async fn probe_candidates(
    transport: &dyn HttpTransport,
    candidates: &[CandidateEndpoint],
    settings: &ResolverSettings,
) -> Endpoint {
    let marker = HealthMarker::from_settings(settings);

    for candidate in candidates {
        let probe_url = health_url(
            candidate.as_str(),
            &settings.conventions.predict_path,
            &settings.health_path,
        );
        match http_probe(transport, &probe_url, &marker, settings.health_timeout).await {
            ProbeResult::Healthy => {
                info!(url = %candidate, "found working backend");
                return Endpoint::new(candidate.as_str(), ResolutionSource::Probed);
            }
            result => {
                debug!(url = %candidate, ?result, "backend not available");
            }
        }
    }

    let endpoint = fallback(candidates, settings);
    warn!(
        url = %endpoint,
        probed = candidates.len(),
        "no working backend found, using fallback"
    );
    endpoint
}

fn fallback(candidates: &[CandidateEndpoint], settings: &ResolverSettings) -> Endpoint {
    let url = candidates
        .first()
        .map(CandidateEndpoint::as_str)
        .unwrap_or(settings.conventions.default_backend.as_str());
    Endpoint::new(url, ResolutionSource::Fallback)
}
