//! Backend URL guessing from the client's host name.
//!
//! Everything here is pure: given a host name and the naming conventions
//! in force, produce the ordered list of URLs worth probing. Order is
//! priority, most trusted first.

use crate::types::CandidateEndpoint;

/// Host names that identify a local development client.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Naming conventions used to derive backend URLs from a frontend host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConventions {
    /// Backend used when nothing host-specific is known.
    pub default_backend: String,
    /// Hosting platform domain whose services follow `{name}-backend` style naming.
    pub platform_domain: String,
    /// Path of the prediction route on every backend.
    pub predict_path: String,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            default_backend: "https://cardiac-ai-backend.onrender.com/predict".to_string(),
            platform_domain: "onrender.com".to_string(),
            predict_path: "/predict".to_string(),
        }
    }
}

/// Whether `hostname` names the local machine.
pub fn is_loopback(hostname: &str) -> bool {
    let host = hostname.trim();
    LOOPBACK_HOSTS
        .iter()
        .any(|candidate| host.eq_ignore_ascii_case(candidate))
}

/// Generate the ordered list of candidate backend URLs for `hostname`.
///
/// Platform-specific patterns come first when the host is on the platform
/// domain, followed by the generic patterns. Duplicates keep their first
/// position. The list is never empty: the default backend is always present.
pub fn generate_candidates(
    hostname: &str,
    conventions: &NamingConventions,
) -> Vec<CandidateEndpoint> {
    let host = hostname.trim();
    let domain = conventions.platform_domain.as_str();
    let path = conventions.predict_path.as_str();
    let mut urls = Vec::with_capacity(8);

    if !host.is_empty() && !domain.is_empty() && host.contains(domain) {
        let service = host.split('.').next().unwrap_or(host);
        urls.push(format!("https://{service}-backend.{domain}{path}"));
        urls.push(format!("https://{service}-api.{domain}{path}"));
        urls.push(format!("https://backend-{service}.{domain}{path}"));
        urls.push(format!("https://api-{service}.{domain}{path}"));
    }

    urls.push(conventions.default_backend.clone());

    if !host.is_empty() {
        urls.push(format!("https://backend-{host}{path}"));
        urls.push(format!("https://api-{host}{path}"));
        urls.push(format!("https://{host}/api{path}"));
    }

    let mut candidates: Vec<CandidateEndpoint> = Vec::with_capacity(urls.len());
    for url in urls {
        if !candidates.iter().any(|c| c.as_str() == url) {
            candidates.push(CandidateEndpoint::new(url));
        }
    }
    candidates
}

/// Derive the health-check URL for a prediction URL.
///
/// A trailing `predict_path` is replaced by `health_path`; any other path
/// is replaced entirely. Query strings are dropped.
pub fn health_url(prediction_url: &str, predict_path: &str, health_path: &str) -> String {
    let (origin, path) = split_origin(prediction_url);
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let prefix = if !predict_path.is_empty() && path.ends_with(predict_path) {
        &path[..path.len() - predict_path.len()]
    } else {
        ""
    };

    if health_path.starts_with('/') {
        format!("{origin}{prefix}{health_path}")
    } else {
        format!("{origin}{prefix}/{health_path}")
    }
}

/// Split `scheme://authority/path` into (`scheme://authority`, `/path`).
fn split_origin(url: &str) -> (&str, &str) {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[authority_start..].find('/') {
        Some(i) => url.split_at(authority_start + i),
        None => (url, ""),
    }
}
