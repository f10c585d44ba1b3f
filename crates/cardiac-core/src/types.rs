//! Core endpoint types.

use std::fmt;

/// Environment variable holding an explicit backend URL.
pub const API_URL_ENV: &str = "CARDIAC_API_URL";

/// A backend URL that might serve predictions, before it has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateEndpoint(String);

impl CandidateEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a resolved endpoint was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Taken verbatim from the explicit override.
    Override,
    /// The client is running on a loopback host.
    Loopback,
    /// A candidate answered its health probe.
    Probed,
    /// No candidate was healthy; the first one was taken anyway.
    Fallback,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionSource::Override => "override",
            ResolutionSource::Loopback => "loopback",
            ResolutionSource::Probed => "probed",
            ResolutionSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// The backend URL prediction requests are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    source: ResolutionSource,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Where the client is running: the host name it was served from and an
/// optional explicit backend URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Host name of the page serving the client (no port, no scheme).
    pub hostname: String,
    /// Explicit backend URL. Wins over every other strategy when non-empty.
    pub api_url_override: Option<String>,
}

impl ExecutionContext {
    /// Create a context for `hostname` with no override.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            api_url_override: None,
        }
    }

    /// Create a context for `hostname`, reading the override from
    /// [`API_URL_ENV`] in the process environment.
    pub fn from_env(hostname: impl Into<String>) -> Self {
        Self::from_lookup(hostname, |key| std::env::var(key).ok())
    }

    /// Create a context using `lookup` to read environment variables.
    pub fn from_lookup(
        hostname: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            api_url_override: lookup(API_URL_ENV),
        }
    }

    /// Builder method: set the explicit override.
    pub fn with_override(self, url: impl Into<String>) -> Self {
        Self {
            api_url_override: Some(url.into()),
            ..self
        }
    }

    /// The override, if one is set and not blank.
    pub fn explicit_override(&self) -> Option<&str> {
        self.api_url_override
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_lookup_reads_override_variable() {
        let ctx = ExecutionContext::from_lookup("example.com", |key| {
            (key == API_URL_ENV).then(|| "https://api.example.com/predict".to_string())
        });
        assert_eq!(ctx.hostname, "example.com");
        assert_eq!(
            ctx.explicit_override(),
            Some("https://api.example.com/predict")
        );
    }

    #[test]
    fn from_lookup_without_variable_has_no_override() {
        let ctx = ExecutionContext::from_lookup("example.com", |_| None);
        assert_eq!(ctx.explicit_override(), None);
    }

    #[test]
    fn blank_override_is_ignored() {
        let ctx = ExecutionContext::new("example.com").with_override("   ");
        assert_eq!(ctx.explicit_override(), None);
    }

    #[test]
    fn endpoint_displays_url() {
        let ep = Endpoint::new("http://localhost:8000/predict", ResolutionSource::Loopback);
        assert_eq!(ep.to_string(), "http://localhost:8000/predict");
        assert_eq!(ep.source(), ResolutionSource::Loopback);
        assert_eq!(ResolutionSource::Fallback.to_string(), "fallback");
    }
}
