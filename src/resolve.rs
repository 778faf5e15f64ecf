//! Primary base URL resolution.
//!
//! The primary target is computed once from an optional explicitly
//! configured API base and the runtime origin the dashboard is served from.

use url::Url;

use crate::{ApiError, Result};

/// Same-origin API path prefix.
pub const API_PREFIX: &str = "/api";
/// Port of the backend during local development without a reverse proxy.
pub const LOOPBACK_DEV_PORT: u16 = 3000;
/// Origin assumed when there is no page origin to inspect.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Scheme, host and port the dashboard is served from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeOrigin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl RuntimeOrigin {
    /// Parses an origin such as `https://admin.example.com` or
    /// `http://localhost:5173`. Any path, query or fragment is ignored.
    pub fn parse(origin: &str) -> Result<Self> {
        let url = Url::parse(origin.trim())
            .map_err(|err| ApiError::Config(format!("invalid origin '{origin}': {err}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| ApiError::Config(format!("origin '{origin}' has no host")))?
            .to_owned();
        Ok(Self {
            scheme: url.scheme().to_owned(),
            host,
            port: url.port(),
        })
    }

    /// URL scheme, e.g. `https`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host name without port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port; `None` when the scheme default applies.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `scheme://host[:port]` without a trailing slash.
    pub fn origin(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{port}", self.scheme, self.host),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// `localhost` or `127.0.0.1`.
    pub fn is_loopback(&self) -> bool {
        self.host.eq_ignore_ascii_case("localhost") || self.host == "127.0.0.1"
    }
}

/// Computes the primary API base.
///
/// - an explicit, non-empty `configured` base wins over the `/api` default;
/// - on a loopback origin the default is rewritten to the dev backend on
///   port 3000 of the same scheme and host;
/// - any other candidate loses its trailing slashes and gets `/api`
///   appended when it does not already end with it.
///
/// Never fails: the worst case is the relative `/api` prefix.
pub fn resolve_base_url(origin: Option<&RuntimeOrigin>, configured: Option<&str>) -> String {
    let mut candidate = configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(API_PREFIX)
        .to_owned();

    if let Some(origin) = origin {
        if origin.is_loopback() && candidate == API_PREFIX {
            candidate = format!(
                "{}://{}:{LOOPBACK_DEV_PORT}{API_PREFIX}",
                origin.scheme(),
                origin.host()
            );
        }
    }

    if candidate != API_PREFIX {
        let trimmed = candidate.trim_end_matches('/');
        candidate = if trimmed.ends_with(API_PREFIX) {
            trimmed.to_owned()
        } else {
            format!("{trimmed}{API_PREFIX}")
        };
    }

    candidate
}

/// Whether `value` carries its own scheme and host, as opposed to a path
/// relative to the page origin.
pub fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).map(|url| url.has_host()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{is_absolute_url, resolve_base_url, RuntimeOrigin};

    fn origin(value: &str) -> RuntimeOrigin {
        RuntimeOrigin::parse(value).expect("test origin must parse")
    }

    #[test]
    fn loopback_without_configured_base_targets_dev_backend() {
        let localhost = origin("http://localhost:5173");
        assert_eq!(
            resolve_base_url(Some(&localhost), None),
            "http://localhost:3000/api"
        );

        let ip = origin("http://127.0.0.1:8080");
        assert_eq!(resolve_base_url(Some(&ip), None), "http://127.0.0.1:3000/api");
    }

    #[test]
    fn configured_host_gets_api_suffix() {
        assert_eq!(
            resolve_base_url(None, Some("https://host.example")),
            "https://host.example/api"
        );
        assert_eq!(
            resolve_base_url(Some(&origin("http://localhost:5173")), Some("https://host.example/")),
            "https://host.example/api"
        );
    }

    #[test]
    fn configured_base_already_ending_in_api_is_kept() {
        assert_eq!(
            resolve_base_url(None, Some("https://host.example/api//")),
            "https://host.example/api"
        );
    }

    #[test]
    fn relative_configured_base_is_normalized() {
        assert_eq!(resolve_base_url(None, Some("/backend/")), "/backend/api");
    }

    #[test]
    fn remote_origin_keeps_relative_default() {
        let remote = origin("https://admin.example.com");
        assert_eq!(resolve_base_url(Some(&remote), None), "/api");
        assert_eq!(resolve_base_url(None, None), "/api");
        assert_eq!(resolve_base_url(None, Some("   ")), "/api");
    }

    #[test]
    fn explicit_api_literal_on_loopback_is_rewritten() {
        let localhost = origin("https://localhost");
        assert_eq!(
            resolve_base_url(Some(&localhost), Some("/api")),
            "https://localhost:3000/api"
        );
    }

    #[test]
    fn origin_parsing_drops_path_and_keeps_port() {
        let parsed = origin("http://localhost:5173/dashboard/customers?page=2");
        assert_eq!(parsed.origin(), "http://localhost:5173");
        assert!(parsed.is_loopback());
        assert_eq!(origin("https://admin.example.com").origin(), "https://admin.example.com");
        assert!(RuntimeOrigin::parse("not an origin").is_err());
    }

    #[test]
    fn absolute_url_detection() {
        assert!(is_absolute_url("https://host.example/api"));
        assert!(is_absolute_url("http://127.0.0.1:3000/api"));
        assert!(!is_absolute_url("/api"));
        assert!(!is_absolute_url("localhost:3000/api"));
    }
}
