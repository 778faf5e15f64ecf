use std::fmt;
use std::time::Duration;

use url::Url;

use crate::resolve::{is_absolute_url, resolve_base_url, RuntimeOrigin, API_PREFIX, DEFAULT_ORIGIN};
use crate::{ApiError, Result};

/// Fixed per-attempt request timeout of every target.
pub const REQUEST_TIMEOUT_MS: u64 = 60_000;
/// Backend origin used to bypass a failing reverse proxy.
pub const DEFAULT_DIRECT_BASE: &str = "https://api.storeadmin.example/api";

/// Which of the three endpoint targets a request is sent to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TargetKind {
    /// First choice for every attempt.
    Primary,
    /// Same-origin `/api`, tried when a remote primary is unreachable.
    Local,
    /// Known backend origin, tried on gateway-class failures.
    Direct,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Local => "local",
            Self::Direct => "direct",
        })
    }
}

/// Absolute base URL plus request timeout. Immutable once built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointTarget {
    kind: TargetKind,
    base_url: String,
    remote: bool,
    timeout: Duration,
}

impl EndpointTarget {
    /// A target whose base was given as an absolute URL.
    pub fn absolute(kind: TargetKind, base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !is_absolute_url(base_url) {
            return Err(ApiError::Config(format!(
                "{kind} target base '{base_url}' is not an absolute URL"
            )));
        }
        Ok(Self {
            kind,
            base_url: base_url.to_owned(),
            remote: true,
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        })
    }

    /// A target addressed relative to the page origin, e.g. `/api`.
    pub fn same_origin(kind: TargetKind, origin: &str, prefix: &str) -> Result<Self> {
        let origin = origin.trim().trim_end_matches('/');
        let base_url = join(origin, prefix);
        Url::parse(&base_url)
            .map_err(|err| ApiError::Config(format!("invalid {kind} target '{base_url}': {err}")))?;
        Ok(Self {
            kind,
            base_url: base_url.trim_end_matches('/').to_owned(),
            remote: false,
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        })
    }

    /// Overrides the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `true` when the base was configured as an absolute URL rather than a
    /// path relative to the page origin.
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of `path` on this target. Absolute `http(s)` paths are
    /// returned unchanged.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        join(&self.base_url, path)
    }
}

fn join(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.trim_end_matches('/').to_owned();
    }
    format!("{}/{path}", base.trim_end_matches('/'))
}

/// The three endpoint targets of a process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Targets {
    pub primary: EndpointTarget,
    pub local: EndpointTarget,
    pub direct: EndpointTarget,
}

impl Targets {
    pub fn new(primary: EndpointTarget, local: EndpointTarget, direct: EndpointTarget) -> Self {
        Self {
            primary,
            local,
            direct,
        }
    }

    /// Resolves all three targets.
    ///
    /// Without a runtime origin, [`DEFAULT_ORIGIN`] anchors the relative
    /// targets and no loopback rewrite takes place.
    pub fn resolve(
        origin: Option<&RuntimeOrigin>,
        configured_base: Option<&str>,
        direct_base: &str,
    ) -> Result<Self> {
        let page_origin = origin
            .map(RuntimeOrigin::origin)
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_owned());
        let resolved = resolve_base_url(origin, configured_base);

        let primary = if is_absolute_url(&resolved) {
            EndpointTarget::absolute(TargetKind::Primary, &resolved)?
        } else {
            EndpointTarget::same_origin(TargetKind::Primary, &page_origin, &resolved)?
        };
        let local = EndpointTarget::same_origin(TargetKind::Local, &page_origin, API_PREFIX)?;
        let direct = EndpointTarget::absolute(TargetKind::Direct, direct_base)?;

        tracing::info!(
            primary = %primary.base_url(),
            local = %local.base_url(),
            direct = %direct.base_url(),
            remote = primary.is_remote(),
            "endpoint targets resolved"
        );

        Ok(Self::new(primary, local, direct))
    }

    /// Resolves targets from the environment.
    ///
    /// Reads:
    /// - `DASHBOARD_API_BASE`: explicit API base (optional)
    /// - `DASHBOARD_ORIGIN`: origin the dashboard is served from (optional)
    /// - `DASHBOARD_DIRECT_BASE`: backend origin bypassing the proxy
    ///   (defaults to [`DEFAULT_DIRECT_BASE`])
    ///
    /// Empty values count as unset.
    pub fn from_env() -> Result<Self> {
        let origin = env_var("DASHBOARD_ORIGIN")
            .map(|value| RuntimeOrigin::parse(&value))
            .transpose()?;
        let configured = env_var("DASHBOARD_API_BASE");
        let direct = env_var("DASHBOARD_DIRECT_BASE");
        Self::resolve(
            origin.as_ref(),
            configured.as_deref(),
            direct.as_deref().unwrap_or(DEFAULT_DIRECT_BASE),
        )
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{EndpointTarget, TargetKind, Targets, DEFAULT_DIRECT_BASE, REQUEST_TIMEOUT_MS};
    use crate::resolve::RuntimeOrigin;

    #[test]
    fn url_for_joins_with_single_slash() {
        let target = EndpointTarget::absolute(TargetKind::Primary, "https://api.example.com/api/")
            .expect("absolute target");
        assert_eq!(target.url_for("/customer"), "https://api.example.com/api/customer");
        assert_eq!(target.url_for("customer/7"), "https://api.example.com/api/customer/7");
        assert_eq!(target.url_for(""), "https://api.example.com/api");
        assert_eq!(
            target.url_for("https://cdn.example.com/x"),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn absolute_rejects_relative_base() {
        assert!(EndpointTarget::absolute(TargetKind::Direct, "/api").is_err());
    }

    #[test]
    fn remote_configured_base_makes_remote_primary() {
        let origin = RuntimeOrigin::parse("https://admin.example.com").expect("origin");
        let targets = Targets::resolve(
            Some(&origin),
            Some("https://api.example.com"),
            DEFAULT_DIRECT_BASE,
        )
        .expect("targets");

        assert_eq!(targets.primary.base_url(), "https://api.example.com/api");
        assert!(targets.primary.is_remote());
        assert_eq!(targets.local.base_url(), "https://admin.example.com/api");
        assert!(!targets.local.is_remote());
        assert_eq!(targets.direct.base_url(), DEFAULT_DIRECT_BASE);
        assert_eq!(targets.primary.timeout(), Duration::from_millis(REQUEST_TIMEOUT_MS));
    }

    #[test]
    fn relative_default_is_anchored_to_origin() {
        let origin = RuntimeOrigin::parse("https://admin.example.com").expect("origin");
        let targets = Targets::resolve(Some(&origin), None, DEFAULT_DIRECT_BASE).expect("targets");

        assert_eq!(targets.primary.base_url(), "https://admin.example.com/api");
        assert!(!targets.primary.is_remote());
    }

    #[test]
    fn no_origin_uses_default_origin() {
        let targets = Targets::resolve(None, None, DEFAULT_DIRECT_BASE).expect("targets");
        assert_eq!(targets.primary.base_url(), "http://localhost:3000/api");
        assert!(!targets.primary.is_remote());
        assert_eq!(targets.local.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn loopback_origin_primary_is_remote_dev_backend() {
        let origin = RuntimeOrigin::parse("http://localhost:5173").expect("origin");
        let targets = Targets::resolve(Some(&origin), None, DEFAULT_DIRECT_BASE).expect("targets");

        assert_eq!(targets.primary.base_url(), "http://localhost:3000/api");
        assert!(targets.primary.is_remote());
        assert_eq!(targets.local.base_url(), "http://localhost:5173/api");
    }
}
