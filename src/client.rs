use std::fmt;
use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use tokio::time::sleep;

use crate::{
    classify::{backoff_delay, classify, has_proxy_error_marker, is_gateway_failure, FailureKind},
    hooks::{AttemptInfo, RequestHook, TracingHook},
    ApiError, ApiResponse, ClientOptions, EndpointTarget, RequestDescriptor, Result, Targets,
};

/// One configured HTTP client per endpoint target.
#[derive(Clone, Debug)]
struct TargetClient {
    http: reqwest::Client,
    target: EndpointTarget,
}

impl TargetClient {
    fn new(target: EndpointTarget) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(target.timeout())
            .default_headers(headers)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { http, target })
    }
}

#[derive(Clone)]
/// REST client that retries failed calls and falls back between the
/// primary, local and direct endpoint targets.
pub struct ResilientClient {
    primary: TargetClient,
    local: TargetClient,
    direct: TargetClient,
    options: ClientOptions,
    authorization: Option<String>,
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientClient")
            .field("primary", &self.primary.target)
            .field("local", &self.local.target)
            .field("direct", &self.direct.target)
            .field("options", &self.options)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl ResilientClient {
    /// Builds one HTTP client per target, each with the target's timeout
    /// and a JSON content type.
    pub fn new(targets: Targets) -> Result<Self> {
        Ok(Self {
            primary: TargetClient::new(targets.primary)?,
            local: TargetClient::new(targets.local)?,
            direct: TargetClient::new(targets.direct)?,
            options: ClientOptions::default(),
            authorization: None,
            hooks: vec![Arc::new(TracingHook)],
        })
    }

    /// Creates a client from environment variables.
    ///
    /// See [`Targets::from_env`] for the variables read.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dashboard_http::ResilientClient;
    ///
    /// let api = ResilientClient::from_env().expect("invalid DASHBOARD_* env vars");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::new(Targets::from_env()?)
    }

    /// Applies retry defaults used by [`ResilientClient::execute`].
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Adds a hook run around every attempt, after the ones already installed.
    pub fn with_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Sends `Authorization: <value>` on every attempt.
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Sends a bearer token on every attempt. The `Bearer ` prefix is added
    /// when missing.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        let authorization = normalize_bearer_authorization(token.as_ref());
        self.with_authorization(authorization)
    }

    /// Retry defaults used by [`ResilientClient::execute`].
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The resolved endpoint targets.
    pub fn targets(&self) -> Targets {
        Targets::new(
            self.primary.target.clone(),
            self.local.target.clone(),
            self.direct.target.clone(),
        )
    }

    /// Sends a `GET` for `path` with the default retry budget.
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(&RequestDescriptor::get(path)).await
    }

    /// Sends a `POST` with a JSON body with the default retry budget.
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.execute(&RequestDescriptor::post(path).json(body)?).await
    }

    /// Sends a `PUT` with a JSON body with the default retry budget.
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.execute(&RequestDescriptor::put(path).json(body)?).await
    }

    /// Sends a `PATCH` with a JSON body with the default retry budget.
    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.execute(&RequestDescriptor::patch(path).json(body)?).await
    }

    /// Sends a `DELETE` for `path` with the default retry budget.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(&RequestDescriptor::delete(path)).await
    }

    /// Executes `request` with the configured retry budget.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        self.execute_with(request, self.options.max_retries, self.options.retry_backoff_ms)
            .await
    }

    /// Executes `request`, retrying against the primary target up to
    /// `max_retries` times with a linear `backoff_base_ms * n` delay.
    ///
    /// After each failed primary attempt:
    /// - unreachable or timed out, with a remote primary: one attempt on the
    ///   local target;
    /// - gateway-class failure: one attempt on the direct target.
    ///
    /// A successful fallback returns immediately. Fallback attempts do not
    /// consume the retry budget. Any other HTTP error is returned at once.
    /// On exhaustion the last primary error is returned unchanged.
    pub async fn execute_with(
        &self,
        request: &RequestDescriptor,
        max_retries: usize,
        backoff_base_ms: u64,
    ) -> Result<ApiResponse> {
        let mut attempt = 0usize;
        loop {
            let err = match self.send(&self.primary, request, attempt).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let kind = classify(&err);
            if kind == FailureKind::OtherHttp {
                return Err(err);
            }

            if kind.is_unreachable() && self.primary.target.is_remote() {
                tracing::warn!(
                    kind = ?kind,
                    attempt,
                    local = %self.local.target.base_url(),
                    "primary target unreachable, trying local target"
                );
                if let Ok(response) = self.send(&self.local, request, attempt).await {
                    return Ok(response);
                }
            }

            if is_gateway_failure(&err) {
                let proxy_page = matches!(
                    &err,
                    ApiError::Http { status, body, .. } if has_proxy_error_marker(*status, body)
                );
                tracing::warn!(
                    status = ?err.status(),
                    proxy_page,
                    attempt,
                    direct = %self.direct.target.base_url(),
                    "gateway failure, trying direct target"
                );
                if let Ok(response) = self.send(&self.direct, request, attempt).await {
                    return Ok(response);
                }
            }

            if attempt >= max_retries {
                return Err(err);
            }

            attempt += 1;
            let delay = backoff_delay(backoff_base_ms, attempt);
            tracing::debug!(
                attempt,
                max_retries,
                "retrying request after {} ms",
                delay.as_millis()
            );
            sleep(delay).await;
        }
    }

    /// One attempt against one target, wrapped in the hooks.
    async fn send(
        &self,
        client: &TargetClient,
        request: &RequestDescriptor,
        attempt: usize,
    ) -> Result<ApiResponse> {
        let url = client.target.url_for(request.path());
        let info = AttemptInfo {
            target: client.target.kind(),
            attempt,
            method: request.method(),
            url: &url,
            base_url: client.target.base_url(),
            timeout: request
                .timeout_override()
                .unwrap_or_else(|| client.target.timeout()),
        };

        for hook in &self.hooks {
            hook.before_attempt(&info);
        }
        let outcome = self.dispatch(client, request, &info).await;
        for hook in &self.hooks {
            hook.after_attempt(&info, outcome.as_ref());
        }
        outcome
    }

    async fn dispatch(
        &self,
        client: &TargetClient,
        request: &RequestDescriptor,
        info: &AttemptInfo<'_>,
    ) -> Result<ApiResponse> {
        let mut builder = client
            .http
            .request(request.method().clone(), info.url)
            .timeout(info.timeout);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(authorization) = &self.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }
        if !request.headers().is_empty() {
            builder = builder.headers(request.headers().clone());
        }

        let response = builder.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
                headers,
            });
        }

        Ok(ApiResponse::from_parts(status.as_u16(), headers, &body))
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
