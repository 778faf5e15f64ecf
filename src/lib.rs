//! `dashboard-http` is a resilient REST client for the store-management
//! dashboard backend.
//!
//! Every call goes to the primary API base first. Failures are classified
//! and may be retried with linear backoff, with one-shot fallbacks to:
//! - the same-origin `/api` target when a remote primary is unreachable;
//! - the direct backend target when a reverse proxy reports a gateway error.
//!
//! Entry points are [`ResilientClient::execute`] and
//! [`ResilientClient::execute_with`].

mod client;
mod error;
mod options;
mod request;
mod response;
mod target;

pub mod classify;
pub mod hooks;
pub mod resolve;

pub use classify::FailureKind;
pub use client::ResilientClient;
pub use error::ApiError;
pub use hooks::{AttemptInfo, RequestHook, TracingHook};
pub use options::{ClientOptions, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS};
pub use request::RequestDescriptor;
pub use resolve::{resolve_base_url, RuntimeOrigin};
pub use response::ApiResponse;
pub use target::{EndpointTarget, TargetKind, Targets, DEFAULT_DIRECT_BASE, REQUEST_TIMEOUT_MS};

pub type Result<T> = std::result::Result<T, ApiError>;
