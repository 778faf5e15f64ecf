use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::{ApiError, Result};

/// Successful response of a logical call.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Parsed JSON body. An empty body is `Null`; a body that is not JSON
    /// is kept verbatim as a JSON string.
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub(crate) fn from_parts(status: u16, headers: HeaderMap, raw: &str) -> Self {
        let body = if raw.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()))
        };
        Self {
            status,
            headers,
            body,
        }
    }

    /// Decodes the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(|err| {
            ApiError::Decode(format!("invalid response JSON: {err}; body: {}", self.body))
        })
    }
}
