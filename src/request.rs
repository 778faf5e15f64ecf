use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;

use crate::{ApiError, Result};

/// One logical request: reused unchanged for every attempt, fallback and
/// retry of a call.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl RequestDescriptor {
    /// `path` is relative to whichever target base is in effect.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter. Repeated keys are sent repeatedly.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets the JSON body.
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::Encode(format!("invalid request body: {err}")))?;
        Ok(self.body(value))
    }

    /// Sets a header, replacing the client default of the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Overrides the target's per-attempt timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::header::{HeaderValue, ACCEPT};
    use reqwest::Method;
    use serde::Serialize;
    use serde_json::json;

    use super::RequestDescriptor;

    #[derive(Serialize)]
    struct NewBrand<'a> {
        name: &'a str,
        active: bool,
    }

    #[test]
    fn builder_collects_all_parts() {
        let request = RequestDescriptor::get("/customer")
            .query("page", 2)
            .query("search", "kit")
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(Duration::from_secs(5));

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/customer");
        assert_eq!(
            request.query_pairs(),
            &[
                ("page".to_owned(), "2".to_owned()),
                ("search".to_owned(), "kit".to_owned())
            ]
        );
        assert_eq!(
            request.headers().get(ACCEPT).map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
        assert_eq!(request.timeout_override(), Some(Duration::from_secs(5)));
        assert!(request.json_body().is_none());
    }

    #[test]
    fn json_serializes_body() {
        let request = RequestDescriptor::post("/brand")
            .json(&NewBrand {
                name: "Acme",
                active: true,
            })
            .expect("body must serialize");

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.json_body(), Some(&json!({"name": "Acme", "active": true})));
    }
}
