use reqwest::header::HeaderMap;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network, timeout or request construction error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http {
        status: u16,
        body: String,
        /// Response headers as received.
        headers: HeaderMap,
    },
    /// Response body could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(String),
    /// Request body could not be serialized to JSON.
    #[error("encode error: {0}")]
    Encode(String),
    /// Invalid origin, base URL or environment configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Raw body of the failed response, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether the client-side timeout fired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    /// Messages of the underlying causes of a transport error, lowercased.
    /// Connection errors only name their cause deep in the `source()` chain.
    /// The top-level message is skipped because it embeds the request URL.
    pub(crate) fn cause_text(&self) -> String {
        let mut text = String::new();
        let mut source = match self {
            Self::Transport(err) => std::error::Error::source(err),
            _ => None,
        };
        while let Some(err) = source {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str(&err.to_string());
            source = err.source();
        }
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use reqwest::header::HeaderMap;

    #[test]
    fn http_error_exposes_status_and_body() {
        let err = ApiError::Http {
            status: 404,
            body: "{\"message\":\"not found\"}".to_owned(),
            headers: HeaderMap::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("{\"message\":\"not found\"}"));
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "http error 404: {\"message\":\"not found\"}");
    }

    #[test]
    fn config_error_has_no_status() {
        let err = ApiError::Config("bad origin".to_owned());
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
        assert_eq!(err.cause_text(), "");
    }
}
