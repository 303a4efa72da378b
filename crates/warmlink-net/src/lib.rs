//! warmlink Networking
//!
//! Request model, pluggable HTTP backends, and the two browser-facing
//! front-ends built on them: `fetch()` and `XMLHttpRequest`.

mod backend;
mod request;
pub mod fetch;
pub mod xhr;

pub use backend::{BlockingBackend, HttpBackend, PendingResponse};
pub use fetch::{fetch, FetchOptions, FetchResponse};
pub use request::{CredentialsMode, Method, Priority, Request, RequestMode};
pub use url::Url;
pub use xhr::{ReadyState, XhrError, XmlHttpRequest};

/// HTTP Response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    /// Response with the given status and no body
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Check if response is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        assert!(Response::with_status(200).is_success());
        assert!(Response::with_status(204).is_success());
        assert!(!Response::with_status(304).is_success());
        assert!(!Response::with_status(404).is_success());
    }
}
