//! XMLHttpRequest (Legacy API)
//!
//! XHR state machine over an `HttpBackend`. `start` issues the request and
//! hands back the pending response; `finish` applies it. `send` does both.

use crate::{
    CredentialsMode, HttpBackend, Method, NetError, PendingResponse, Request, RequestMode, Response,
};
use url::Url;

/// XMLHttpRequest ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReadyState {
    /// Client has been created, open() not called yet
    #[default]
    Unsent = 0,
    /// open() has been called
    Opened = 1,
    /// send() has been called, headers received
    HeadersReceived = 2,
    /// Downloading, responseText holds partial data
    Loading = 3,
    /// Operation complete
    Done = 4,
}

/// XMLHttpRequest object
#[derive(Debug, Default)]
pub struct XmlHttpRequest {
    pub ready_state: ReadyState,
    pub status: u16,
    pub with_credentials: bool,

    method: Method,
    url: String,
    request_headers: Vec<(String, String)>,
    send_flag: bool,
    error_flag: bool,
}

impl XmlHttpRequest {
    /// Create a new XMLHttpRequest
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the request
    pub fn open(&mut self, method: &str, url: &str) -> Result<(), XhrError> {
        let method =
            Method::parse(method).ok_or_else(|| XhrError::UnsupportedMethod(method.to_string()))?;
        let parsed = Url::parse(url)
            .map_err(|e| XhrError::Network(NetError::InvalidUrl(format!("{url}: {e}"))))?;

        self.method = method;
        self.url = parsed.into();
        self.ready_state = ReadyState::Opened;
        self.send_flag = false;
        self.error_flag = false;
        self.request_headers.clear();
        Ok(())
    }

    /// Set request header
    pub fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), XhrError> {
        if self.ready_state != ReadyState::Opened || self.send_flag {
            return Err(XhrError::InvalidState);
        }

        let lower = name.to_ascii_lowercase();
        if is_forbidden_header(&lower) {
            return Err(XhrError::ForbiddenHeader(name.to_string()));
        }

        // Combine with existing header if present
        match self
            .request_headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.request_headers.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Whether the last send ended in a network error
    pub fn errored(&self) -> bool {
        self.error_flag
    }

    /// Issue the request; the request is on the wire when this returns
    pub fn start(&mut self, backend: &dyn HttpBackend) -> Result<PendingResponse, XhrError> {
        if self.ready_state != ReadyState::Opened || self.send_flag {
            return Err(XhrError::InvalidState);
        }
        self.send_flag = true;

        let request = Request {
            method: self.method,
            url: self.url.clone(),
            headers: self.request_headers.clone(),
            mode: RequestMode::Cors,
            credentials: if self.with_credentials {
                CredentialsMode::Include
            } else {
                CredentialsMode::SameOrigin
            },
            ..Default::default()
        };
        tracing::debug!(url = %request.url, credentials = self.with_credentials, "xhr send");
        Ok(backend.execute(request))
    }

    /// Apply the outcome of a request issued by `start`
    pub fn finish(&mut self, result: Result<Response, NetError>) -> Result<(), XhrError> {
        self.ready_state = ReadyState::Done;
        self.send_flag = false;
        match result {
            Ok(response) => {
                self.status = response.status;
                Ok(())
            }
            Err(e) => {
                self.error_flag = true;
                self.status = 0;
                Err(XhrError::Network(e))
            }
        }
    }

    /// Send the request and wait for it to complete
    pub async fn send(&mut self, backend: &dyn HttpBackend) -> Result<(), XhrError> {
        let pending = self.start(backend)?;
        let result = pending.await;
        self.finish(result)
    }
}

/// Check if header is forbidden
fn is_forbidden_header(name: &str) -> bool {
    matches!(name,
        "accept-charset" | "accept-encoding" | "access-control-request-headers" |
        "access-control-request-method" | "connection" | "content-length" |
        "cookie" | "cookie2" | "date" | "dnt" | "expect" | "host" |
        "keep-alive" | "origin" | "referer" | "te" | "trailer" |
        "transfer-encoding" | "upgrade" | "via"
    ) || name.starts_with("proxy-") || name.starts_with("sec-")
}

/// XHR errors
#[derive(Debug, thiserror::Error)]
pub enum XhrError {
    #[error("Invalid state")]
    InvalidState,

    #[error("Forbidden header: {0}")]
    ForbiddenHeader(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error(transparent)]
    Network(#[from] NetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xhr_new() {
        let xhr = XmlHttpRequest::new();
        assert_eq!(xhr.ready_state, ReadyState::Unsent);
        assert!(!xhr.with_credentials);
    }

    #[test]
    fn test_xhr_open() {
        let mut xhr = XmlHttpRequest::new();
        xhr.open("GET", "https://example.com").unwrap();
        assert_eq!(xhr.ready_state, ReadyState::Opened);
    }

    #[test]
    fn test_xhr_open_bad_url() {
        let mut xhr = XmlHttpRequest::new();
        assert!(xhr.open("GET", "::nope").is_err());
        assert_eq!(xhr.ready_state, ReadyState::Unsent);
    }

    #[test]
    fn test_xhr_set_header_before_open() {
        let mut xhr = XmlHttpRequest::new();
        assert!(matches!(
            xhr.set_request_header("Accept", "*/*"),
            Err(XhrError::InvalidState)
        ));
    }

    #[test]
    fn test_xhr_open_rejects_unsafe_method() {
        let mut xhr = XmlHttpRequest::new();
        assert!(matches!(
            xhr.open("POST", "https://example.com"),
            Err(XhrError::UnsupportedMethod(_))
        ));
        assert_eq!(xhr.ready_state, ReadyState::Unsent);
    }

    #[test]
    fn test_xhr_forbidden_header() {
        let mut xhr = XmlHttpRequest::new();
        xhr.open("GET", "https://example.com").unwrap();
        assert!(xhr.set_request_header("Cookie", "value").is_err());
        assert!(xhr.set_request_header("Sec-Fetch-Mode", "cors").is_err());
    }

    #[test]
    fn test_xhr_headers_combine() {
        let mut xhr = XmlHttpRequest::new();
        xhr.open("GET", "https://example.com").unwrap();
        xhr.set_request_header("Accept", "text/html").unwrap();
        xhr.set_request_header("accept", "*/*").unwrap();
        assert_eq!(
            xhr.request_headers,
            vec![("Accept".to_string(), "text/html, */*".to_string())]
        );
    }

    #[test]
    fn test_xhr_finish_error() {
        let mut xhr = XmlHttpRequest::new();
        xhr.open("GET", "https://example.com").unwrap();
        assert!(xhr.finish(Err(NetError::Timeout)).is_err());
        assert!(xhr.errored());
        assert_eq!(xhr.status, 0);
        assert_eq!(xhr.ready_state, ReadyState::Done);
    }
}
