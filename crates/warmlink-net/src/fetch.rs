//! Fetch API
//!
//! JavaScript-style fetch() over an `HttpBackend`. Like the web API, the
//! returned future resolves for any HTTP response, including 4xx/5xx, and
//! only fails on network or URL errors.

use crate::{
    CredentialsMode, HttpBackend, Method, NetError, Priority, Request, RequestMode, Response,
};
use smol::future::BoxedLocal;
use url::Url;

/// Fetch options (`RequestInit`)
#[derive(Debug, Default, Clone)]
pub struct FetchOptions {
    pub headers: Vec<(String, String)>,
    pub mode: Option<RequestMode>,
    pub credentials: Option<CredentialsMode>,
    pub priority: Option<Priority>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn credentials(mut self, credentials: CredentialsMode) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Build the GET request for `url`
    pub fn into_request(self, url: &str) -> Result<Request, NetError> {
        let parsed = Url::parse(url).map_err(|e| NetError::InvalidUrl(format!("{url}: {e}")))?;

        Ok(Request {
            method: Method::Get,
            url: parsed.into(),
            headers: self.headers,
            mode: self.mode.unwrap_or_default(),
            credentials: self.credentials.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
        })
    }
}

/// Fetch `url` through `backend`.
///
/// The request is issued before this returns.
pub fn fetch(
    backend: &dyn HttpBackend,
    url: &str,
    options: FetchOptions,
) -> BoxedLocal<Result<FetchResponse, NetError>> {
    let request = match options.into_request(url) {
        Ok(request) => request,
        Err(e) => return Box::pin(async move { Err(e) }),
    };
    tracing::debug!(
        url = %request.url,
        mode = request.mode.as_str(),
        credentials = request.credentials.as_str(),
        priority = request.priority.as_str(),
        "fetch"
    );
    let pending = backend.execute(request);
    Box::pin(async move { pending.await.map(FetchResponse::from) })
}

/// Fetch response; prefetching only looks at the status
#[derive(Debug)]
pub struct FetchResponse {
    inner: Response,
}

impl FetchResponse {
    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        self.inner.is_success()
    }
}

impl From<Response> for FetchResponse {
    fn from(inner: Response) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_options() {
        let req = FetchOptions::new()
            .header("Accept", "*/*")
            .mode(RequestMode::NoCors)
            .credentials(CredentialsMode::Include)
            .priority(Priority::High)
            .into_request("https://example.com/a")
            .unwrap();

        assert_eq!(req.header("accept"), Some("*/*"));
        assert_eq!(req.mode, RequestMode::NoCors);
        assert_eq!(req.credentials, CredentialsMode::Include);
        assert_eq!(req.priority, Priority::High);
    }

    #[test]
    fn test_into_request_defaults() {
        let req = FetchOptions::new()
            .into_request("https://example.com/a")
            .unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.mode, RequestMode::Cors);
        assert_eq!(req.credentials, CredentialsMode::SameOrigin);
        assert_eq!(req.priority, Priority::Auto);
    }

    #[test]
    fn test_into_request_invalid_url() {
        let err = FetchOptions::new().into_request("not a url").unwrap_err();
        assert!(matches!(err, NetError::InvalidUrl(_)));
    }
}
