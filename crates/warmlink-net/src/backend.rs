//! HTTP backends
//!
//! The front-ends (`fetch`, `XMLHttpRequest`) never talk to the network
//! directly; they hand a fully-formed `Request` to an `HttpBackend`.

use crate::{Method, NetError, Request, Response};
use smol::future::BoxedLocal;
use std::time::Duration;

/// In-flight response from a backend
pub type PendingResponse = BoxedLocal<Result<Response, NetError>>;

/// Something that can execute an HTTP request.
///
/// `execute` must issue the request before returning; the returned future
/// only observes completion.
pub trait HttpBackend {
    fn execute(&self, request: Request) -> PendingResponse;
}

/// Backend on top of `reqwest::blocking`, run on smol's blocking pool
#[derive(Debug, Clone)]
pub struct BlockingBackend {
    client: reqwest::blocking::Client,
}

impl BlockingBackend {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpBackend for BlockingBackend {
    fn execute(&self, request: Request) -> PendingResponse {
        let client = self.client.clone();
        tracing::info!("HTTP {} {}", request.method.as_str(), request.url);
        Box::pin(smol::unblock(move || send_blocking(&client, request)))
    }
}

fn send_blocking(
    client: &reqwest::blocking::Client,
    request: Request,
) -> Result<Response, NetError> {
    let method = match request.method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
    };

    // Mode, credentials and priority are browser policy; a plain HTTP
    // client has nothing to apply them to.
    tracing::debug!(
        mode = request.mode.as_str(),
        credentials = request.credentials.as_str(),
        priority = request.priority.as_str(),
        "request policy not enforced by blocking backend"
    );

    let mut builder = client.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let response = builder.send().map_err(map_reqwest_error)?;
    let status = response.status().as_u16();
    // Drain the body so the whole resource lands in the HTTP cache
    let body = response.bytes().map_err(map_reqwest_error)?.to_vec();

    Ok(Response { status, body })
}

fn map_reqwest_error(e: reqwest::Error) -> NetError {
    if e.is_timeout() {
        NetError::Timeout
    } else {
        NetError::Network(e.to_string())
    }
}
