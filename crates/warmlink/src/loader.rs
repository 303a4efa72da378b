//! Link loader
//!
//! Stands in for the browser's own handling of `<link rel=prefetch>`: when
//! such a link is inserted into the document, GET its target and fire
//! `load` or `error` on the element. Hosts with a real loader don't install
//! this.

use crate::host::Host;
use std::rc::{Rc, Weak};
use warmlink_dom::{Document, EventType, NodeId, ObserverId};
use warmlink_net::{CredentialsMode, PendingResponse, Priority, Request, RequestMode, Url};

pub struct LinkLoader;

impl LinkLoader {
    /// Observe insertions into the host document.
    ///
    /// Requests go through the fetch backend, or the XHR backend when the
    /// host has no fetch.
    pub fn install(host: &Host) -> ObserverId {
        let document = Rc::downgrade(host.document());
        let backend = host.fetch_backend().unwrap_or(host.xhr_backend()).clone();
        let executor = host.executor().clone();
        let accept = host.config().accept.clone();

        host.document().observe_insertions(Rc::new(move |node| {
            let Some(doc) = document.upgrade() else {
                return;
            };
            let Some(request) = prefetch_request(&doc, node, &accept) else {
                return;
            };

            let pending = request.map(|request| {
                tracing::debug!(url = %request.url, "loading prefetch link");
                backend.execute(request)
            });
            executor.spawn(settle_link(document.clone(), node, pending)).detach();
        }))
    }
}

/// Build the GET for a `<link rel=prefetch>`; `Err` when its href is bad
fn prefetch_request(doc: &Document, node: NodeId, accept: &str) -> Option<Result<Request, String>> {
    if !doc.tag_name(node).is_some_and(|t| t == "link") {
        return None;
    }
    let rel = doc.get_attribute(node, "rel")?;
    if !rel.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case("prefetch")) {
        return None;
    }
    let href = doc.get_attribute(node, "href")?;

    let resolved = match Url::parse(doc.url()) {
        Ok(base) => base.join(&href),
        Err(_) => Url::parse(&href),
    };
    let url = match resolved {
        Ok(url) => url,
        Err(e) => return Some(Err(format!("{href}: {e}"))),
    };

    // No crossorigin attribute: a no-cors request with credentials.
    let (mode, credentials) = match doc.get_attribute(node, "crossorigin").as_deref() {
        None => (RequestMode::NoCors, CredentialsMode::Include),
        Some("use-credentials") => (RequestMode::Cors, CredentialsMode::Include),
        Some(_) => (RequestMode::Cors, CredentialsMode::SameOrigin),
    };

    let mut request = Request::get(url.as_str()).with_header("Accept", accept);
    request.mode = mode;
    request.credentials = credentials;
    request.priority = Priority::Low;
    Some(Ok(request))
}

/// Wait for the link's request and fire `load` / `error` on it
async fn settle_link(
    document: Weak<Document>,
    node: NodeId,
    pending: Result<PendingResponse, String>,
) {
    let event = match pending {
        Ok(pending) => match pending.await {
            Ok(response) if response.is_success() => EventType::Load,
            Ok(response) => {
                tracing::debug!(status = response.status, "prefetch link failed");
                EventType::Error
            }
            Err(e) => {
                tracing::debug!(error = %e, "prefetch link failed");
                EventType::Error
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "prefetch link has invalid href");
            EventType::Error
        }
    };

    if let Some(doc) = document.upgrade() {
        doc.dispatch_event(node, event);
    }
}
