//! Prefetch transports
//!
//! Three ways to make the browser GET a URL ahead of navigation:
//! a `<link rel=prefetch>` in the head, `fetch()`, and `XMLHttpRequest`.
//!
//! Every transport starts its side effect before returning. The returned
//! [`Prefetch`] only observes the outcome, so dropping it never cancels a
//! request. Network work is spawned on the host executor, which the caller
//! must drive (see [`Host::block_on`]).

use crate::error::PrefetchError;
use crate::host::Host;
use smol::LocalExecutor;
use smol::channel::{self, Receiver};
use smol::future::BoxedLocal;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use warmlink_dom::{DomError, EventType, NodeId};
use warmlink_net::{CredentialsMode, FetchOptions, Priority, RequestMode, XmlHttpRequest};

/// Outcome of a single prefetch attempt.
///
/// Resolves to `Ok(())` on success. An `Err` is a bare failure signal;
/// its variant is for logs only.
pub struct Prefetch {
    inner: BoxedLocal<Result<(), PrefetchError>>,
}

impl Prefetch {
    /// An already-settled prefetch
    pub fn ready(result: Result<(), PrefetchError>) -> Self {
        Self {
            inner: Box::pin(async move { result }),
        }
    }

    /// Settles with the first value sent on the channel
    fn from_channel(rx: Receiver<Result<(), PrefetchError>>) -> Self {
        Self {
            inner: Box::pin(async move { rx.recv().await.unwrap_or(Err(PrefetchError::Dropped)) }),
        }
    }

    /// Run `work` on the executor; the prefetch observes its result
    fn spawn<F>(executor: &Rc<LocalExecutor<'static>>, work: F) -> Self
    where
        F: Future<Output = Result<(), PrefetchError>> + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        executor
            .spawn(async move {
                let _ = tx.send(work.await).await;
            })
            .detach();
        Self::from_channel(rx)
    }
}

impl Future for Prefetch {
    type Output = Result<(), PrefetchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for Prefetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefetch").finish_non_exhaustive()
    }
}

/// Options for [`via_dom`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomOptions {
    /// Set `crossorigin="anonymous"` on the link
    pub crossorigin: bool,
}

/// Options for [`via_xhr`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XhrOptions {
    /// Set `withCredentials`
    pub credentials: bool,
}

/// Options for [`via_fetch`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchFlags {
    /// Keep mode `cors`; otherwise the request goes out as `no-cors`
    pub cors_mode: bool,
    /// Send `credentials: "include"`
    pub credentials: bool,
    /// `priority: "high"` instead of `"low"`
    pub priority: bool,
}

/// Prefetch with `<link rel="prefetch" href=url>` appended to the head.
///
/// The link is never removed; every call adds another one. Settles on the
/// link's `load` / `error` event.
pub fn via_dom(host: &Host, url: &str, options: &DomOptions) -> Prefetch {
    let document = host.document();
    let (tx, rx) = channel::bounded(1);

    let link = match create_prefetch_link(host, url, options) {
        Ok(link) => link,
        Err(e) => return Prefetch::ready(Err(e.into())),
    };

    let on_load = tx.clone();
    document.add_event_listener(link, EventType::Load, Rc::new(move |_| {
        let _ = on_load.try_send(Ok(()));
    }));
    document.add_event_listener(link, EventType::Error, Rc::new(move |_| {
        let _ = tx.try_send(Err(PrefetchError::LinkError));
    }));

    if let Err(e) = document.append_child(document.head(), link) {
        return Prefetch::ready(Err(e.into()));
    }
    tracing::debug!(url, crossorigin = options.crossorigin, "prefetch link appended");
    Prefetch::from_channel(rx)
}

fn create_prefetch_link(host: &Host, url: &str, options: &DomOptions) -> Result<NodeId, DomError> {
    let document = host.document();
    let link = document.create_element("link");
    document.set_attribute(link, "rel", "prefetch")?;
    document.set_attribute(link, "href", url)?;
    if options.crossorigin {
        document.set_attribute(link, "crossorigin", "anonymous")?;
    }
    Ok(link)
}

/// Prefetch with a GET `XMLHttpRequest`.
///
/// Succeeds only when the final status is exactly 200.
pub fn via_xhr(host: &Host, url: &str, options: &XhrOptions) -> Prefetch {
    let mut xhr = XmlHttpRequest::new();
    let pending = match start_xhr(host, &mut xhr, url, options) {
        Ok(pending) => pending,
        Err(e) => return Prefetch::ready(Err(e)),
    };

    Prefetch::spawn(host.executor(), async move {
        let result = pending.await;
        xhr.finish(result)?;
        match xhr.status {
            200 => Ok(()),
            status => Err(PrefetchError::Status(status)),
        }
    })
}

fn start_xhr(
    host: &Host,
    xhr: &mut XmlHttpRequest,
    url: &str,
    options: &XhrOptions,
) -> Result<warmlink_net::PendingResponse, PrefetchError> {
    let url = host.resolve(url)?;
    xhr.open("GET", url.as_str())?;
    xhr.with_credentials = options.credentials;
    xhr.set_request_header("Accept", &host.config().accept)?;
    Ok(xhr.start(host.xhr_backend().as_ref())?)
}

/// Request options for the fetch transport
pub(crate) fn fetch_options(accept: &str, flags: &FetchFlags) -> FetchOptions {
    let mut options = FetchOptions::new().header("Accept", accept);
    if !flags.cors_mode {
        options = options.mode(RequestMode::NoCors);
    }
    if flags.credentials {
        options = options.credentials(CredentialsMode::Include);
    }
    options.priority(if flags.priority { Priority::High } else { Priority::Low })
}

/// Prefetch with `fetch()`.
///
/// Settles when the fetch does: any HTTP response succeeds, network
/// failure rejects. Without a Fetch backend this is [`via_xhr`] with only
/// the credentials flag carried over.
pub fn via_fetch(host: &Host, url: &str, flags: &FetchFlags) -> Prefetch {
    let Some(backend) = host.fetch_backend() else {
        tracing::debug!(url, "fetch unavailable, using XMLHttpRequest");
        let options = XhrOptions {
            credentials: flags.credentials,
        };
        return via_xhr(host, url, &options);
    };

    let url = match host.resolve(url) {
        Ok(url) => url,
        Err(e) => return Prefetch::ready(Err(e)),
    };
    let options = fetch_options(&host.config().accept, flags);
    let pending = warmlink_net::fetch(backend.as_ref(), url.as_str(), options);

    Prefetch::spawn(host.executor(), async move {
        pending.await.map(|_| ()).map_err(PrefetchError::from)
    })
}
