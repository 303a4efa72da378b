//! Host environment
//!
//! Everything a transport or the hover scheduler needs from the page:
//! document, network backends, timers, and the executor network work is
//! spawned on. Cloning a `Host` shares the same page.

use crate::config::PrefetchConfig;
use crate::error::PrefetchError;
use crate::timers::{SmolTimers, TimerHost};
use smol::LocalExecutor;
use std::future::Future;
use std::rc::Rc;
use url::Url;
use warmlink_dom::Document;
use warmlink_net::HttpBackend;

#[derive(Clone)]
pub struct Host {
    document: Rc<Document>,
    fetch: Option<Rc<dyn HttpBackend>>,
    xhr: Rc<dyn HttpBackend>,
    timers: Rc<dyn TimerHost>,
    executor: Rc<LocalExecutor<'static>>,
    config: Rc<PrefetchConfig>,
}

impl Host {
    /// Start building a host around a document and its XHR backend
    pub fn builder(document: Rc<Document>, xhr: Rc<dyn HttpBackend>) -> HostBuilder {
        HostBuilder {
            document,
            xhr,
            fetch: None,
            timers: None,
            executor: None,
            config: PrefetchConfig::default(),
        }
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    /// Fetch API backend; `None` when `window.fetch` is unavailable
    pub fn fetch_backend(&self) -> Option<&Rc<dyn HttpBackend>> {
        self.fetch.as_ref()
    }

    pub fn xhr_backend(&self) -> &Rc<dyn HttpBackend> {
        &self.xhr
    }

    pub fn timers(&self) -> &Rc<dyn TimerHost> {
        &self.timers
    }

    pub fn executor(&self) -> &Rc<LocalExecutor<'static>> {
        &self.executor
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    /// Resolve `url` against the document URL
    pub fn resolve(&self, url: &str) -> Result<Url, PrefetchError> {
        let resolved = match Url::parse(self.document.url()) {
            Ok(base) => base.join(url),
            Err(_) => Url::parse(url),
        };
        resolved.map_err(|e| PrefetchError::InvalidUrl(format!("{url}: {e}")))
    }

    /// Drive the page's executor until `future` completes
    pub fn block_on<T>(&self, future: impl Future<Output = T>) -> T {
        smol::block_on(self.executor.run(future))
    }

    /// Page teardown: drop every listener so hover bindings are released
    pub fn teardown(&self) {
        self.document.remove_all_listeners();
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("document", &self.document)
            .field("fetch", &self.fetch.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`Host`]
pub struct HostBuilder {
    document: Rc<Document>,
    xhr: Rc<dyn HttpBackend>,
    fetch: Option<Rc<dyn HttpBackend>>,
    timers: Option<Rc<dyn TimerHost>>,
    executor: Option<Rc<LocalExecutor<'static>>>,
    config: PrefetchConfig,
}

impl HostBuilder {
    /// Provide the Fetch API; without it `via_fetch` falls back to XHR
    pub fn fetch(mut self, backend: Rc<dyn HttpBackend>) -> Self {
        self.fetch = Some(backend);
        self
    }

    pub fn timers(mut self, timers: Rc<dyn TimerHost>) -> Self {
        self.timers = Some(timers);
        self
    }

    pub fn executor(mut self, executor: Rc<LocalExecutor<'static>>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(mut self, config: PrefetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the host; timers default to real time on the host executor
    pub fn build(self) -> Host {
        let executor = self.executor.unwrap_or_else(|| Rc::new(LocalExecutor::new()));
        let timers = self
            .timers
            .unwrap_or_else(|| Rc::new(SmolTimers::new(executor.clone())));

        Host {
            document: self.document,
            fetch: self.fetch,
            xhr: self.xhr,
            timers,
            executor,
            config: Rc::new(self.config),
        }
    }
}
