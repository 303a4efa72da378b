//! Strategy selector
//!
//! Picks the best transport once, from the capability probe, and hands it
//! out as a value. Nothing here is global: whoever calls
//! [`Supported::detect`] owns the decision and passes it on.

use crate::host::Host;
use crate::probe::has_prefetch;
use crate::transport::{via_dom, via_fetch, DomOptions, FetchFlags, Prefetch};

/// Transport chosen for "best available" prefetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Native `<link rel=prefetch>`
    Dom,
    /// `fetch()` (itself falling back to XHR)
    Fetch,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Dom => "dom",
            Strategy::Fetch => "fetch",
        }
    }
}

/// Every transport flag, by name. Each transport reads only its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchOptions {
    /// Link transport: `crossorigin="anonymous"`
    pub crossorigin: bool,
    /// Fetch transport: keep CORS mode
    pub cors_mode: bool,
    /// Fetch / XHR transports: send credentials
    pub credentials: bool,
    /// Fetch transport: high priority
    pub priority: bool,
}

/// The best available transport, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supported {
    strategy: Strategy,
}

impl Supported {
    /// Probe the host once and bind the transport
    pub fn detect(host: &Host) -> Self {
        let strategy = if has_prefetch(host.document()) {
            Strategy::Dom
        } else {
            Strategy::Fetch
        };
        tracing::info!(strategy = strategy.as_str(), "prefetch transport selected");
        Self { strategy }
    }

    /// Bind a specific transport without probing
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Prefetch `url` through the bound transport
    pub fn prefetch(&self, host: &Host, url: &str, options: &PrefetchOptions) -> Prefetch {
        match self.strategy {
            Strategy::Dom => via_dom(host, url, &DomOptions { crossorigin: options.crossorigin }),
            Strategy::Fetch => via_fetch(
                host,
                url,
                &FetchFlags {
                    cors_mode: options.cors_mode,
                    credentials: options.credentials,
                    priority: options.priority,
                },
            ),
        }
    }
}
