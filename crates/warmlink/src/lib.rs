//! warmlink - Link prefetching
//!
//! Warms the HTTP cache for a URL before the user navigates to it.
//!
//! - [`has_prefetch`] probes for native `<link rel=prefetch>` support.
//! - [`via_dom`], [`via_fetch`] and [`via_xhr`] are the transports.
//! - [`Supported`] binds the best transport once, from the probe.
//! - [`prefetch_on_hover`] defers a transport call until the pointer has
//!   rested on a matching link for [`PrefetchConfig::hover_delay`].
//!
//! All of it runs against a [`Host`], which bundles the page's document,
//! network backends, timers and executor.

mod config;
mod error;
mod host;
mod hover;
mod loader;
mod probe;
mod strategy;
pub mod timers;
mod transport;

pub use config::{PrefetchConfig, DEFAULT_HOVER_DELAY};
pub use error::PrefetchError;
pub use host::{Host, HostBuilder};
pub use hover::prefetch_on_hover;
pub use loader::LinkLoader;
pub use probe::has_prefetch;
pub use strategy::{PrefetchOptions, Strategy, Supported};
pub use timers::{ManualTimers, SmolTimers, TimerHost, TimerId};
pub use transport::{via_dom, via_fetch, via_xhr, DomOptions, FetchFlags, Prefetch, XhrOptions};

pub use warmlink_dom as dom;
pub use warmlink_net as net;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
