//! Prefetch errors
//!
//! A rejected prefetch is a bare failure signal to callers; the variant only
//! records why, for logging.

use warmlink_dom::DomError;
use warmlink_net::{NetError, XhrError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefetchError {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error(transparent)]
    Network(#[from] NetError),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("prefetch link failed to load")]
    LinkError,

    #[error("prefetch dropped before settling")]
    Dropped,

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl From<XhrError> for PrefetchError {
    fn from(e: XhrError) -> Self {
        match e {
            XhrError::Network(e) => PrefetchError::Network(e),
            other => PrefetchError::Network(NetError::Network(other.to_string())),
        }
    }
}
