//! warmlink DOM - Document capability
//!
//! A small arena-backed document: enough element, attribute, event and
//! mutation-observer surface to host link prefetching.

mod node;
mod document;
mod events;
mod features;

pub use node::Element;
pub use document::{Document, InsertionObserver, ObserverId};
pub use events::{Event, EventType, Listener, ListenerId};
pub use features::{DomFeatures, RelList};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Raw arena index
    pub fn index(self) -> u32 {
        self.0
    }
}

/// DOM errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Cycle: {child:?} is an ancestor of {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
