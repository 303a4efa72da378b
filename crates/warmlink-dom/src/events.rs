//! DOM Events
//!
//! Event types and listener handles used by the document.

use crate::NodeId;
use std::rc::Rc;

/// Event types the document dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseEnter,
    MouseLeave,
    Load,
    Error,
}

impl EventType {
    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::Load => "load",
            EventType::Error => "error",
        }
    }

    /// Parse a DOM event name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mouseenter" => Some(EventType::MouseEnter),
            "mouseleave" => Some(EventType::MouseLeave),
            "load" => Some(EventType::Load),
            "error" => Some(EventType::Error),
            _ => None,
        }
    }
}

/// A dispatched event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
}

/// Listener callback
pub type Listener = Rc<dyn Fn(&Event)>;

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);
