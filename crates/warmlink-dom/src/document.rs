//! Document - High-level document API
//!
//! All methods take `&self`; the arena lives behind a `RefCell` so that
//! listeners and observers can call back into the document while an event
//! is being dispatched. No borrow is held while user callbacks run.

use crate::events::{Event, EventType, Listener, ListenerId};
use crate::features::{DomFeatures, RelList};
use crate::node::Element;
use crate::{DomError, NodeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Callback invoked after a node is inserted into the document
pub type InsertionObserver = Rc<dyn Fn(NodeId)>;

/// Handle returned by `observe_insertions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
struct Inner {
    nodes: Vec<Element>,
    listeners: HashMap<(NodeId, EventType), Vec<(ListenerId, Listener)>>,
    next_listener: u64,
    observers: Vec<(ObserverId, InsertionObserver)>,
    next_observer: u64,
}

impl Inner {
    fn node(&self, id: NodeId) -> Result<&Element, DomError> {
        self.nodes.get(id.0 as usize).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(id.0 as usize).ok_or(DomError::UnknownNode(id))
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node.0 as usize).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn push(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(element);
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0 as usize].parent = Some(parent);
        self.nodes[parent.0 as usize].children.push(child);
    }

    /// Pre-order walk of a subtree
    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(id.0 as usize) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }
}

/// HTML Document
pub struct Document {
    url: String,
    features: DomFeatures,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    inner: RefCell<Inner>,
}

impl Document {
    /// Create a new document with `<html><head/><body/></html>`
    pub fn new(url: &str) -> Self {
        Self::with_features(url, DomFeatures::default())
    }

    /// Create a document for an environment with the given link features
    pub fn with_features(url: &str, features: DomFeatures) -> Self {
        let mut inner = Inner::default();
        let root = inner.push(Element::new("#document"));
        let html = inner.push(Element::new("html"));
        let head = inner.push(Element::new("head"));
        let body = inner.push(Element::new("body"));
        inner.link(root, html);
        inner.link(html, head);
        inner.link(html, body);

        Self {
            url: url.to_string(),
            features,
            html_element: html,
            head_element: head,
            body_element: body,
            inner: RefCell::new(inner),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn features(&self) -> &DomFeatures {
        &self.features
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn html(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Number of nodes in the arena (connected or not)
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().push(Element::new(tag))
    }

    /// Snapshot of an element
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.inner.borrow().node(node).ok().cloned()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().node(node).ok().map(|n| n.tag.clone())
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.inner.borrow_mut().node_mut(node)?.set_attribute(name, value);
        Ok(())
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .node(node)
            .ok()
            .and_then(|n| n.attribute(name).map(str::to_string))
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.inner.borrow().node(node).map(|n| n.has_attribute(name)).unwrap_or(false)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().node(node).ok().and_then(|n| n.parent)
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.borrow().is_inclusive_ancestor(NodeId::ROOT, node)
    }

    /// Append `child` to `parent`, moving it if already attached.
    ///
    /// Insertion observers run for every node of the inserted subtree once
    /// it is connected to the document.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let (inserted, observers) = {
            let mut inner = self.inner.borrow_mut();
            inner.node(parent)?;
            inner.node(child)?;
            if inner.is_inclusive_ancestor(child, parent) {
                return Err(DomError::HierarchyRequest { parent, child });
            }

            let old_parent = inner.nodes[child.0 as usize].parent;
            if let Some(old) = old_parent {
                inner.nodes[old.0 as usize].children.retain(|c| *c != child);
            }
            inner.link(parent, child);

            if !inner.is_inclusive_ancestor(NodeId::ROOT, parent) {
                return Ok(());
            }
            let observers: Vec<InsertionObserver> =
                inner.observers.iter().map(|(_, o)| o.clone()).collect();
            (inner.subtree(child), observers)
        };

        tracing::trace!(?parent, ?child, "node inserted");
        for node in inserted {
            for observer in &observers {
                observer(node);
            }
        }
        Ok(())
    }

    /// Connected elements `tag[attr="value"]` in document order.
    ///
    /// The value comparison is an exact string match on the attribute as
    /// written, not on any resolved form.
    pub fn query_all_by_attribute(&self, tag: &str, attr: &str, value: &str) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        inner
            .subtree(NodeId::ROOT)
            .into_iter()
            .filter(|id| {
                let node = &inner.nodes[id.0 as usize];
                node.is(tag) && node.attribute(attr) == Some(value)
            })
            .collect()
    }

    /// `element.relList`; `None` when the environment has no relation list
    /// or the element is not a link-like element.
    pub fn rel_list(&self, node: NodeId) -> Option<RelList<'_>> {
        if !self.features.rel_list {
            return None;
        }
        let inner = self.inner.borrow();
        let element = inner.node(node).ok()?;
        if !(element.is("link") || element.is("a") || element.is("area")) {
            return None;
        }
        Some(RelList::new(element.attribute("rel"), &self.features))
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: EventType,
        listener: Listener,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.entry((node, event_type)).or_default().push((id, listener));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn remove_event_listener(
        &self,
        node: NodeId,
        event_type: EventType,
        id: ListenerId,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.listeners.get_mut(&(node, event_type)) else {
            return false;
        };
        let before = list.len();
        list.retain(|(l, _)| *l != id);
        let removed = list.len() != before;
        if list.is_empty() {
            inner.listeners.remove(&(node, event_type));
        }
        removed
    }

    pub fn listener_count(&self, node: NodeId, event_type: EventType) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&(node, event_type))
            .map_or(0, Vec::len)
    }

    /// Dispatch an event at `node`; returns the number of listeners invoked.
    ///
    /// Listeners removed by an earlier listener of the same dispatch are
    /// skipped.
    pub fn dispatch_event(&self, node: NodeId, event_type: EventType) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .inner
            .borrow()
            .listeners
            .get(&(node, event_type))
            .cloned()
            .unwrap_or_default();

        let event = Event { event_type, target: node };
        let mut invoked = 0;
        for (id, listener) in snapshot {
            let live = self
                .inner
                .borrow()
                .listeners
                .get(&(node, event_type))
                .is_some_and(|l| l.iter().any(|(l, _)| *l == id));
            if live {
                listener(&event);
                invoked += 1;
            }
        }
        tracing::trace!(?node, event = event_type.as_str(), invoked, "event dispatched");
        invoked
    }

    /// Drop every listener (page teardown)
    pub fn remove_all_listeners(&self) {
        // Moved out first: dropping a listener may drop captures that
        // reference this document.
        let listeners = std::mem::take(&mut self.inner.borrow_mut().listeners);
        drop(listeners);
    }

    // ------------------------------------------------------------------
    // Mutation observers
    // ------------------------------------------------------------------

    pub fn observe_insertions(&self, observer: InsertionObserver) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push((id, observer));
        id
    }

    pub fn disconnect_observer(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(o, _)| *o != id);
        inner.observers.len() != before
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("nodes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_document_structure() {
        let doc = Document::new("https://example.com/");
        assert_eq!(doc.children(doc.root()), vec![doc.html()]);
        assert_eq!(doc.children(doc.html()), vec![doc.head(), doc.body()]);
        assert_eq!(doc.tag_name(doc.head()).as_deref(), Some("head"));
    }

    #[test]
    fn test_append_moves_node() {
        let doc = Document::new("about:blank");
        let a = doc.create_element("a");
        doc.append_child(doc.head(), a).unwrap();
        doc.append_child(doc.body(), a).unwrap();
        assert!(doc.children(doc.head()).is_empty());
        assert_eq!(doc.children(doc.body()), vec![a]);
        assert_eq!(doc.parent(a), Some(doc.body()));
    }

    #[test]
    fn test_append_rejects_cycle() {
        let doc = Document::new("about:blank");
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(div, span).unwrap();
        assert_eq!(
            doc.append_child(span, div),
            Err(DomError::HierarchyRequest { parent: span, child: div })
        );
    }

    #[test]
    fn test_query_skips_detached() {
        let doc = Document::new("about:blank");
        let attached = doc.create_element("a");
        let detached = doc.create_element("a");
        doc.set_attribute(attached, "href", "/x").unwrap();
        doc.set_attribute(detached, "href", "/x").unwrap();
        doc.append_child(doc.body(), attached).unwrap();
        assert_eq!(doc.query_all_by_attribute("a", "href", "/x"), vec![attached]);
    }

    #[test]
    fn test_listener_removed_during_dispatch_is_skipped() {
        let doc = Rc::new(Document::new("about:blank"));
        let el = doc.create_element("a");
        let second_ran = Rc::new(Cell::new(false));

        let second_id = Rc::new(Cell::new(None));
        let d = doc.clone();
        let sid = second_id.clone();
        doc.add_event_listener(el, EventType::MouseEnter, Rc::new(move |_| {
            if let Some(id) = sid.get() {
                d.remove_event_listener(el, EventType::MouseEnter, id);
            }
        }));
        let ran = second_ran.clone();
        let id = doc.add_event_listener(el, EventType::MouseEnter, Rc::new(move |_| ran.set(true)));
        second_id.set(Some(id));

        assert_eq!(doc.dispatch_event(el, EventType::MouseEnter), 1);
        assert!(!second_ran.get());
        doc.remove_all_listeners();
    }

    #[test]
    fn test_observer_sees_subtree_on_connect() {
        let doc = Document::new("about:blank");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        doc.observe_insertions(Rc::new(move |id| s.borrow_mut().push(id)));

        let div = doc.create_element("div");
        let link = doc.create_element("link");
        doc.append_child(div, link).unwrap();
        assert!(seen.borrow().is_empty());

        doc.append_child(doc.body(), div).unwrap();
        assert_eq!(*seen.borrow(), vec![div, link]);
    }
}
