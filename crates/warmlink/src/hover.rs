//! Hover-intent scheduler
//!
//! Gates a prefetch on the pointer dwelling over a matching anchor. Each
//! anchor runs its own state machine:
//!
//! ```text
//!   Idle --enter--> Armed(timer) --timeout--> Fired
//!    ^                  |
//!    +------leave-------+
//! ```
//!
//! `Fired` is terminal: the anchor's listeners are removed before the
//! callback runs, so an anchor prefetches at most once per call.

use crate::host::Host;
use crate::timers::TimerId;
use crate::transport::Prefetch;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use warmlink_dom::{EventType, ListenerId, NodeId};

/// Per-anchor hover state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverState {
    Idle,
    Armed(TimerId),
    Fired,
}

struct Binding {
    enter: ListenerId,
    leave: ListenerId,
    state: HoverState,
}

/// Registry and callback shared by the listeners of one invocation
struct HoverScheduler<O, F> {
    host: Host,
    url: String,
    options: O,
    callback: F,
    bindings: RefCell<HashMap<NodeId, Binding>>,
}

/// Run `callback(host, url, options)` now, or once per anchor after the
/// pointer dwells on it.
///
/// With `only_on_mouseover == false` the callback runs before this returns
/// and its prefetch is handed back. Otherwise every `<a>` whose `href`
/// attribute is exactly `url` gets an enter/leave listener pair and this
/// returns `None`: the eventual prefetch is never surfaced, and its
/// outcome is only logged.
pub fn prefetch_on_hover<O, F>(
    host: &Host,
    callback: F,
    url: &str,
    only_on_mouseover: bool,
    options: O,
) -> Option<Prefetch>
where
    O: 'static,
    F: Fn(&Host, &str, &O) -> Prefetch + 'static,
{
    if !only_on_mouseover {
        return Some(callback(host, url, &options));
    }

    let anchors = host.document().query_all_by_attribute("a", "href", url);
    tracing::debug!(url, anchors = anchors.len(), "waiting for hover intent");

    let scheduler = Rc::new(HoverScheduler {
        host: host.clone(),
        url: url.to_string(),
        options,
        callback,
        bindings: RefCell::new(HashMap::new()),
    });
    for anchor in anchors {
        scheduler.bind(anchor);
    }
    None
}

impl<O: 'static, F: Fn(&Host, &str, &O) -> Prefetch + 'static> HoverScheduler<O, F> {
    fn bind(self: &Rc<Self>, anchor: NodeId) {
        let document = self.host.document();

        let this = Rc::clone(self);
        let enter = document.add_event_listener(
            anchor,
            EventType::MouseEnter,
            Rc::new(move |_| this.on_enter(anchor)),
        );
        let this = Rc::clone(self);
        let leave = document.add_event_listener(
            anchor,
            EventType::MouseLeave,
            Rc::new(move |_| this.on_leave(anchor)),
        );

        let binding = Binding {
            enter,
            leave,
            state: HoverState::Idle,
        };
        self.bindings.borrow_mut().insert(anchor, binding);
    }

    fn state(&self, anchor: NodeId) -> Option<HoverState> {
        self.bindings.borrow().get(&anchor).map(|b| b.state)
    }

    fn on_enter(self: &Rc<Self>, anchor: NodeId) {
        if matches!(self.state(anchor), None | Some(HoverState::Fired)) {
            return;
        }

        let this = Rc::clone(self);
        let timer = self
            .host
            .timers()
            .set_timeout(self.host.config().hover_delay, Box::new(move || this.on_timeout(anchor)));

        let previous = self
            .bindings
            .borrow_mut()
            .get_mut(&anchor)
            .map(|b| std::mem::replace(&mut b.state, HoverState::Armed(timer)));

        // Re-entering while armed restarts the dwell.
        if let Some(HoverState::Armed(old)) = previous {
            self.host.timers().clear_timeout(old);
        }
    }

    fn on_leave(&self, anchor: NodeId) {
        let armed = {
            let mut bindings = self.bindings.borrow_mut();
            match bindings.get_mut(&anchor) {
                Some(binding) => match binding.state {
                    HoverState::Armed(timer) => {
                        binding.state = HoverState::Idle;
                        Some(timer)
                    }
                    _ => None,
                },
                None => None,
            }
        };

        if let Some(timer) = armed {
            self.host.timers().clear_timeout(timer);
        }
    }

    fn on_timeout(&self, anchor: NodeId) {
        let listeners = {
            let mut bindings = self.bindings.borrow_mut();
            match bindings.get_mut(&anchor) {
                Some(binding) if matches!(binding.state, HoverState::Armed(_)) => {
                    binding.state = HoverState::Fired;
                    (binding.enter, binding.leave)
                }
                _ => return,
            }
        };

        let document = self.host.document();
        document.remove_event_listener(anchor, EventType::MouseEnter, listeners.0);
        document.remove_event_listener(anchor, EventType::MouseLeave, listeners.1);

        tracing::debug!(url = %self.url, "hover intent confirmed");
        let prefetch = (self.callback)(&self.host, &self.url, &self.options);

        let url = self.url.clone();
        self.host
            .executor()
            .spawn(async move {
                if let Err(e) = prefetch.await {
                    tracing::debug!(%url, error = %e, "hover prefetch failed");
                }
            })
            .detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::{ManualTimers, TimerHost};
    use std::cell::Cell;
    use std::time::Duration;
    use warmlink_dom::Document;
    use warmlink_net::{HttpBackend, PendingResponse, Request, Response};

    struct Ok200;

    impl HttpBackend for Ok200 {
        fn execute(&self, _request: Request) -> PendingResponse {
            Box::pin(async { Ok(Response::with_status(200)) })
        }
    }

    fn page(url: &str, anchors: usize) -> (Host, Rc<ManualTimers>, Vec<NodeId>) {
        let doc = Rc::new(Document::new("https://example.com/"));
        let nodes = (0..anchors)
            .map(|_| {
                let a = doc.create_element("a");
                doc.set_attribute(a, "href", url).unwrap();
                doc.append_child(doc.body(), a).unwrap();
                a
            })
            .collect();
        let timers = Rc::new(ManualTimers::new());
        let host = Host::builder(doc, Rc::new(Ok200)).timers(timers.clone()).build();
        (host, timers, nodes)
    }

    fn counting(calls: &Rc<Cell<usize>>) -> impl Fn(&Host, &str, &()) -> Prefetch + 'static {
        let calls = calls.clone();
        move |_, _, _| {
            calls.set(calls.get() + 1);
            Prefetch::ready(Ok(()))
        }
    }

    #[test]
    fn test_reenter_while_armed_keeps_one_timer() {
        let (host, timers, anchors) = page("/a", 1);
        let calls = Rc::new(Cell::new(0));
        prefetch_on_hover(&host, counting(&calls), "/a", true, ());

        host.document().dispatch_event(anchors[0], EventType::MouseEnter);
        timers.advance(Duration::from_millis(150));
        host.document().dispatch_event(anchors[0], EventType::MouseEnter);
        assert_eq!(timers.pending(), 1);

        // First dwell would have completed here; the restart pushed it out.
        timers.advance(Duration::from_millis(100));
        assert_eq!(calls.get(), 0);
        timers.advance(Duration::from_millis(100));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_leave_without_enter_is_noop() {
        let (host, timers, anchors) = page("/a", 1);
        let calls = Rc::new(Cell::new(0));
        prefetch_on_hover(&host, counting(&calls), "/a", true, ());

        host.document().dispatch_event(anchors[0], EventType::MouseLeave);
        assert_eq!(timers.pending(), 0);
        host.teardown();
    }
}
