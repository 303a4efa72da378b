//! Timer APIs
//!
//! One-shot `setTimeout` / `clearTimeout` behind a trait, with a manual
//! clock for hosts that run their own event loop and a smol-backed
//! implementation for real time.

use smol::LocalExecutor;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

/// Handle returned by `set_timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deferred callback
pub type TimerCallback = Box<dyn FnOnce()>;

/// Timer capability of the host
pub trait TimerHost {
    /// Schedule `callback` to run once after `delay`
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer; false if it already ran or never existed
    fn clear_timeout(&self, id: TimerId) -> bool;

    /// Number of timers still pending
    fn pending(&self) -> usize;
}

/// Virtual-clock timers.
///
/// Nothing fires until `advance` is called; timers fire in deadline order
/// (ties in scheduling order) and the clock reads each timer's deadline
/// while its callback runs.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    queue: RefCell<BTreeMap<(Duration, u64), TimerCallback>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Move the clock forward, running every timer that comes due.
    /// Returns the number of callbacks run. The clock stops at `Duration::MAX`.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get().saturating_add(by);
        let mut fired = 0;

        loop {
            let next = self.queue.borrow().keys().next().copied();
            match next {
                Some(key) if key.0 <= target => {
                    let callback = self.queue.borrow_mut().remove(&key);
                    self.now.set(key.0);
                    if let Some(callback) = callback {
                        callback();
                        fired += 1;
                    }
                }
                _ => break,
            }
        }

        self.now.set(target);
        fired
    }
}

impl TimerHost for ManualTimers {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let deadline = self.now.get().saturating_add(delay);
        self.queue.borrow_mut().insert((deadline, id), callback);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let key = queue.keys().find(|(_, i)| *i == id.0).copied();
        match key {
            Some(key) => queue.remove(&key).is_some(),
            None => false,
        }
    }

    fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// Real-time timers running as tasks on a local smol executor
pub struct SmolTimers {
    executor: Rc<LocalExecutor<'static>>,
    next_id: Cell<u64>,
    live: Rc<RefCell<HashSet<u64>>>,
}

impl SmolTimers {
    pub fn new(executor: Rc<LocalExecutor<'static>>) -> Self {
        Self {
            executor,
            next_id: Cell::new(0),
            live: Rc::new(RefCell::new(HashSet::new())),
        }
    }
}

impl TimerHost for SmolTimers {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().insert(id);

        let live = self.live.clone();
        self.executor
            .spawn(async move {
                smol::Timer::after(delay).await;
                // A cleared timer is no longer live; its task just expires.
                let still_live = live.borrow_mut().remove(&id);
                if still_live {
                    callback();
                }
            })
            .detach();
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) -> bool {
        self.live.borrow_mut().remove(&id.0)
    }

    fn pending(&self) -> usize {
        self.live.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_fires_in_deadline_order() {
        let timers = ManualTimers::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(300, "c"), (100, "a"), (200, "b")] {
            let log = log.clone();
            timers.set_timeout(
                Duration::from_millis(delay),
                Box::new(move || log.borrow_mut().push(tag)),
            );
        }

        assert_eq!(timers.advance(Duration::from_millis(250)), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(timers.pending(), 1);
        assert_eq!(timers.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_manual_clear() {
        let timers = ManualTimers::new();
        let id = timers.set_timeout(
            Duration::from_millis(10),
            Box::new(|| panic!("cleared timer ran")),
        );
        assert!(timers.clear_timeout(id));
        assert!(!timers.clear_timeout(id));
        assert_eq!(timers.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_manual_callback_can_schedule() {
        let timers = Rc::new(ManualTimers::new());
        let hits = Rc::new(Cell::new(0));

        let (t, h) = (timers.clone(), hits.clone());
        timers.set_timeout(
            Duration::from_millis(10),
            Box::new(move || {
                h.set(h.get() + 1);
                let h = h.clone();
                t.set_timeout(Duration::from_millis(10), Box::new(move || h.set(h.get() + 1)));
            }),
        );

        timers.advance(Duration::from_millis(20));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_manual_huge_delay_saturates() {
        let timers = ManualTimers::new();
        timers.advance(Duration::from_millis(5));

        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        timers.set_timeout(Duration::MAX, Box::new(move || f.set(true)));

        assert_eq!(timers.advance(Duration::from_secs(3600)), 0);
        assert_eq!(timers.pending(), 1);
        assert_eq!(timers.advance(Duration::MAX), 1);
        assert!(fired.get());
        assert_eq!(timers.now(), Duration::MAX);
        assert_eq!(timers.advance(Duration::from_millis(1)), 0);
    }

    #[test]
    fn test_smol_timer_fires() {
        let executor = Rc::new(LocalExecutor::new());
        let timers = SmolTimers::new(executor.clone());
        let (tx, rx) = smol::channel::bounded(1);
        timers.set_timeout(
            Duration::from_millis(5),
            Box::new(move || {
                let _ = tx.try_send(());
            }),
        );

        smol::block_on(executor.run(rx.recv())).unwrap();
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_smol_timer_cleared() {
        let executor = Rc::new(LocalExecutor::new());
        let timers = SmolTimers::new(executor.clone());
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = timers.set_timeout(Duration::from_millis(5), Box::new(move || f.set(true)));
        assert!(timers.clear_timeout(id));

        smol::block_on(executor.run(smol::Timer::after(Duration::from_millis(30))));
        assert!(!fired.get());
    }
}
