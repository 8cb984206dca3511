#![forbid(unsafe_code)]

//! Subscriber lists and the RAII [`Subscription`] guard.
//!
//! Every unit owns a [`Subscribers<T>`] list. The list stores `Weak`
//! references to the callbacks; the strong reference lives inside the
//! [`Subscription`] returned to the caller. Dropping the guard therefore
//! kills the callback immediately, and the list prunes dead entries lazily
//! on the next notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// RAII guard for a registered callback.
///
/// The callback stays registered for exactly as long as this guard is alive.
/// Dropping the guard removes the callback before the next notification
/// cycle.
pub struct Subscription {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Shared list of subscriber callbacks, notified in registration order.
pub(crate) struct Subscribers<T> {
    inner: Rc<RefCell<SubscriberList<T>>>,
}

struct SubscriberList<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

struct Entry<T> {
    id: u64,
    callback: Weak<dyn Fn(&T)>,
}

impl<T: 'static> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SubscriberList {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }

    pub(crate) fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&T)> = Rc::new(callback);
        let id = {
            let mut list = self.inner.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push(Entry {
                id,
                callback: Rc::downgrade(&callback),
            });
            id
        };
        let list = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            // The guard owns the only strong reference to the callback.
            drop(callback);
            if let Some(list) = list.upgrade() {
                list.borrow_mut().entries.retain(|entry| entry.id != id);
            }
        })
    }

    /// Notify all live subscribers, pruning dead entries first.
    ///
    /// Callbacks run outside any internal borrow, so a callback may freely
    /// subscribe, unsubscribe, or mutate the owning unit.
    pub(crate) fn notify(&self, value: &T) {
        let callbacks: Vec<Rc<dyn Fn(&T)>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter_map(|entry| entry.callback.upgrade())
            .collect();
        self.inner
            .borrow_mut()
            .entries
            .retain(|entry| entry.callback.strong_count() > 0);
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of live subscribers.
    pub(crate) fn len(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.callback.strong_count() > 0)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn notifies_in_registration_order() {
        let subscribers = Subscribers::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(move |v| seen.borrow_mut().push(("first", *v)))
        };
        let second = {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(move |v| seen.borrow_mut().push(("second", *v)))
        };

        subscribers.notify(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);

        drop(first);
        drop(second);
    }

    #[test]
    fn dropped_guard_stops_delivery() {
        let subscribers = Subscribers::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let guard = {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(move |v| seen.borrow_mut().push(*v))
        };

        subscribers.notify(&1);
        drop(guard);
        subscribers.notify(&2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subscribers.len(), 0);
    }

    #[test]
    fn callback_may_unsubscribe_reentrantly() {
        let subscribers = Subscribers::<i32>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let guard = {
            let slot = Rc::clone(&slot);
            subscribers.subscribe(move |_| {
                // Drop our own guard from inside the notification.
                slot.borrow_mut().take();
            })
        };
        *slot.borrow_mut() = Some(guard);

        subscribers.notify(&1);
        assert_eq!(subscribers.len(), 0);
        subscribers.notify(&2);
    }

    #[test]
    fn len_ignores_dead_entries_before_pruning() {
        let subscribers = Subscribers::<i32>::new();
        let guard = subscribers.subscribe(|_| {});
        assert_eq!(subscribers.len(), 1);
        drop(guard);
        // Not yet pruned from the vec, but no longer counted.
        assert_eq!(subscribers.len(), 0);
    }
}
