#![forbid(unsafe_code)]

//! Value-holding reactive unit.
//!
//! # Design
//!
//! [`Store<T>`] wraps a current value in shared, reference-counted storage.
//! Mutation goes through [`set()`](Store::set)/[`update()`](Store::update);
//! subscribers registered via [`subscribe()`](Store::subscribe) are notified
//! with the new value after it has been written.
//!
//! # Invariants
//!
//! 1. `version` increments exactly once per mutation that changes the value.
//! 2. Setting a value equal to the current one is a no-op (no version bump,
//!    no notifications).
//! 3. Subscribers are notified in registration order, after the write, so a
//!    callback calling [`get()`](Store::get) observes the new value.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::subscription::{Subscribers, Subscription};
use crate::unit::{AnyUnit, UnitHandle, UnitId, UnitKind, next_unit_id};

struct StoreInner<T> {
    id: UnitId,
    value: RefCell<T>,
    version: Cell<u64>,
    subscribers: Subscribers<T>,
}

/// A reactive unit holding a current value and notifying observers on change.
///
/// Cloning a `Store` creates a new handle to the **same** inner state.
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Store<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                id: next_unit_id(),
                value: RefCell::new(initial),
                version: Cell::new(0),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the current value, notifying subscribers.
    ///
    /// Setting a value equal to the current one does nothing.
    pub fn set(&self, value: T) {
        {
            let current = self.inner.value.borrow();
            if *current == value {
                return;
            }
        }
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.version.set(self.inner.version.get() + 1);
        // Notify with a local clone: the value borrow is released, so
        // callbacks may read or even mutate the store.
        self.inner.subscribers.notify(&value);
    }

    /// Derive the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = {
            let current = self.inner.value.borrow();
            f(&current)
        };
        self.set(next);
    }

    /// Register a change callback; notified with the new value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.subscribers.subscribe(callback)
    }

    /// Monotonically increasing change counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Type-erased handle for use inside a shape.
    #[must_use]
    pub fn handle(&self) -> UnitHandle {
        UnitHandle::new(Rc::new(self.clone()))
    }
}

impl<T: Clone + PartialEq + 'static> AnyUnit for Store<T> {
    fn kind(&self) -> UnitKind {
        UnitKind::Store
    }

    fn id(&self) -> UnitId {
        self.inner.id
    }

    fn subscribe_erased(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| (*callback)())
    }

    fn current_erased(&self) -> Option<Rc<dyn Any>> {
        Some(Rc::new(self.get()) as Rc<dyn Any>)
    }
}

impl<T: Clone + PartialEq + 'static> From<&Store<T>> for UnitHandle {
    fn from(store: &Store<T>) -> Self {
        store.handle()
    }
}

impl<T: Clone + PartialEq + 'static> From<Store<T>> for UnitHandle {
    fn from(store: Store<T>) -> Self {
        store.handle()
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
    fn get_set_roundtrip() {
        let store = Store::new(10);
        assert_eq!(store.get(), 10);
        store.set(11);
        assert_eq!(store.get(), 11);
    }

    #[test]
    fn version_increments_per_change() {
        let store = Store::new(0);
        assert_eq!(store.version(), 0);
        store.set(1);
        store.set(2);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn equal_set_is_a_no_op() {
        let store = Store::new(42);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let guard = {
            let seen = Rc::clone(&seen);
            store.subscribe(move |v| seen.borrow_mut().push(*v))
        };

        store.set(42);
        assert_eq!(store.version(), 0);
        assert!(seen.borrow().is_empty());

        store.set(43);
        assert_eq!(*seen.borrow(), vec![43]);
        drop(guard);
    }

    #[test]
    fn subscriber_sees_new_value_via_get() {
        let store = Store::new(0);
        let observed = Rc::new(Cell::new(0));
        let guard = {
            let observed = Rc::clone(&observed);
            let reader = store.clone();
            store.subscribe(move |_| observed.set(reader.get()))
        };
        store.set(5);
        assert_eq!(observed.get(), 5);
        drop(guard);
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let store = Store::new(0);
        let count = Rc::new(Cell::new(0u32));
        let guard = {
            let count = Rc::clone(&count);
            store.subscribe(move |_| count.set(count.get() + 1))
        };
        store.set(1);
        drop(guard);
        store.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn update_derives_from_current() {
        let store = Store::new(10);
        store.update(|v| v + 5);
        assert_eq!(store.get(), 15);
        // Deriving an equal value stays a no-op.
        store.update(|v| *v);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn clones_share_state() {
        let a = Store::new(String::from("x"));
        let b = a.clone();
        a.set(String::from("y"));
        assert_eq!(b.get(), "y");
        assert_eq!(a.version(), b.version());
    }

    #[test]
    fn erased_current_matches_typed_get() {
        let store = Store::new(7i32);
        let value = store.handle().current().unwrap();
        assert_eq!(value.downcast_ref::<i32>().copied(), Some(7));
    }

    #[test]
    fn erased_subscription_fires_on_change_only() {
        let store = Store::new(0);
        let count = Rc::new(Cell::new(0u32));
        let guard = {
            let count = Rc::clone(&count);
            store.handle().subscribe_change(move || count.set(count.get() + 1))
        };
        store.set(0); // equal — no notification
        store.set(1);
        assert_eq!(count.get(), 1);
        drop(guard);
    }
}
