#![forbid(unsafe_code)]

//! Trigger-style reactive unit: a payload, observers, no held value.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::DispatchError;
use crate::subscription::{Subscribers, Subscription};
use crate::unit::{AnyUnit, UnitHandle, UnitId, UnitKind, downcast_payload, next_unit_id};

struct EventInner<T> {
    id: UnitId,
    subscribers: Subscribers<T>,
}

/// A synchronous trigger carrying a payload of type `T`.
///
/// Use `Event<()>` for payload-free triggers. Cloning shares the inner state.
pub struct Event<T> {
    inner: Rc<EventInner<T>>,
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event").field("id", &self.inner.id).finish()
    }
}

impl<T: Clone + 'static> Event<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EventInner {
                id: next_unit_id(),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Fire the event, notifying observers in registration order.
    pub fn trigger(&self, payload: T) {
        self.inner.subscribers.notify(&payload);
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.subscribers.subscribe(callback)
    }

    /// Number of live observers.
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

impl<T: Clone + 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> AnyUnit for Event<T> {
    fn kind(&self) -> UnitKind {
        UnitKind::Event
    }

    fn id(&self) -> UnitId {
        self.inner.id
    }

    fn subscribe_erased(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| (*callback)())
    }

    fn trigger_erased(&self, payload: Option<Rc<dyn Any>>) -> Result<(), DispatchError> {
        let payload = downcast_payload::<T>(self.inner.id, payload)?;
        self.trigger(payload);
        Ok(())
    }
}

impl<T: Clone + 'static> From<&Event<T>> for UnitHandle {
    fn from(event: &Event<T>) -> Self {
        event.handle()
    }
}

impl<T: Clone + 'static> From<Event<T>> for UnitHandle {
    fn from(event: Event<T>) -> Self {
        event.handle()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
