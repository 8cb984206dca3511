#![forbid(unsafe_code)]

//! Binding a single unit into a component scope.
//!
//! [`bind_unit`] is the one place a unit crosses from the reactive graph
//! into a component: a store is read and its change-subscription acquired
//! through the scope (once per unit, however often it is bound); events and
//! effects become dispatchers that can be called from render code or event
//! handlers. Dispatchers hold no subscription — dispatching does not
//! re-render the dispatching component by itself.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use untui_core::{DispatchError, Pending, UnitHandle, UnitKind};

use crate::scope::ComponentScope;

/// Callable bound form of an [`Event`](untui_core::Event) unit.
#[derive(Clone)]
pub struct EventDispatcher {
    unit: UnitHandle,
}

impl EventDispatcher {
    pub(crate) fn new(unit: UnitHandle) -> Self {
        Self { unit }
    }

    /// Fire the event with a payload.
    pub fn emit<T: 'static>(&self, payload: T) -> Result<(), DispatchError> {
        self.unit.trigger(Some(Rc::new(payload)))
    }

    /// Fire the event with no payload (for `Event<()>`).
    pub fn trigger(&self) -> Result<(), DispatchError> {
        self.unit.trigger(None)
    }

    #[must_use]
    pub fn unit(&self) -> &UnitHandle {
        &self.unit
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventDispatcher").field(&self.unit).finish()
    }
}

/// Callable bound form of an [`Effect`](untui_core::Effect) unit.
#[derive(Clone)]
pub struct EffectDispatcher {
    unit: UnitHandle,
}

impl EffectDispatcher {
    pub(crate) fn new(unit: UnitHandle) -> Self {
        Self { unit }
    }

    /// Dispatch the effect with params; returns its [`Pending`] handle.
    pub fn run<P: 'static>(&self, params: P) -> Result<Pending, DispatchError> {
        self.unit.run(Some(Rc::new(params)))
    }

    /// Dispatch the effect with no params (for `Effect<(), _>`).
    pub fn run_unit(&self) -> Result<Pending, DispatchError> {
        self.unit.run(None)
    }

    #[must_use]
    pub fn unit(&self) -> &UnitHandle {
        &self.unit
    }
}

impl fmt::Debug for EffectDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EffectDispatcher").field(&self.unit).finish()
    }
}

/// The bound form of a single unit.
#[derive(Clone)]
pub enum BoundUnit {
    /// A store's current value.
    Value(Rc<dyn Any>),
    Event(EventDispatcher),
    Effect(EffectDispatcher),
}

impl BoundUnit {
    /// Downcast a bound store value.
    #[must_use]
    pub fn value<T: Clone + 'static>(&self) -> Option<T> {
        match self {
            BoundUnit::Value(value) => value.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }

    #[must_use]
    pub fn event(&self) -> Option<EventDispatcher> {
        match self {
            BoundUnit::Event(dispatcher) => Some(dispatcher.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn effect(&self) -> Option<EffectDispatcher> {
        match self {
            BoundUnit::Effect(dispatcher) => Some(dispatcher.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for BoundUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundUnit::Value(_) => f.write_str("BoundUnit::Value(..)"),
            BoundUnit::Event(dispatcher) => fmt::Debug::fmt(dispatcher, f),
            BoundUnit::Effect(dispatcher) => fmt::Debug::fmt(dispatcher, f),
        }
    }
}

/// Bind one unit into a component scope.
///
/// For a store this registers the scope's change-subscription (first bind
/// only) and returns the current value; for events and effects it returns
/// a dispatcher and registers nothing.
pub fn bind_unit(scope: &ComponentScope, unit: &UnitHandle) -> BoundUnit {
    match unit.kind() {
        UnitKind::Store => {
            scope.ensure_subscribed(unit);
            // Store-kind units always expose a current value.
            let value = unit.current().unwrap_or_else(|| Rc::new(()) as Rc<dyn Any>);
            BoundUnit::Value(value)
        }
        UnitKind::Event => BoundUnit::Event(EventDispatcher::new(unit.clone())),
        UnitKind::Effect => BoundUnit::Effect(EffectDispatcher::new(unit.clone())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use untui_core::{Completion, Effect, Event, Store};

    #[test]
    fn binding_a_store_reads_and_subscribes() {
        let scope = ComponentScope::detached();
        let store = Store::new(5i32);

        let bound = bind_unit(&scope, &store.handle());
        assert_eq!(bound.value::<i32>(), Some(5));
        assert_eq!(scope.subscription_count(), 1);

        store.set(6);
        assert_eq!(scope.invalidations(), 1);

        // Re-binding reads the new value without stacking subscriptions.
        let bound = bind_unit(&scope, &store.handle());
        assert_eq!(bound.value::<i32>(), Some(6));
        assert_eq!(scope.subscription_count(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn binding_an_event_yields_a_working_dispatcher() {
        let scope = ComponentScope::detached();
        let event = Event::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let guard = {
            let seen = Rc::clone(&seen);
            event.subscribe(move |v| seen.borrow_mut().push(*v))
        };

        let dispatcher = bind_unit(&scope, &event.handle()).event().unwrap();
        dispatcher.emit(3i32).unwrap();
        assert_eq!(*seen.borrow(), vec![3]);

        // No subscription, no re-render from dispatching.
        assert_eq!(scope.subscription_count(), 0);
        assert_eq!(scope.invalidations(), 0);
        drop(guard);
    }

    #[test]
    fn binding_an_effect_yields_a_running_dispatcher() {
        let scope = ComponentScope::detached();
        let effect = Effect::new(|n: i32, completion: Completion<i32>| completion.resolve(n + 1));

        let dispatcher = bind_unit(&scope, &effect.handle()).effect().unwrap();
        let pending = dispatcher.run(1i32).unwrap();
        assert_eq!(pending.value::<i32>(), Some(2));
        assert_eq!(scope.subscription_count(), 0);
    }

    #[test]
    fn dispatcher_payload_mismatch_surfaces() {
        let scope = ComponentScope::detached();
        let event = Event::<i32>::new();
        let dispatcher = bind_unit(&scope, &event.handle()).event().unwrap();
        assert!(dispatcher.emit("wrong type").is_err());
        assert!(dispatcher.trigger().is_err());
    }

    #[test]
    fn accessors_reject_the_wrong_flavor() {
        let scope = ComponentScope::detached();
        let store = Store::new(0i32);
        let bound = bind_unit(&scope, &store.handle());
        assert!(bound.event().is_none());
        assert!(bound.effect().is_none());
        assert_eq!(bound.value::<String>(), None);
    }
}
