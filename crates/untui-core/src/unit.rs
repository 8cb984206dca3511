#![forbid(unsafe_code)]

//! Type-erased unit classification and dispatch.
//!
//! A shape mixes stores, events, and effects with unrelated value types, so
//! the binding layer works against [`UnitHandle`], a cheap cloneable handle
//! that erases the payload type. Classification is a [`UnitKind`] check; the
//! handle never exposes enough to reimplement unit semantics downstream.
//!
//! Erased dispatch is split per capability ([`AnyUnit::trigger_erased`] for
//! events, [`AnyUnit::run_erased`] for effects) so that the impossible
//! combinations are `DispatchError`s instead of panics.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::effect::Pending;
use crate::error::DispatchError;
use crate::subscription::Subscription;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_unit_id() -> UnitId {
    UnitId(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Process-unique identity of a unit.
///
/// Clones of a `Store`/`Event`/`Effect` handle share one id; two separately
/// created units never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(u64);

/// The three unit flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Holds a current value and notifies on change.
    Store,
    /// A synchronous trigger with an optional payload, no held value.
    Event,
    /// An asynchronous operation settled through a `Completion`.
    Effect,
}

/// The erased surface every unit exposes.
///
/// `current_erased` is meaningful only for stores; `trigger_erased` only for
/// events; `run_erased` only for effects. The defaults report the mismatch
/// as a [`DispatchError::NotDispatchable`].
pub trait AnyUnit {
    fn kind(&self) -> UnitKind;

    fn id(&self) -> UnitId;

    /// Register a payload-free change callback.
    ///
    /// Stores notify on value change, events on trigger, effects on
    /// in-flight count change (dispatch and settlement).
    fn subscribe_erased(&self, callback: Rc<dyn Fn()>) -> Subscription;

    /// Clone of the current value. `None` for units that hold no value.
    fn current_erased(&self) -> Option<Rc<dyn Any>> {
        None
    }

    fn trigger_erased(&self, _payload: Option<Rc<dyn Any>>) -> Result<(), DispatchError> {
        Err(DispatchError::NotDispatchable {
            unit: self.id(),
            kind: self.kind(),
        })
    }

    fn run_erased(&self, _payload: Option<Rc<dyn Any>>) -> Result<Pending, DispatchError> {
        Err(DispatchError::NotDispatchable {
            unit: self.id(),
            kind: self.kind(),
        })
    }
}

/// Downcast an erased payload to the unit's payload type.
///
/// A missing payload stands in for `()` so that unit-payload events and
/// effects can be dispatched without arguments.
pub(crate) fn downcast_payload<T: Clone + 'static>(
    unit: UnitId,
    payload: Option<Rc<dyn Any>>,
) -> Result<T, DispatchError> {
    let payload = payload.unwrap_or_else(|| Rc::new(()) as Rc<dyn Any>);
    payload
        .downcast_ref::<T>()
        .cloned()
        .ok_or(DispatchError::Payload {
            unit,
            expected: std::any::type_name::<T>(),
        })
}

/// Cheap cloneable handle to any unit, with the payload type erased.
#[derive(Clone)]
pub struct UnitHandle {
    unit: Rc<dyn AnyUnit>,
}

impl UnitHandle {
    pub(crate) fn new(unit: Rc<dyn AnyUnit>) -> Self {
        Self { unit }
    }

    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.unit.kind()
    }

    #[must_use]
    pub fn id(&self) -> UnitId {
        self.unit.id()
    }

    #[must_use]
    pub fn is_store(&self) -> bool {
        self.kind() == UnitKind::Store
    }

    /// Register a payload-free change callback.
    pub fn subscribe_change(&self, callback: impl Fn() + 'static) -> Subscription {
        self.unit.subscribe_erased(Rc::new(callback))
    }

    /// Clone of the current value; `None` unless this is a store.
    #[must_use]
    pub fn current(&self) -> Option<Rc<dyn Any>> {
        self.unit.current_erased()
    }

    /// Trigger an event unit. `None` stands in for a `()` payload.
    pub fn trigger(&self, payload: Option<Rc<dyn Any>>) -> Result<(), DispatchError> {
        self.unit.trigger_erased(payload)
    }

    /// Run an effect unit. `None` stands in for `()` params.
    pub fn run(&self, payload: Option<Rc<dyn Any>>) -> Result<Pending, DispatchError> {
        self.unit.run_erased(payload)
    }
}

impl PartialEq for UnitHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for UnitHandle {}

impl fmt::Debug for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitHandle")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
