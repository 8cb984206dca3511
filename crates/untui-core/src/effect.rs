#![forbid(unsafe_code)]

//! Asynchronous reactive unit.
//!
//! # Design
//!
//! An [`Effect<P, R>`] wraps a handler of signature `Fn(P, Completion<R>)`.
//! Dispatching via [`run()`](Effect::run) never blocks: it hands the handler
//! a [`Completion`] and immediately returns a [`Pending`] handle. The handler
//! may settle synchronously or stash the completion and settle later — there
//! is no executor; settlement is driven by whoever holds the completion.
//!
//! Around the raw dispatch, an effect carries its own observable surface:
//! a `done` event (fired with the result), a `failed` event (fired with the
//! [`EffectFailure`]), and an `in_flight` store counting unsettled
//! dispatches.
//!
//! # Failure Modes
//!
//! - **Completion dropped without settling**: the `Pending` stays in flight
//!   forever and `in_flight` never winds down. This mirrors a host that
//!   abandons the operation.
//! - **Handler panics**: propagates to the dispatcher; nothing is caught
//!   here.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{DispatchError, EffectFailure};
use crate::event::Event;
use crate::store::Store;
use crate::subscription::Subscription;
use crate::unit::{AnyUnit, UnitHandle, UnitId, UnitKind, downcast_payload, next_unit_id};

enum PendingSlot {
    InFlight,
    Done(Rc<dyn Any>),
    Failed(EffectFailure),
}

/// Observable handle for one effect dispatch.
///
/// Cloning shares the underlying slot; all clones settle together.
#[derive(Clone)]
pub struct Pending {
    slot: Rc<RefCell<PendingSlot>>,
}

/// Snapshot of a [`Pending`] handle's state.
#[derive(Clone)]
pub enum PendingState {
    InFlight,
    Done(Rc<dyn Any>),
    Failed(EffectFailure),
}

impl Pending {
    fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(PendingSlot::InFlight)),
        }
    }

    #[must_use]
    pub fn state(&self) -> PendingState {
        match &*self.slot.borrow() {
            PendingSlot::InFlight => PendingState::InFlight,
            PendingSlot::Done(value) => PendingState::Done(Rc::clone(value)),
            PendingSlot::Failed(failure) => PendingState::Failed(failure.clone()),
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(&*self.slot.borrow(), PendingSlot::InFlight)
    }

    /// Clone of the successful result, downcast to `R`.
    #[must_use]
    pub fn value<R: Clone + 'static>(&self) -> Option<R> {
        match &*self.slot.borrow() {
            PendingSlot::Done(value) => value.downcast_ref::<R>().cloned(),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<EffectFailure> {
        match &*self.slot.borrow() {
            PendingSlot::Failed(failure) => Some(failure.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot.borrow() {
            PendingSlot::InFlight => "in-flight",
            PendingSlot::Done(_) => "done",
            PendingSlot::Failed(_) => "failed",
        };
        f.debug_struct("Pending").field("state", &state).finish()
    }
}

/// Settles one dispatch of an [`Effect`]. Consumed on use.
pub struct Completion<R> {
    slot: Rc<RefCell<PendingSlot>>,
    done: Event<R>,
    failed: Event<EffectFailure>,
    in_flight: Store<u32>,
}

impl<R: Clone + 'static> Completion<R> {
    /// Settle successfully: fills the pending slot, winds down the
    /// in-flight count, then fires `done`.
    pub fn resolve(self, value: R) {
        *self.slot.borrow_mut() = PendingSlot::Done(Rc::new(value.clone()));
        self.in_flight.update(|n| n.saturating_sub(1));
        self.done.trigger(value);
    }

    /// Settle with a failure: fills the pending slot, winds down the
    /// in-flight count, then fires `failed`.
    pub fn reject(self, failure: EffectFailure) {
        *self.slot.borrow_mut() = PendingSlot::Failed(failure.clone());
        self.in_flight.update(|n| n.saturating_sub(1));
        self.failed.trigger(failure);
    }
}

impl<R> fmt::Debug for Completion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

struct EffectInner<P, R> {
    id: UnitId,
    handler: Box<dyn Fn(P, Completion<R>)>,
    done: Event<R>,
    failed: Event<EffectFailure>,
    in_flight: Store<u32>,
}

/// An asynchronous operation: params in, eventual result or failure out.
pub struct Effect<P, R> {
    inner: Rc<EffectInner<P, R>>,
}

impl<P, R> Clone for Effect<P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P, R> fmt::Debug for Effect<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("in_flight", &self.inner.in_flight.get())
            .finish()
    }
}

impl<P: Clone + 'static, R: Clone + 'static> Effect<P, R> {
    pub fn new(handler: impl Fn(P, Completion<R>) + 'static) -> Self {
        Self {
            inner: Rc::new(EffectInner {
                id: next_unit_id(),
                handler: Box::new(handler),
                done: Event::new(),
                failed: Event::new(),
                in_flight: Store::new(0),
            }),
        }
    }

    /// Dispatch the effect. Returns immediately with a [`Pending`] handle.
    pub fn run(&self, params: P) -> Pending {
        let pending = Pending::new();
        self.inner.in_flight.update(|n| n + 1);
        let completion = Completion {
            slot: Rc::clone(&pending.slot),
            done: self.inner.done.clone(),
            failed: self.inner.failed.clone(),
            in_flight: self.inner.in_flight.clone(),
        };
        (self.inner.handler)(params, completion);
        pending
    }

    /// Fired with the result of each successful dispatch.
    #[must_use]
    pub fn done(&self) -> &Event<R> {
        &self.inner.done
    }

    /// Fired with the failure of each rejected dispatch.
    #[must_use]
    pub fn failed(&self) -> &Event<EffectFailure> {
        &self.inner.failed
    }

    /// Count of dispatches that have not settled yet.
    #[must_use]
    pub fn in_flight(&self) -> &Store<u32> {
        &self.inner.in_flight
    }

    /// Type-erased handle for use inside a shape.
    #[must_use]
    pub fn handle(&self) -> UnitHandle {
        UnitHandle::new(Rc::new(self.clone()))
    }
}

impl<P: Clone + 'static, R: Clone + 'static> AnyUnit for Effect<P, R> {
    fn kind(&self) -> UnitKind {
        UnitKind::Effect
    }

    fn id(&self) -> UnitId {
        self.inner.id
    }

    fn subscribe_erased(&self, callback: Rc<dyn Fn()>) -> Subscription {
        // Effect "change" is dispatch or settlement, i.e. in-flight movement.
        self.inner.in_flight.subscribe(move |_| (*callback)())
    }

    fn run_erased(&self, payload: Option<Rc<dyn Any>>) -> Result<Pending, DispatchError> {
        let params = downcast_payload::<P>(self.inner.id, payload)?;
        Ok(self.run(params))
    }
}

impl<P: Clone + 'static, R: Clone + 'static> From<&Effect<P, R>> for UnitHandle {
    fn from(effect: &Effect<P, R>) -> Self {
        effect.handle()
    }
}

impl<P: Clone + 'static, R: Clone + 'static> From<Effect<P, R>> for UnitHandle {
    fn from(effect: Effect<P, R>) -> Self {
        effect.handle()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
