#![forbid(unsafe_code)]

//! Reactive units for untui.
//!
//! This crate provides the three unit flavors the binding layer consumes:
//!
//! - [`Store`]: a shared, version-tracked value with change notification via
//!   subscriber callbacks.
//! - [`Event`]: a synchronous trigger carrying an optional payload, holding
//!   no value of its own.
//! - [`Effect`]: an asynchronous operation; dispatching it returns a
//!   [`Pending`] handle that settles when whoever holds the [`Completion`]
//!   resolves or rejects it.
//!
//! # Architecture
//!
//! Everything is single-threaded: units use `Rc<RefCell<..>>` for shared
//! ownership and there is no executor. Subscribers are stored as `Weak`
//! function pointers and cleaned up lazily during notification;
//! [`Subscription`] is the RAII guard that removes a callback eagerly on
//! drop. The [`UnitHandle`] type erases a unit's value type so heterogeneous
//! units can live side by side in one structure; classification happens
//! through [`UnitKind`], never by reimplementing unit semantics downstream.
//!
//! # Invariants
//!
//! 1. A store's version increments exactly once per mutation that changes
//!    the value; setting an equal value is a no-op (no notification).
//! 2. Subscribers are notified in registration order.
//! 3. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 4. Effect dispatch never blocks: `run()` returns a [`Pending`]
//!    immediately, and settlement happens through the [`Completion`].

pub mod effect;
pub mod error;
pub mod event;
pub mod store;
pub mod subscription;
pub mod unit;

pub use effect::{Completion, Effect, Pending, PendingState};
pub use error::{DispatchError, EffectFailure};
pub use event::Event;
pub use store::Store;
pub use subscription::Subscription;
pub use unit::{AnyUnit, UnitHandle, UnitId, UnitKind};
