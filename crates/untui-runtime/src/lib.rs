#![forbid(unsafe_code)]

//! Component-facing adapter between reactive units and a rendering host.
//!
//! A rendering component describes what it wants to observe as a [`Shape`]:
//! either a single unit, or a nested string-keyed map mixing units, nested
//! maps, and plain values. A [`ShapeBinding`] resolves that shape into a
//! lazy view whose fields are bound one by one, at read time:
//!
//! - a store field reads as its current value and subscribes the owning
//!   [`ComponentScope`] to changes — on the *first* read, never eagerly;
//! - an event field reads as an [`EventDispatcher`];
//! - an effect field reads as an [`EffectDispatcher`];
//! - a nested map reads as a further lazy view;
//! - anything else passes through verbatim.
//!
//! Fields the component never reads are free: no subscription, no
//! re-render when the unit behind them changes. That is the property this
//! crate exists to provide.
//!
//! Store keys may carry a `$` sigil in the shape (`"$count"`) and are read
//! back without it (`"count"`); see [`resolve_key`] for the exact rules.

pub mod bind;
pub mod binding;
pub mod key;
pub mod scope;
pub mod shape;

pub use bind::{BoundUnit, EffectDispatcher, EventDispatcher, bind_unit};
pub use binding::{
    BoundField, BoundShape, Resolved, ShapeBinding, shape_identity_violations_total,
};
pub use key::{STORE_KEY_SIGIL, resolve_key};
pub use scope::ComponentScope;
pub use shape::{Shape, ShapeEntry, ShapeMap};
