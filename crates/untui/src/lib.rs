#![forbid(unsafe_code)]

//! untui public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use untui_core as core;
    pub use untui_runtime as runtime;

    pub use untui_core::{
        Completion, DispatchError, Effect, EffectFailure, Event, Pending, PendingState, Store,
        Subscription, UnitHandle, UnitId, UnitKind,
    };
    pub use untui_runtime::{
        BoundField, BoundShape, BoundUnit, ComponentScope, EffectDispatcher, EventDispatcher,
        Resolved, Shape, ShapeBinding, ShapeEntry, ShapeMap, bind_unit, resolve_key,
    };
}
