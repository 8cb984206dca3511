#![forbid(unsafe_code)]

//! Error types for unit dispatch and effect settlement.

use thiserror::Error;

use crate::unit::{UnitId, UnitKind};

/// Dispatching through a type-erased [`UnitHandle`](crate::UnitHandle) can
/// fail in ways the typed API rules out statically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The unit does not support this dispatch operation (e.g. triggering a
    /// store, or running a plain event as an effect).
    #[error("unit {unit:?} is a {kind:?} and cannot be dispatched this way")]
    NotDispatchable { unit: UnitId, kind: UnitKind },

    /// The erased payload did not downcast to the unit's payload type.
    #[error("unit {unit:?} expected a `{expected}` payload")]
    Payload { unit: UnitId, expected: &'static str },
}

/// The failure value an [`Effect`](crate::Effect) settles with.
///
/// The binding layer never inspects or transforms this; it is carried
/// verbatim in the [`Pending`](crate::Pending) handle and on the effect's
/// `failed` event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("effect failed: {message}")]
pub struct EffectFailure {
    message: String,
}

impl EffectFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
