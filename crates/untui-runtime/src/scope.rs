#![forbid(unsafe_code)]

//! Per-component-instance lifecycle scope.
//!
//! # Design
//!
//! A [`ComponentScope`] stands for one live component instance. The host
//! renderer creates it with an invalidation callback (its "schedule a
//! re-render" hook) and drops it when the instance is torn down. Every
//! subscription the binding layer acquires on behalf of the instance is
//! owned here, keyed by unit id, so:
//!
//! - binding the same store twice registers exactly one subscription;
//! - dropping the scope releases every subscription deterministically
//!   (RAII, no reliance on garbage collection).
//!
//! # Invariants
//!
//! 1. At most one subscription per unit id per scope.
//! 2. A unit change reaches the host as exactly one `invalidate()` —
//!    the invalidation counter and the host callback move together.
//! 3. Subscription callbacks hold the scope weakly; a scope is never kept
//!    alive by its own subscriptions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, trace};
use untui_core::{Subscription, UnitHandle, UnitId};

struct ScopeInner {
    notify: Box<dyn Fn()>,
    invalidations: Cell<u64>,
    subscriptions: RefCell<AHashMap<UnitId, Subscription>>,
}

impl ScopeInner {
    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
        (self.notify)();
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let released = self.subscriptions.borrow().len();
        if released > 0 {
            debug!(released, "component scope dropped, subscriptions released");
        }
    }
}

/// Handle to one component instance's lifecycle.
///
/// Cloning shares the instance; the instance is torn down when the last
/// clone drops.
#[derive(Clone)]
pub struct ComponentScope {
    inner: Rc<ScopeInner>,
}

impl ComponentScope {
    /// Create a scope whose `on_invalidate` is called once per unit change
    /// reaching this instance.
    pub fn new(on_invalidate: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                notify: Box::new(on_invalidate),
                invalidations: Cell::new(0),
                subscriptions: RefCell::new(AHashMap::new()),
            }),
        }
    }

    /// A scope with no host callback. Invalidations are still counted.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(|| {})
    }

    /// Request a re-render of the owning instance.
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// How many times this instance has been invalidated.
    #[must_use]
    pub fn invalidations(&self) -> u64 {
        self.inner.invalidations.get()
    }

    /// Number of units this instance is subscribed to.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    /// Subscribe this scope to a unit's changes, once per unit id.
    ///
    /// Repeated calls for the same unit reuse the existing subscription, so
    /// binding a unit any number of times within or across renders stays
    /// referentially consistent.
    pub(crate) fn ensure_subscribed(&self, unit: &UnitHandle) {
        let id = unit.id();
        if self.inner.subscriptions.borrow().contains_key(&id) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let subscription = unit.subscribe_change(move || {
            if let Some(inner) = weak.upgrade() {
                inner.invalidate();
            }
        });
        trace!(unit = ?id, "field subscription registered");
        self.inner.subscriptions.borrow_mut().insert(id, subscription);
    }
}

impl fmt::Debug for ComponentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentScope")
            .field("invalidations", &self.invalidations())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
