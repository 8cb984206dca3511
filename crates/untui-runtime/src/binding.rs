#![forbid(unsafe_code)]

//! Shape resolution: the lazy view a component destructures.
//!
//! # Design
//!
//! [`ShapeBinding`] is the per-component-instance entry point. On the first
//! [`resolve`](ShapeBinding::resolve) it captures the shape reference and —
//! for map shapes — builds a [`BoundShape`], a key-indexed view of lazily
//! initialized field accessors. Nothing is bound up front: reading a field
//! resolves its key, binds the unit found there (registering that field's
//! re-render subscription on first read), recurses into nested maps on
//! demand, and passes plain values through verbatim. A bare-unit shape
//! skips all of that and degenerates to a direct [`bind_unit`] passthrough.
//!
//! # Invariants
//!
//! 1. Fields never read register no subscription and cause no re-render of
//!    the consuming instance — the property this module exists for.
//! 2. Wiring is memoized per shape identity. A later `resolve` with a
//!    different reference emits one error-level diagnostic per offending
//!    call and keeps the original wiring; it never re-wires. Re-wiring was
//!    deliberately rejected in favor of surfacing the programmer error.
//! 3. Store fields re-read their current value on every access; the cached
//!    part is the wiring (key resolution, subscription, nested views), not
//!    the value.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use tracing::error;
use untui_core::{UnitHandle, UnitKind};

use crate::bind::{BoundUnit, EffectDispatcher, EventDispatcher, bind_unit};
use crate::key::{logical_name, resolve_key};
use crate::scope::ComponentScope;
use crate::shape::{Shape, ShapeEntry, ShapeMap};

/// Total number of shape-identity violations observed, process-wide.
///
/// Mirrors the error-level diagnostic for cheap assertions in tests and
/// telemetry.
static SHAPE_IDENTITY_VIOLATIONS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Read the total shape-identity violation count.
#[must_use]
pub fn shape_identity_violations_total() -> u64 {
    SHAPE_IDENTITY_VIOLATIONS_TOTAL.load(Ordering::Relaxed)
}

/// The bound form of one field read from a [`BoundShape`].
#[derive(Clone)]
pub enum BoundField {
    /// A store's current value.
    Value(Rc<dyn Any>),
    Event(EventDispatcher),
    Effect(EffectDispatcher),
    /// A nested map, itself a lazy view.
    Shape(BoundShape),
    /// A plain value passed through verbatim.
    Plain(Rc<dyn Any>),
    /// The key did not resolve. A missing-property read, not an error.
    Missing,
}

impl BoundField {
    /// Downcast a store value or plain value.
    #[must_use]
    pub fn value<T: Clone + 'static>(&self) -> Option<T> {
        match self {
            BoundField::Value(value) | BoundField::Plain(value) => {
                value.downcast_ref::<T>().cloned()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn event(&self) -> Option<EventDispatcher> {
        match self {
            BoundField::Event(dispatcher) => Some(dispatcher.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn effect(&self) -> Option<EffectDispatcher> {
        match self {
            BoundField::Effect(dispatcher) => Some(dispatcher.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn shape(&self) -> Option<BoundShape> {
        match self {
            BoundField::Shape(view) => Some(view.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, BoundField::Missing)
    }
}

impl fmt::Debug for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundField::Value(_) => f.write_str("Value(..)"),
            BoundField::Event(dispatcher) => fmt::Debug::fmt(dispatcher, f),
            BoundField::Effect(dispatcher) => fmt::Debug::fmt(dispatcher, f),
            BoundField::Shape(view) => fmt::Debug::fmt(view, f),
            BoundField::Plain(_) => f.write_str("Plain(..)"),
            BoundField::Missing => f.write_str("Missing"),
        }
    }
}

/// Per-field wiring, created on first read and kept for the instance's
/// lifetime. Store wiring holds the unit, not a value snapshot.
enum FieldWiring {
    Store(UnitHandle),
    Event(EventDispatcher),
    Effect(EffectDispatcher),
    Nested(BoundShape),
    Plain(Rc<dyn Any>),
    Missing,
}

struct BoundShapeInner {
    scope: ComponentScope,
    map: Rc<ShapeMap>,
    fields: RefCell<AHashMap<String, FieldWiring>>,
}

/// Lazy key-indexed view over a map shape.
///
/// Cloning shares the view and its wiring.
#[derive(Clone)]
pub struct BoundShape {
    inner: Rc<BoundShapeInner>,
}

impl BoundShape {
    fn new(scope: ComponentScope, map: Rc<ShapeMap>) -> Self {
        Self {
            inner: Rc::new(BoundShapeInner {
                scope,
                map,
                fields: RefCell::new(AHashMap::new()),
            }),
        }
    }

    /// Read one logical field, wiring it on first access.
    #[must_use]
    pub fn get(&self, key: &str) -> BoundField {
        if let Some(field) = self
            .inner
            .fields
            .borrow()
            .get(key)
            .map(|wiring| self.materialize(wiring))
        {
            return field;
        }
        let wiring = self.wire(key);
        let field = self.materialize(&wiring);
        self.inner
            .fields
            .borrow_mut()
            .insert(key.to_string(), wiring);
        field
    }

    /// The logical (post-aliasing) key names, in shape insertion order.
    ///
    /// Reading names is free: no field is wired by enumerating them.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner
            .map
            .keys()
            .map(|stored| logical_name(&self.inner.map, stored))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.map.is_empty()
    }

    fn wire(&self, key: &str) -> FieldWiring {
        let Some(stored) = resolve_key(&self.inner.map, key) else {
            return FieldWiring::Missing;
        };
        match self.inner.map.get(stored) {
            Some(ShapeEntry::Unit(unit)) => match unit.kind() {
                UnitKind::Store => {
                    self.inner.scope.ensure_subscribed(unit);
                    FieldWiring::Store(unit.clone())
                }
                UnitKind::Event => FieldWiring::Event(EventDispatcher::new(unit.clone())),
                UnitKind::Effect => FieldWiring::Effect(EffectDispatcher::new(unit.clone())),
            },
            Some(ShapeEntry::Nested(nested)) => FieldWiring::Nested(BoundShape::new(
                self.inner.scope.clone(),
                Rc::clone(nested),
            )),
            Some(ShapeEntry::Value(value)) => FieldWiring::Plain(Rc::clone(value)),
            // resolve_key only returns live keys.
            None => FieldWiring::Missing,
        }
    }

    fn materialize(&self, wiring: &FieldWiring) -> BoundField {
        match wiring {
            FieldWiring::Store(unit) => {
                // Store-kind units always expose a current value.
                let value = unit.current().unwrap_or_else(|| Rc::new(()) as Rc<dyn Any>);
                BoundField::Value(value)
            }
            FieldWiring::Event(dispatcher) => BoundField::Event(dispatcher.clone()),
            FieldWiring::Effect(dispatcher) => BoundField::Effect(dispatcher.clone()),
            FieldWiring::Nested(view) => BoundField::Shape(view.clone()),
            FieldWiring::Plain(value) => BoundField::Plain(Rc::clone(value)),
            FieldWiring::Missing => BoundField::Missing,
        }
    }
}

impl fmt::Debug for BoundShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundShape")
            .field("keys", &self.inner.map.len())
            .field("wired", &self.inner.fields.borrow().len())
            .finish()
    }
}

/// Result of resolving a shape: a bare unit's bound form, or a lazy view.
#[derive(Clone, Debug)]
pub enum Resolved {
    Unit(BoundUnit),
    Map(BoundShape),
}

impl Resolved {
    #[must_use]
    pub fn unit(&self) -> Option<&BoundUnit> {
        match self {
            Resolved::Unit(bound) => Some(bound),
            Resolved::Map(_) => None,
        }
    }

    #[must_use]
    pub fn map(&self) -> Option<BoundShape> {
        match self {
            Resolved::Map(view) => Some(view.clone()),
            Resolved::Unit(_) => None,
        }
    }

    /// Downcast a bare store's value.
    #[must_use]
    pub fn value<T: Clone + 'static>(&self) -> Option<T> {
        self.unit().and_then(BoundUnit::value)
    }

    #[must_use]
    pub fn event(&self) -> Option<EventDispatcher> {
        self.unit().and_then(BoundUnit::event)
    }

    #[must_use]
    pub fn effect(&self) -> Option<EffectDispatcher> {
        self.unit().and_then(BoundUnit::effect)
    }

    /// Read a field of a map shape; `Missing` on a bare-unit shape.
    #[must_use]
    pub fn get(&self, key: &str) -> BoundField {
        match self {
            Resolved::Map(view) => view.get(key),
            Resolved::Unit(_) => BoundField::Missing,
        }
    }
}

/// First-resolve wiring: the identity anchor plus what resolving yields.
enum Wiring {
    /// Bare unit; re-bound fresh on every resolve.
    Unit(UnitHandle),
    /// Map shape: the anchoring allocation and its memoized view.
    Map(Rc<ShapeMap>, BoundShape),
}

impl Wiring {
    fn matches(&self, shape: &Shape) -> bool {
        match (self, shape) {
            (Wiring::Unit(unit), Shape::Unit(other)) => unit == other,
            (Wiring::Map(map, _), Shape::Map(other)) => Rc::ptr_eq(map, other),
            _ => false,
        }
    }
}

/// Per-component-instance resolver. Create one alongside the instance's
/// [`ComponentScope`]; call [`resolve`](Self::resolve) every render with
/// the *same* shape reference.
pub struct ShapeBinding {
    scope: ComponentScope,
    wiring: RefCell<Option<Wiring>>,
}

impl ShapeBinding {
    #[must_use]
    pub fn new(scope: &ComponentScope) -> Self {
        Self {
            scope: scope.clone(),
            wiring: RefCell::new(None),
        }
    }

    /// Resolve the shape for one render.
    ///
    /// If `shape` is not the reference seen on the first call, an
    /// error-level diagnostic is emitted and the first call's wiring is
    /// used anyway — stale wiring is knowingly kept.
    pub fn resolve(&self, shape: &Shape) -> Resolved {
        let mut slot = self.wiring.borrow_mut();
        let wiring = slot.get_or_insert_with(|| match shape {
            Shape::Unit(unit) => Wiring::Unit(unit.clone()),
            Shape::Map(map) => Wiring::Map(
                Rc::clone(map),
                BoundShape::new(self.scope.clone(), Rc::clone(map)),
            ),
        });
        if !wiring.matches(shape) {
            SHAPE_IDENTITY_VIOLATIONS_TOTAL.fetch_add(1, Ordering::Relaxed);
            error!(
                "shape passed to ShapeBinding::resolve changed across renders; \
                 keeping the wiring from the first render"
            );
        }
        match wiring {
            Wiring::Unit(unit) => Resolved::Unit(bind_unit(&self.scope, unit)),
            Wiring::Map(_, view) => Resolved::Map(view.clone()),
        }
    }
}

impl fmt::Debug for ShapeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeBinding")
            .field("wired", &self.wiring.borrow().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
