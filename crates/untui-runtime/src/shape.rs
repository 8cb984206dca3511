#![forbid(unsafe_code)]

//! The caller-supplied description of what a component observes.
//!
//! A [`Shape`] is either a single unit or a [`ShapeMap`]: a string-keyed,
//! insertion-ordered map whose entries are units, nested maps, or plain
//! values passed through untouched. Maps nest to arbitrary depth.
//!
//! A shape is built once, before the first render, and must stay
//! *referentially* the same for the life of the component instance — the
//! binding layer memoizes its wiring on that identity (`Rc` pointer for
//! maps, unit id for bare units). Cloning a `Shape` is cheap and preserves
//! identity.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use untui_core::UnitHandle;

/// One entry of a [`ShapeMap`].
#[derive(Clone)]
pub enum ShapeEntry {
    /// A reactive unit, bound on first read.
    Unit(UnitHandle),
    /// A nested map, resolved to a further lazy view on first read.
    Nested(Rc<ShapeMap>),
    /// An arbitrary plain value, passed through verbatim.
    Value(Rc<dyn Any>),
}

impl fmt::Debug for ShapeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeEntry::Unit(unit) => f.debug_tuple("Unit").field(unit).finish(),
            ShapeEntry::Nested(map) => f.debug_tuple("Nested").field(map).finish(),
            ShapeEntry::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// Insertion-ordered map from keys to [`ShapeEntry`] values.
///
/// Built with the `with_*` methods; inserting an existing key replaces the
/// entry in place, keeping its position.
#[derive(Default)]
pub struct ShapeMap {
    entries: Vec<(String, ShapeEntry)>,
    index: AHashMap<String, usize>,
}

impl ShapeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit entry. Prefix store keys with `$` by convention.
    #[must_use]
    pub fn with_unit(mut self, key: impl Into<String>, unit: impl Into<UnitHandle>) -> Self {
        self.insert(key.into(), ShapeEntry::Unit(unit.into()));
        self
    }

    /// Add a nested map entry.
    #[must_use]
    pub fn with_nested(mut self, key: impl Into<String>, nested: ShapeMap) -> Self {
        self.insert(key.into(), ShapeEntry::Nested(Rc::new(nested)));
        self
    }

    /// Add a plain value entry, passed through to the consumer untouched.
    #[must_use]
    pub fn with_value<V: 'static>(mut self, key: impl Into<String>, value: V) -> Self {
        self.insert(key.into(), ShapeEntry::Value(Rc::new(value)));
        self
    }

    fn insert(&mut self, key: String, entry: ShapeEntry) {
        if let Some(&position) = self.index.get(&key) {
            self.entries[position].1 = entry;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, entry));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ShapeEntry> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    /// The stored key together with its entry, borrowed from the map.
    pub(crate) fn key_entry(&self, key: &str) -> Option<(&str, &ShapeEntry)> {
        self.index.get(key).map(|&position| {
            let (stored, entry) = &self.entries[position];
            (stored.as_str(), entry)
        })
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShapeEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Stored keys (as written, sigils included) in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl fmt::Debug for ShapeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// What a component observes: a bare unit or a keyed map.
#[derive(Clone, Debug)]
pub enum Shape {
    Unit(UnitHandle),
    Map(Rc<ShapeMap>),
}

impl Shape {
    pub fn unit(unit: impl Into<UnitHandle>) -> Self {
        Shape::Unit(unit.into())
    }

    #[must_use]
    pub fn map(map: ShapeMap) -> Self {
        Shape::Map(Rc::new(map))
    }

    /// Whether two shapes are the *same* shape, not merely equal ones:
    /// the same unit, or the same map allocation.
    #[must_use]
    pub fn same_identity(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Unit(a), Shape::Unit(b)) => a == b,
            (Shape::Map(a), Shape::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<ShapeMap> for Shape {
    fn from(map: ShapeMap) -> Self {
        Shape::map(map)
    }
}

impl From<UnitHandle> for Shape {
    fn from(unit: UnitHandle) -> Self {
        Shape::Unit(unit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
