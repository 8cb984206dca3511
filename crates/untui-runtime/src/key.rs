#![forbid(unsafe_code)]

//! `$`-sigil key resolution.
//!
//! Shapes conventionally prefix store keys with `$` (`"$count"`), while the
//! consumer reads them without it (`"count"`). [`resolve_key`] maps a
//! requested logical key to the actual stored key:
//!
//! 1. A literal match always wins, whatever kind of entry it holds.
//! 2. Otherwise `$`-prefixing the request matches iff the entry there is a
//!    *store* unit. Events, effects, nested maps, and plain values are
//!    never reachable through the sigil.
//! 3. Otherwise the key does not resolve — a missing-property read, not an
//!    error.
//!
//! Pure function of the map's own keys and the entry kinds; no side
//! effects.

use crate::shape::{ShapeEntry, ShapeMap};

/// Prefix marking store-typed keys in a shape.
pub const STORE_KEY_SIGIL: char = '$';

/// Resolve a requested logical key to the stored key holding the answer.
#[must_use]
pub fn resolve_key<'a>(map: &'a ShapeMap, requested: &str) -> Option<&'a str> {
    if let Some((stored, _)) = map.key_entry(requested) {
        return Some(stored);
    }
    let alias = format!("{STORE_KEY_SIGIL}{requested}");
    match map.key_entry(&alias) {
        Some((stored, ShapeEntry::Unit(unit))) if unit.is_store() => Some(stored),
        _ => None,
    }
}

/// The logical (post-aliasing) name a stored key is read back under.
///
/// A `$`-prefixed store key reads back stripped unless the stripped name
/// collides with a literal key, in which case the literal key owns the
/// name and the sigiled key keeps its sigil.
pub(crate) fn logical_name<'a>(map: &'a ShapeMap, stored: &'a str) -> &'a str {
    let Some((_, ShapeEntry::Unit(unit))) = map.key_entry(stored) else {
        return stored;
    };
    if !unit.is_store() {
        return stored;
    }
    match stored.strip_prefix(STORE_KEY_SIGIL) {
        Some(stripped) if !map.contains_key(stripped) => stripped,
        _ => stored,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeMap;
    use untui_core::{Event, Store};

    #[test]
    fn literal_match_wins() {
        let map = ShapeMap::new()
            .with_unit("storeA", &Store::new(1))
            .with_unit("$storeA", &Store::new(2));
        assert_eq!(resolve_key(&map, "storeA"), Some("storeA"));
        assert_eq!(resolve_key(&map, "$storeA"), Some("$storeA"));
    }

    #[test]
    fn sigil_reaches_stores_only() {
        let map = ShapeMap::new()
            .with_unit("$count", &Store::new(0))
            .with_unit("$clicked", &Event::<()>::new())
            .with_value("$label", "x");
        assert_eq!(resolve_key(&map, "count"), Some("$count"));
        assert_eq!(resolve_key(&map, "clicked"), None);
        assert_eq!(resolve_key(&map, "label"), None);
    }

    #[test]
    fn unresolvable_key_is_none() {
        let map = ShapeMap::new().with_unit("$count", &Store::new(0));
        assert_eq!(resolve_key(&map, "missing"), None);
    }

    #[test]
    fn logical_names_strip_the_sigil_for_stores() {
        let map = ShapeMap::new()
            .with_unit("$count", &Store::new(0))
            .with_unit("$clicked", &Event::<()>::new())
            .with_value("label", "x");
        assert_eq!(logical_name(&map, "$count"), "count");
        assert_eq!(logical_name(&map, "$clicked"), "$clicked");
        assert_eq!(logical_name(&map, "label"), "label");
    }

    #[test]
    fn logical_name_defers_to_literal_collisions() {
        let map = ShapeMap::new()
            .with_unit("storeA", &Store::new(1))
            .with_unit("$storeA", &Store::new(2));
        assert_eq!(logical_name(&map, "storeA"), "storeA");
        assert_eq!(logical_name(&map, "$storeA"), "$storeA");
    }
}
