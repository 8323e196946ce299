//! # ot-sim-sdk::registry
//!
//! The point registry (§4.5): for each adapter, the mapping between a
//! protocol address and a tag, plus the point's configuration. Generic over
//! the protocol's address-key type `K` (a 16-bit index for DNP3/Modbus, a
//! byte/bit offset pair for S7, an FCDA path for 61850) and its
//! point-definition type `D`, so all four adapters share one implementation
//! instead of four near-identical `HashMap` pairs. Backed by `FxHashMap`,
//! matching the teacher's `ftsim-engine::net` lookup tables.

use std::hash::Hash;

use fxhash::FxHashMap;
use ot_sim_types::point::Tag;

/// Whether a point flows from the protocol toward the bus (`Input`) or from
/// the bus toward the protocol (`Output`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// A point definition must at minimum carry its own tag; adapters attach
/// whatever protocol-specific fields they need (variation, class, deadband,
/// SBO, register bank, byte/bit offsets, FCDA path, ...) on the concrete
/// type.
pub trait PointDef {
    fn tag(&self) -> &str;
}

/// Indexed by address key → definition, and by tag → address keys.
///
/// Invariant (§3.1): within one adapter, each address key maps to at most
/// one Point Definition — enforced here by insertion overwriting any prior
/// entry at that key (duplicate (bank, address) keys overwrite with a
/// warning, per §4.5).
pub struct PointRegistry<K, D> {
    by_key: FxHashMap<K, (Direction, D)>,
    by_tag: FxHashMap<Tag, Vec<K>>,
}

impl<K, D> Default for PointRegistry<K, D> {
    fn default() -> Self {
        Self { by_key: FxHashMap::default(), by_tag: FxHashMap::default() }
    }
}

impl<K, D> PointRegistry<K, D>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    D: PointDef,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, key: K, def: D) {
        self.insert(key, Direction::Input, def);
    }

    pub fn add_output(&mut self, key: K, def: D) {
        self.insert(key, Direction::Output, def);
    }

    fn insert(&mut self, key: K, dir: Direction, def: D) {
        let tag = def.tag().to_string();
        if self.by_key.contains_key(&key) {
            tracing::warn!(key = ?key, tag = %tag, "duplicate point address; overwriting prior definition");
        }
        self.by_tag.entry(tag).or_default().push(key.clone());
        self.by_key.insert(key, (dir, def));
    }

    pub fn get(&self, key: &K) -> Option<&D> {
        self.by_key.get(key).map(|(_, d)| d)
    }

    pub fn direction(&self, key: &K) -> Option<Direction> {
        self.by_key.get(key).map(|(dir, _)| *dir)
    }

    pub fn by_tag(&self, tag: &str) -> impl Iterator<Item = (&K, &D)> {
        self.by_tag
            .get(tag)
            .into_iter()
            .flatten()
            .filter_map(move |k| self.by_key.get(k).map(|(_, d)| (k, d)))
    }

    /// Outputs only: the keys whose configured tag matches. Used by an
    /// Update handler to find the protocol address to write through to.
    pub fn outputs_for_tag(&self, tag: &str) -> impl Iterator<Item = (&K, &D)> {
        self.by_tag(tag).filter(move |(k, _)| self.direction(k) == Some(Direction::Output))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, Direction, &D)> {
        self.by_key.iter().map(|(k, (dir, d))| (k, *dir, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Def(String);
    impl PointDef for Def {
        fn tag(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn duplicate_key_overwrites() {
        let mut reg: PointRegistry<u16, Def> = PointRegistry::new();
        reg.add_input(10, Def("first".into()));
        reg.add_input(10, Def("second".into()));
        assert_eq!(reg.get(&10).unwrap().tag(), "second");
    }

    #[test]
    fn duplicate_tags_across_keys_are_legal() {
        let mut reg: PointRegistry<u16, Def> = PointRegistry::new();
        reg.add_input(1, Def("shared".into()));
        reg.add_output(2, Def("shared".into()));
        assert_eq!(reg.by_tag("shared").count(), 2);
    }

    #[test]
    fn outputs_for_tag_filters_direction() {
        let mut reg: PointRegistry<u16, Def> = PointRegistry::new();
        reg.add_input(1, Def("t".into()));
        reg.add_output(2, Def("t".into()));
        let outs: Vec<_> = reg.outputs_for_tag("t").map(|(k, _)| *k).collect();
        assert_eq!(outs, vec![2]);
    }
}
