//! # ot-sim-sdk::writesuppression
//!
//! The write-suppression rule (§5): when an Update causes an adapter to
//! write to its protocol database, the scan cycle that follows must not
//! immediately re-publish that same tag as a Status, or the system
//! oscillates. The spec names two concrete expressions of the same rule —
//! Modbus's dirty-from-bus-vs-dirty-from-protocol flags, DNP3's
//! "consumed-this-cycle" tag set — and leaves the suppression window
//! ambiguous ("one cycle vs. until next scan"). This is one shared,
//! generic `DirtySet<K>` used by both: the window is **exactly one cycle**
//! — a key marked dirty is reported (or suppressed) exactly once by the
//! next call to `drain`, which also clears it (see DESIGN.md).

use std::hash::Hash;
use std::sync::Mutex;

use fxhash::FxHashSet;

/// A per-cycle set of "already handled this cycle" keys (an address, for
/// Modbus/S7; a tag, for DNP3/61850). Guarded by a mutex whose critical
/// section never spans I/O (§5).
pub struct DirtySet<K> {
    inner: Mutex<FxHashSet<K>>,
}

impl<K> Default for DirtySet<K> {
    fn default() -> Self {
        Self { inner: Mutex::new(FxHashSet::default()) }
    }
}

impl<K: Eq + Hash + Clone> DirtySet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` dirty for the current cycle. Returns `true` if it was
    /// not already dirty (the first writer in a cycle "wins" the mark).
    pub fn mark(&self, key: K) -> bool {
        self.inner.lock().expect("dirty set lock poisoned").insert(key)
    }

    pub fn is_dirty(&self, key: &K) -> bool {
        self.inner.lock().expect("dirty set lock poisoned").contains(key)
    }

    /// Takes and clears the current cycle's dirty set. Called once per scan
    /// cycle at the point where the adapter decides what to report/suppress.
    pub fn drain(&self) -> FxHashSet<K> {
        std::mem::take(&mut *self.inner.lock().expect("dirty set lock poisoned"))
    }
}
