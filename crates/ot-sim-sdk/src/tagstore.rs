//! # ot-sim-sdk::tagstore
//!
//! The process-wide tag → point mapping shared across every protocol
//! adapter. A small trait-based abstraction with a single in-memory
//! implementation; state does not persist across restarts.

use std::sync::RwLock;

use fxhash::FxHashMap;
use ot_sim_types::point::{Point, Tag};

/// A mapping from tag to its last-known point. Implementations must be safe
/// under concurrent callers: an observer that calls `get` after a `set`
/// returns must observe at least that value. No cross-tag atomicity is
/// required.
pub trait TagStore: Send + Sync {
    fn set(&self, point: Point);
    fn get(&self, tag: &str) -> Option<Point>;
    fn snapshot(&self) -> Vec<Point>;
}

/// A `RwLock`-guarded `HashMap` tag store. Writers hold the lock only for
/// the map mutation itself, never across bus I/O.
#[derive(Default)]
pub struct MemTagStore {
    points: RwLock<FxHashMap<Tag, Point>>,
}

impl MemTagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TagStore for MemTagStore {
    fn set(&self, point: Point) {
        let mut guard = self.points.write().expect("tag store lock poisoned");
        guard.insert(point.tag.clone(), point);
    }

    fn get(&self, tag: &str) -> Option<Point> {
        let guard = self.points.read().expect("tag store lock poisoned");
        guard.get(tag).cloned()
    }

    fn snapshot(&self) -> Vec<Point> {
        let guard = self.points.read().expect("tag store lock poisoned");
        guard.values().cloned().collect()
    }
}
