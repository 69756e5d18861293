//! Full-replace snapshots of server state, with coalescing of overlapping
//! refreshes.
//!
//! Every refresh replaces the whole prior snapshot — partial updates are not
//! supported. Because a poll tick may fire before the previous round trip
//! resolved (and checkout forces refreshes out of band), each refresh attempt
//! is stamped with an issue sequence number and a completed result is only
//! installed if nothing newer has landed in the meantime. Arrival order is
//! never trusted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::model::MenuItem;

// ---------------------------------------------------------------------------
// Inventory snapshot
// ---------------------------------------------------------------------------

/// One internally-consistent read of the whole menu catalog.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    items: Vec<MenuItem>,
}

impl InventorySnapshot {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn get(&self, item_id: u32) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Server-reported stock for an item. Items missing from the snapshot
    /// (deleted by an admin) count as sold out.
    pub fn stock_of(&self, item_id: u32) -> u32 {
        self.get(item_id).map(|item| item.stock).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Install-if-newer cell
// ---------------------------------------------------------------------------

/// Holds the latest installed snapshot of some read model.
///
/// `begin_refresh` stamps an attempt; `install` applies its result only if
/// no later attempt has already landed. A refresh belonging to a viewer that
/// was cancelled mid-flight simply fails this check (or is never installed)
/// and its result is discarded.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    issued: AtomicU64,
    applied: Mutex<(u64, Arc<T>)>,
}

impl<T: Default> SnapshotCell<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: Mutex::new((0, Arc::new(T::default()))),
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotCell<T> {
    /// Stamp a new refresh attempt. The returned sequence number must be
    /// passed back to [`SnapshotCell::install`].
    pub fn begin_refresh(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a completed refresh. Returns false (and drops the value) if a
    /// newer refresh already landed.
    pub fn install(&self, seq: u64, value: T) -> bool {
        // A poisoned lock only means some reader panicked; the stored pair
        // is always a whole snapshot, so it is safe to keep using.
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        if seq > applied.0 {
            *applied = (seq, Arc::new(value));
            true
        } else {
            debug!(seq, applied = applied.0, "discarding stale refresh result");
            false
        }
    }

    /// The most recently installed snapshot.
    pub fn load(&self) -> Arc<T> {
        let applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&applied.1)
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .0
    }
}
