use crate::rm_api::{Container, ContainerId, Priority};
use drover_library::transaction::TransactionId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Default)]
struct RegistryIndexes {
    by_id: BTreeMap<ContainerId, Container>,
    by_priority: BTreeMap<Priority, BTreeSet<ContainerId>>,
}

impl RegistryIndexes {
    fn insert(&mut self, container: Container) {
        if let Some(prev) = self.by_id.insert(container.id, container.clone()) {
            if prev.priority != container.priority {
                if let Some(band) = self.by_priority.get_mut(&prev.priority) {
                    band.remove(&prev.id);
                }
            }
        }
        self.by_priority.entry(container.priority).or_default().insert(container.id);
    }
}

/// Bookkeeping of the application's running containers, indexed by id and by
/// priority band. Both indexes live under one lock so cross-index updates are
/// atomic; bands use ordered sets so iteration (and therefore logs and tests)
/// is deterministic.
#[derive(Default)]
pub struct ContainerRegistry {
    indexes: RwLock<RegistryIndexes>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the snapshot for a container.
    /// An overwrite that moves the priority also moves the id between bands.
    pub fn insert(&self, container: Container, tid: &TransactionId) {
        debug!(tid=tid, container_id=%container.id, priority=%container.priority, "Inserting container into registry");
        self.indexes.write().insert(container);
    }

    /// Replace the snapshot only if the container is still tracked.
    /// Used for RM-reported updates, where racing removal must win.
    pub fn update_snapshot(&self, container: Container, tid: &TransactionId) -> bool {
        let mut indexes = self.indexes.write();
        if !indexes.by_id.contains_key(&container.id) {
            debug!(tid=tid, container_id=%container.id, "Skipping snapshot update for untracked container");
            return false;
        }
        indexes.insert(container);
        true
    }

    /// Remove a container from both indexes.
    pub fn remove_by_id(&self, id: &ContainerId, tid: &TransactionId) -> Option<Container> {
        let mut indexes = self.indexes.write();
        let removed = indexes.by_id.remove(id);
        if let Some(container) = &removed {
            if let Some(band) = indexes.by_priority.get_mut(&container.priority) {
                band.remove(id);
            }
            debug!(tid=tid, container_id=%id, priority=%container.priority, "Removed container from registry");
        }
        removed
    }

    /// Drop an id from a priority band, tolerating prior removal.
    pub fn remove_from_band(&self, priority: Priority, id: &ContainerId) {
        if let Some(band) = self.indexes.write().by_priority.get_mut(&priority) {
            band.remove(id);
        }
    }

    /// Create an empty band for a newly published priority. Bands are never retired.
    pub fn ensure_priority(&self, priority: Priority) {
        self.indexes.write().by_priority.entry(priority).or_default();
    }

    /// Consistent copy of every tracked container, in id order.
    pub fn snapshot_all(&self) -> Vec<Container> {
        self.indexes.read().by_id.values().cloned().collect()
    }

    pub fn contains(&self, id: &ContainerId) -> bool {
        self.indexes.read().by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.indexes.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids currently in the band for `priority`, in order.
    pub fn band(&self, priority: Priority) -> Vec<ContainerId> {
        self.indexes
            .read()
            .by_priority
            .get(&priority)
            .map(|band| band.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every priority a band exists for, in order.
    pub fn priorities(&self) -> Vec<Priority> {
        self.indexes.read().by_priority.keys().copied().collect()
    }
}
