use std::collections::BTreeSet;

/// Source of nodes the application refuses to be scheduled on.
/// The dependency is optional; an absent tracker reads as an empty set.
pub trait BlacklistTracker: Send + Sync {
    /// The current full set of blacklisted node addresses.
    fn node_blacklist(&self) -> BTreeSet<String>;
}

/// The node blacklist as last accepted by the RM.
/// Owned by the heartbeat loop; each tick diffs the tracker's latest set
/// against this view and commits once the RM takes the delta.
#[derive(Default)]
pub struct BlacklistView {
    reported: BTreeSet<String>,
}

impl BlacklistView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additions and removals that move the RM from the reported view to `latest`.
    /// Both come back sorted.
    pub fn delta(&self, latest: &BTreeSet<String>) -> (Vec<String>, Vec<String>) {
        let additions = latest.difference(&self.reported).cloned().collect();
        let removals = self.reported.difference(latest).cloned().collect();
        (additions, removals)
    }

    /// Replace the reported view once the RM has accepted the delta.
    pub fn commit(&mut self, latest: BTreeSet<String>) {
        self.reported = latest;
    }

    pub fn reported(&self) -> &BTreeSet<String> {
        &self.reported
    }
}
