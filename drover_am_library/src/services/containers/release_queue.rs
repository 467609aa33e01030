use crate::rm_api::Container;
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Containers awaiting a release call to the RM.
/// FIFO and bounded; any task may push, the heartbeat loop drains once per
/// tick. Queueing a release is only a request: registry removal happens at
/// the event that caused it.
pub struct ReleaseQueue {
    items: Mutex<VecDeque<Container>>,
    capacity: usize,
}

impl ReleaseQueue {
    pub fn new(capacity: usize) -> Self {
        ReleaseQueue {
            items: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Queue a container for release. Fails when the queue is full, which
    /// means the heartbeat loop has not drained for many periods.
    pub fn push(&self, container: Container) -> Result<()> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            anyhow::bail!("Release queue is full at {} entries", self.capacity);
        }
        items.push_back(container);
        Ok(())
    }

    /// Take everything queued so far, in insertion order.
    pub fn drain(&self) -> Vec<Container> {
        self.items.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
