//! Lowest-free-slot integer id allocator.
//!
//! Each id is free, locked or used. `acquire` locks the lowest free id
//! starting at 1; `commit` makes it permanent, `unlock` cancels it, and
//! `release` frees it again so the gap is reissued by the next `acquire`.
//!
//! Not internally synchronized: share it behind a `Mutex`.

use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    used: BTreeSet<u64>,
    locked: BTreeSet<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the used set with ids that already exist (e.g. persisted trades).
    pub fn seed<I>(&mut self, existing: I)
    where
        I: IntoIterator<Item = u64>,
    {
        self.used = existing.into_iter().filter(|&id| id > 0).collect();
    }

    /// Mark one existing id as used. 0 is never a valid id and is ignored.
    pub fn seed_single(&mut self, id: u64) {
        if id > 0 {
            self.used.insert(id);
        }
    }

    /// Lock and return the lowest id that is neither used nor locked.
    pub fn acquire(&mut self) -> u64 {
        let mut id = 1;
        while !self.is_available(id) {
            id += 1;
        }
        self.locked.insert(id);
        id
    }

    /// Move a locked id into permanent use.
    pub fn commit(&mut self, id: u64) {
        if !self.locked.remove(&id) {
            warn!(id, "Committing an id that was never locked");
        }
        self.used.insert(id);
    }

    /// Free a used or locked id so it can be reissued.
    pub fn release(&mut self, id: u64) {
        self.used.remove(&id);
        self.locked.remove(&id);
    }

    /// Cancel a lock without committing.
    pub fn unlock(&mut self, id: u64) {
        self.locked.remove(&id);
    }

    /// Lock and immediately commit the lowest free id.
    pub fn issue(&mut self) -> u64 {
        let id = self.acquire();
        self.commit(id);
        id
    }

    pub fn is_available(&self, id: u64) -> bool {
        !self.used.contains(&id) && !self.locked.contains(&id)
    }

    pub fn is_used(&self, id: u64) -> bool {
        self.used.contains(&id)
    }

    pub fn is_locked(&self, id: u64) -> bool {
        self.locked.contains(&id)
    }

    pub fn used_ids(&self) -> &BTreeSet<u64> {
        &self.used
    }

    pub fn locked_ids(&self) -> &BTreeSet<u64> {
        &self.locked
    }
}
