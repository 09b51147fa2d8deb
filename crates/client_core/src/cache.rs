//! Local copy of the gallery layout, tracking whether it reflects server
//! truth or an unconfirmed local edit.

use crate::gallery::PhotoSlots;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing fetched yet.
    Unloaded,
    /// Contents came straight from the server.
    Authoritative,
    /// Contents include local edits the server may not have accepted.
    Optimistic,
}

#[derive(Debug, Clone)]
pub struct GalleryCache {
    slots: PhotoSlots,
    state: CacheState,
    revision: u64,
}

impl Default for GalleryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryCache {
    pub fn new() -> Self {
        Self {
            slots: PhotoSlots::empty(),
            state: CacheState::Unloaded,
            revision: 0,
        }
    }

    pub fn get(&self) -> &PhotoSlots {
        &self.slots
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Incremented on every write, authoritative or not.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_optimistic(&mut self, slots: PhotoSlots) -> u64 {
        self.slots = slots;
        self.state = CacheState::Optimistic;
        self.bump()
    }

    pub fn reconcile<I, S>(&mut self, server_truth: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots = PhotoSlots::from_remote(server_truth);
        self.state = CacheState::Authoritative;
        self.bump()
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}
