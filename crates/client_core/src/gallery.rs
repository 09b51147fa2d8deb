//! Nine-slot profile photo gallery.
//!
//! Every function here is pure: it takes the current layout and returns a
//! new one. After any operation the occupied slots sit contiguously at the
//! front in their previous relative order and empty slots trail.

use serde::{Deserialize, Serialize};
use shared::{domain::GALLERY_SLOTS, protocol::ReorderRequest};

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PhotoSlot {
    Occupied(String),
    #[default]
    Empty,
}

impl PhotoSlot {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Occupied(url) => Some(url),
            Self::Empty => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(_))
    }
}

impl From<Option<String>> for PhotoSlot {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Empty, Self::Occupied)
    }
}

/// Position in the gallery grid, checked against [`GALLERY_SLOTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub fn new(index: usize) -> Result<Self, ClientError> {
        if index < GALLERY_SLOTS {
            Ok(Self(index))
        } else {
            Err(ClientError::SlotOutOfRange(index))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSlots([PhotoSlot; GALLERY_SLOTS]);

impl Default for PhotoSlots {
    fn default() -> Self {
        Self::empty()
    }
}

impl PhotoSlots {
    pub fn empty() -> Self {
        Self(std::array::from_fn(|_| PhotoSlot::Empty))
    }

    /// Lays out the server's picture list. URLs past the ninth are dropped.
    pub fn from_remote<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots: Vec<PhotoSlot> = urls
            .into_iter()
            .take(GALLERY_SLOTS)
            .map(|url| PhotoSlot::Occupied(url.into()))
            .collect();
        normalize(&slots)
    }

    pub fn as_slice(&self) -> &[PhotoSlot] {
        &self.0
    }

    pub fn get(&self, index: SlotIndex) -> &PhotoSlot {
        &self.0[index.0]
    }

    pub fn occupied_urls(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(PhotoSlot::url)
            .map(str::to_string)
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_occupied()).count()
    }

    pub fn is_normalized(&self) -> bool {
        let filled = self.occupied_count();
        self.0[..filled].iter().all(PhotoSlot::is_occupied)
    }

    pub fn to_vec(&self) -> Vec<PhotoSlot> {
        self.0.to_vec()
    }
}

/// Compacts occupied slots to the front, keeping their order, and pads with
/// empty slots. Input beyond the ninth entry is ignored.
pub fn normalize(slots: &[PhotoSlot]) -> PhotoSlots {
    let mut out = PhotoSlots::empty();
    let occupied = slots.iter().take(GALLERY_SLOTS).filter_map(PhotoSlot::url);
    for (dst, url) in out.0.iter_mut().zip(occupied) {
        *dst = PhotoSlot::Occupied(url.to_string());
    }
    out
}

/// Places a freshly uploaded photo at `index`, then normalizes. An upload
/// into an occupied slot replaces that photo.
pub fn apply_upload(slots: &PhotoSlots, index: SlotIndex, url: impl Into<String>) -> PhotoSlots {
    let mut next = slots.0.clone();
    next[index.0] = PhotoSlot::Occupied(url.into());
    normalize(&next)
}

/// Clears every slot holding `url`, then normalizes.
pub fn apply_delete(slots: &PhotoSlots, url: &str) -> PhotoSlots {
    let next: Vec<PhotoSlot> = slots
        .0
        .iter()
        .map(|slot| match slot.url() {
            Some(existing) if existing == url => PhotoSlot::Empty,
            _ => slot.clone(),
        })
        .collect();
    normalize(&next)
}

/// Adopts the order produced by a drag gesture. Unlike the other `apply_*`
/// functions this takes no current layout: a drag result already holds
/// every slot, so the previous layout is ignored and replaced wholesale.
/// The returned request carries the occupied URLs of the normalized result.
pub fn apply_reorder(new_order: &[PhotoSlot]) -> (PhotoSlots, ReorderRequest) {
    let slots = normalize(new_order);
    let request = ReorderRequest {
        profile_pictures: slots.occupied_urls(),
    };
    (slots, request)
}

/// Builds the drag result from a list of current slot positions, e.g.
/// `[2, 0, 1]` moves the third photo to the front. Positions not listed
/// keep their relative order after the listed ones.
pub fn permutation_from_indexes(
    slots: &PhotoSlots,
    order: &[usize],
) -> Result<Vec<PhotoSlot>, ClientError> {
    let mut seen = [false; GALLERY_SLOTS];
    let mut permutation = Vec::with_capacity(GALLERY_SLOTS);
    for &index in order {
        let slot = SlotIndex::new(index)?;
        if std::mem::replace(&mut seen[slot.0], true) {
            return Err(ClientError::validation(format!(
                "slot {index} listed more than once"
            )));
        }
        permutation.push(slots.get(slot).clone());
    }
    for (index, slot) in slots.0.iter().enumerate() {
        if !seen[index] {
            permutation.push(slot.clone());
        }
    }
    Ok(permutation)
}

#[cfg(test)]
#[path = "tests/gallery_tests.rs"]
mod tests;
