//! Stateful side of the profile photo gallery.
//!
//! Local edits are applied to the cache before any request is issued and
//! are never rolled back when the server rejects them; the next
//! [`GalleryOrderingController::hydrate`] replaces the cache with server
//! truth.

use std::sync::Arc;

use chrono::Utc;
use shared::{domain::GALLERY_SLOTS, protocol::ReorderRequest};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    cache::{CacheState, GalleryCache},
    error::ClientError,
    gallery::{
        apply_delete, apply_reorder, apply_upload, permutation_from_indexes, PhotoSlot, PhotoSlots,
        SlotIndex,
    },
    GalleryBackend, MediaSource, PermissionStatus, PhotoUpload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Must be acknowledged before the user can continue.
    Blocking,
    NonBlocking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryOperation {
    Permission,
    Hydrate,
    Upload,
    Delete,
    ReorderSync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryAlert {
    pub kind: AlertKind,
    pub operation: GalleryOperation,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum GalleryEvent {
    SlotsChanged(PhotoSlots),
    UploadStarted { index: usize },
    UploadFinished { index: usize },
    Alert(GalleryAlert),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(String),
    /// The picker was dismissed without choosing a photo.
    Cancelled,
}

struct ControllerState {
    cache: GalleryCache,
    uploading: [bool; GALLERY_SLOTS],
}

pub struct GalleryOrderingController {
    backend: Arc<dyn GalleryBackend>,
    media: Arc<dyn MediaSource>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryOrderingController {
    pub fn new(backend: Arc<dyn GalleryBackend>, media: Arc<dyn MediaSource>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            media,
            inner: Mutex::new(ControllerState {
                cache: GalleryCache::new(),
                uploading: [false; GALLERY_SLOTS],
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    pub async fn slots(&self) -> PhotoSlots {
        self.inner.lock().await.cache.get().clone()
    }

    pub async fn cache_state(&self) -> CacheState {
        self.inner.lock().await.cache.state()
    }

    /// Occupied photos in display order, as shown by the read-only carousel.
    pub async fn visible_photos(&self) -> Vec<String> {
        self.inner.lock().await.cache.get().occupied_urls()
    }

    pub async fn is_uploading(&self, index: usize) -> bool {
        let guard = self.inner.lock().await;
        guard.uploading.get(index).copied().unwrap_or(false)
    }

    /// Replaces the local layout with the server's picture list.
    pub async fn hydrate(&self) -> Result<PhotoSlots, ClientError> {
        let urls = match self.backend.fetch_profile_pictures().await {
            Ok(urls) => urls,
            Err(err) => {
                warn!("gallery: hydrate failed: {err}");
                self.alert(
                    AlertKind::NonBlocking,
                    GalleryOperation::Hydrate,
                    "Could not load profile pictures.",
                );
                return Err(err);
            }
        };
        let slots = {
            let mut guard = self.inner.lock().await;
            guard.cache.reconcile(urls);
            guard.cache.get().clone()
        };
        info!("gallery: hydrated count={}", slots.occupied_count());
        self.publish(slots.clone());
        Ok(slots)
    }

    /// Asks for library access, lets the user pick a photo and uploads it
    /// into the empty slot `index`. Other slots may upload at the same time.
    /// Occupied slots are rejected; replacing a photo means removing it first.
    pub async fn pick_and_upload(&self, index: usize) -> Result<UploadOutcome, ClientError> {
        let slot = SlotIndex::new(index)?;
        {
            let guard = self.inner.lock().await;
            if guard.uploading[index] {
                return Err(ClientError::SlotBusy(index));
            }
            if guard.cache.get().get(slot).is_occupied() {
                return Err(ClientError::SlotOccupied(index));
            }
        }

        if self.media.request_permission().await == PermissionStatus::Denied {
            warn!("gallery: media library permission denied slot={index}");
            self.alert(
                AlertKind::Blocking,
                GalleryOperation::Permission,
                "You must allow access to the photo library.",
            );
            return Err(ClientError::PermissionDenied);
        }

        let Some(bytes) = self.media.pick_image().await? else {
            return Ok(UploadOutcome::Cancelled);
        };

        {
            let mut guard = self.inner.lock().await;
            if guard.cache.get().get(slot).is_occupied() {
                return Err(ClientError::SlotOccupied(index));
            }
            if std::mem::replace(&mut guard.uploading[index], true) {
                return Err(ClientError::SlotBusy(index));
            }
        }
        let _ = self.events.send(GalleryEvent::UploadStarted { index });

        let upload = PhotoUpload {
            filename: upload_filename(index, Utc::now().timestamp_millis()),
            bytes,
        };
        let result = self.backend.upload_profile_picture(upload).await;

        let applied = {
            let mut guard = self.inner.lock().await;
            guard.uploading[index] = false;
            result.map(|url| {
                let current = guard.cache.get().clone();
                let next = match landing_slot(&current, slot) {
                    Some(target) => apply_upload(&current, target, url.clone()),
                    None => {
                        warn!("gallery: no free slot for finished upload slot={index}");
                        current
                    }
                };
                guard.cache.set_optimistic(next.clone());
                (url, next)
            })
        };
        let _ = self.events.send(GalleryEvent::UploadFinished { index });

        match applied {
            Ok((url, slots)) => {
                self.publish(slots);
                Ok(UploadOutcome::Uploaded(url))
            }
            Err(err) => {
                warn!("gallery: upload failed slot={index}: {err}");
                self.alert(
                    AlertKind::NonBlocking,
                    GalleryOperation::Upload,
                    "Image upload failed.",
                );
                Err(err)
            }
        }
    }

    /// Clears the photo at `index` locally, then asks the server to delete
    /// it. Returns `false` when the slot was already empty.
    pub async fn remove(&self, index: usize) -> Result<bool, ClientError> {
        let slot = SlotIndex::new(index)?;
        let (url, slots) = {
            let mut guard = self.inner.lock().await;
            if guard.uploading[index] {
                return Err(ClientError::SlotBusy(index));
            }
            let Some(url) = guard.cache.get().get(slot).url().map(str::to_string) else {
                return Ok(false);
            };
            let next = apply_delete(guard.cache.get(), &url);
            guard.cache.set_optimistic(next.clone());
            (url, next)
        };
        self.publish(slots);

        if let Err(err) = self.backend.remove_profile_picture(&url).await {
            warn!("gallery: remote delete failed slot={index}: {err}");
            self.alert(
                AlertKind::NonBlocking,
                GalleryOperation::Delete,
                "Image removal failed.",
            );
            return Err(err);
        }
        info!("gallery: removed slot={index}");
        Ok(true)
    }

    /// Handles a completed drag. The new order is visible immediately; the
    /// returned task pushes it to the server and raises an alert if that
    /// fails.
    pub async fn reorder(
        &self,
        permutation: Vec<PhotoSlot>,
    ) -> JoinHandle<Result<(), ClientError>> {
        let (slots, request) = {
            let mut guard = self.inner.lock().await;
            commit_reorder(&mut guard, &permutation)
        };
        self.publish(slots);
        self.spawn_order_sync(request)
    }

    /// Reorders by current slot positions; see
    /// [`permutation_from_indexes`]. The permutation is built and applied
    /// under one lock so a concurrently finished upload is never dropped.
    pub async fn reorder_by_indexes(
        &self,
        order: &[usize],
    ) -> Result<JoinHandle<Result<(), ClientError>>, ClientError> {
        let (slots, request) = {
            let mut guard = self.inner.lock().await;
            let permutation = permutation_from_indexes(guard.cache.get(), order)?;
            commit_reorder(&mut guard, &permutation)
        };
        self.publish(slots);
        Ok(self.spawn_order_sync(request))
    }

    fn spawn_order_sync(&self, request: ReorderRequest) -> JoinHandle<Result<(), ClientError>> {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let count = request.profile_pictures.len();
            match backend.update_profile_pictures_order(&request).await {
                Ok(()) => {
                    info!("gallery: order synced count={count}");
                    Ok(())
                }
                Err(err) => {
                    warn!("gallery: reorder sync failed count={count}: {err}");
                    let _ = events.send(GalleryEvent::Alert(GalleryAlert {
                        kind: AlertKind::NonBlocking,
                        operation: GalleryOperation::ReorderSync,
                        message: "Could not sync photo order with the server.".into(),
                    }));
                    Err(err)
                }
            }
        })
    }

    fn publish(&self, slots: PhotoSlots) {
        let _ = self.events.send(GalleryEvent::SlotsChanged(slots));
    }

    fn alert(&self, kind: AlertKind, operation: GalleryOperation, message: &str) {
        let _ = self.events.send(GalleryEvent::Alert(GalleryAlert {
            kind,
            operation,
            message: message.to_string(),
        }));
    }
}

fn commit_reorder(
    state: &mut ControllerState,
    permutation: &[PhotoSlot],
) -> (PhotoSlots, ReorderRequest) {
    let (slots, request) = apply_reorder(permutation);
    state.cache.set_optimistic(slots.clone());
    (slots, request)
}

/// Where a finished upload goes: the slot it was started for, or the first
/// free slot if that one was filled while the upload was in flight.
fn landing_slot(slots: &PhotoSlots, requested: SlotIndex) -> Option<SlotIndex> {
    if !slots.get(requested).is_occupied() {
        return Some(requested);
    }
    slots
        .as_slice()
        .iter()
        .position(|slot| !slot.is_occupied())
        .and_then(|index| SlotIndex::new(index).ok())
}

fn upload_filename(index: usize, millis: i64) -> String {
    format!("photo_{index}_{millis}.jpg")
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
