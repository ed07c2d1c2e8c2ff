//! Transferable - the unit of clipboard exchange.
//!
//! A [`Transferable`] is an insertion-ordered bag of named flavors. A reader
//! declares the flavors it is willing to import; a writer attaches payload
//! bytes to the flavors it exports. The same type serves both roles, which is
//! what lets the cache copy data between a writer's transferable and a
//! reader's with a single flavor-intersection pass.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::context::Principal;

/// Flavor used when the platform stores an image in its native
/// representation rather than a concrete `image/*` encoding. A cache entry
/// carrying this flavor satisfies any requested image flavor.
pub const NATIVE_IMAGE_MIME: &str = "application/x-native-image";

/// Returns true for flavors naming an image representation
pub fn is_image_flavor(flavor: &str) -> bool {
    flavor.starts_with("image/")
}

#[derive(Debug, Clone)]
struct FlavorEntry {
    flavor: String,
    data: Option<Bytes>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<FlavorEntry>,
    data_principal: Option<Principal>,
}

/// An ordered mapping from flavor name to optional payload.
///
/// Shared as `Arc<Transferable>`; all methods take `&self` and are safe to
/// call concurrently, though the broker sequences every mutation on its
/// logical owner thread.
#[derive(Debug, Default)]
pub struct Transferable {
    inner: Mutex<Inner>,
}

impl Transferable {
    /// Create an empty transferable
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty transferable behind an `Arc`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Record the principal that produced this transferable's data.
    ///
    /// Used by the broker to skip the paste prompt when the requester is
    /// same-origin with cached data.
    pub fn set_data_principal(&self, principal: Option<Principal>) {
        self.inner.lock().data_principal = principal;
    }

    /// The principal that produced this transferable's data, if known
    pub fn data_principal(&self) -> Option<Principal> {
        self.inner.lock().data_principal.clone()
    }

    /// Declare a flavor this transferable is willing to import.
    ///
    /// Order matters: readers are served the first declared flavor that has
    /// backing data. Re-declaring an existing flavor is a no-op.
    pub fn add_import_flavor(&self, flavor: impl Into<String>) {
        let flavor = flavor.into();
        let mut inner = self.inner.lock();
        if inner.entries.iter().any(|e| e.flavor == flavor) {
            return;
        }
        inner.entries.push(FlavorEntry { flavor, data: None });
    }

    /// Attach payload bytes for a flavor, declaring it if needed
    pub fn set_data(&self, flavor: impl Into<String>, data: Bytes) {
        let flavor = flavor.into();
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.iter_mut().find(|e| e.flavor == flavor) {
            entry.data = Some(data);
            return;
        }
        inner.entries.push(FlavorEntry {
            flavor,
            data: Some(data),
        });
    }

    /// Payload bytes for a flavor, if present
    pub fn data(&self, flavor: &str) -> Option<Bytes> {
        self.inner
            .lock()
            .entries
            .iter()
            .find(|e| e.flavor == flavor)
            .and_then(|e| e.data.clone())
    }

    /// All declared flavors, in insertion order (what a reader accepts)
    pub fn importable_flavors(&self) -> Vec<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|e| e.flavor.clone())
            .collect()
    }

    /// Flavors that actually carry data, in insertion order (what a writer
    /// has to offer)
    pub fn exportable_flavors(&self) -> Vec<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.data.is_some())
            .map(|e| e.flavor.clone())
            .collect()
    }

    /// Returns true if any flavor carries data
    pub fn has_data(&self) -> bool {
        self.inner.lock().entries.iter().any(|e| e.data.is_some())
    }

    /// Drop all payloads, keeping the declared flavor list.
    ///
    /// Called on the reader's transferable after a security rejection so a
    /// caller never observes partially-delivered clipboard content.
    pub fn clear_all_data(&self) {
        for entry in self.inner.lock().entries.iter_mut() {
            entry.data = None;
        }
    }
}

/// Hook notified when cached clipboard data stops being the clipboard's
/// current content.
///
/// Implementations must not call back into the broker from the
/// notification; it may be delivered while broker state is locked.
pub trait ClipboardOwner: Send + Sync {
    /// The given transferable (if any was cached) is no longer on the
    /// clipboard
    fn losing_ownership(&self, transferable: Option<&Transferable>);
}
