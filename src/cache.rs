//! Per-slot cache of the last transferable this process wrote.
//!
//! The cache lets reads be served without a round trip to the native
//! clipboard, as long as the native sequence number still matches the one
//! captured at write time. Validity checking lives in the broker; this type
//! only stores and copies.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ClipboardError, ClipboardResult};
use crate::transferable::{ClipboardOwner, Transferable};

/// Sequence number of an empty cache entry
pub(crate) const NO_SEQUENCE: i64 = -1;

/// Cache entry for one clipboard slot.
///
/// Invariant: `sequence_number() == -1` exactly when no transferable is
/// stored.
pub struct ClipboardCache {
    transferable: Option<Arc<Transferable>>,
    owner: Option<Arc<dyn ClipboardOwner>>,
    sequence_number: i64,
    inner_window_id: Option<u64>,
}

impl Default for ClipboardCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClipboardCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardCache")
            .field("has_transferable", &self.transferable.is_some())
            .field("has_owner", &self.owner.is_some())
            .field("sequence_number", &self.sequence_number)
            .field("inner_window_id", &self.inner_window_id)
            .finish()
    }
}

impl ClipboardCache {
    /// Create an empty cache entry
    pub fn new() -> Self {
        Self {
            transferable: None,
            owner: None,
            sequence_number: NO_SEQUENCE,
            inner_window_id: None,
        }
    }

    /// Replace the cached entry, first notifying any previous owner that it
    /// lost ownership
    pub fn update(
        &mut self,
        transferable: Arc<Transferable>,
        owner: Option<Arc<dyn ClipboardOwner>>,
        sequence_number: i64,
        inner_window_id: Option<u64>,
    ) {
        self.clear();
        self.transferable = Some(transferable);
        self.owner = owner;
        self.sequence_number = sequence_number;
        self.inner_window_id = inner_window_id;
    }

    /// Reset to the empty state, notifying the owner hook once. Idempotent.
    pub fn clear(&mut self) {
        if let Some(owner) = self.owner.take() {
            owner.losing_ownership(self.transferable.as_deref());
        }
        self.transferable = None;
        self.sequence_number = NO_SEQUENCE;
        self.inner_window_id = None;
    }

    /// The cached transferable, if any
    pub fn transferable(&self) -> Option<&Arc<Transferable>> {
        self.transferable.as_ref()
    }

    /// The registered owner hook, if any
    pub fn owner(&self) -> Option<&Arc<dyn ClipboardOwner>> {
        self.owner.as_ref()
    }

    /// Native sequence number captured when the entry was stored, or -1
    pub fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    /// Inner window id of the writing document, if one was recorded
    pub fn inner_window_id(&self) -> Option<u64> {
        self.inner_window_id
    }

    /// Copy cached data into `dest`, trying `dest`'s importable flavors in
    /// their declared order and stopping at the first one the cached
    /// transferable can satisfy.
    ///
    /// Fails without copying anything when no overlapping flavor has backing
    /// data. Only one flavor is ever filled in, mirroring what a native read
    /// delivers.
    pub fn get_data(&self, dest: &Transferable) -> ClipboardResult<()> {
        let cached = self
            .transferable
            .as_ref()
            .ok_or_else(|| ClipboardError::Failure("clipboard cache is empty".into()))?;

        for flavor in dest.importable_flavors() {
            if let Some(data) = cached.data(&flavor) {
                debug!(%flavor, "serving flavor from clipboard cache");
                dest.set_data(flavor, data);
                return Ok(());
            }
        }

        Err(ClipboardError::Failure(
            "no requested flavor present in clipboard cache".into(),
        ))
    }
}
