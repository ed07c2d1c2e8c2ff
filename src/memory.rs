//! In-process clipboard backend.
//!
//! [`MemoryClipboard`] implements [`NativeClipboardBackend`] over plain
//! per-slot stores with monotonic sequence numbers. It backs the integration
//! tests and serves as a reference for the trait's contract; headless
//! deployments can use it as a real (process-local) clipboard.

use bytes::Bytes;
use parking_lot::Mutex;

use crate::backend::{ClipboardSlot, NativeClipboardBackend};
use crate::error::ClipboardResult;
use crate::transferable::Transferable;

#[derive(Debug, Default)]
struct SlotStore {
    items: Vec<(String, Bytes)>,
    sequence: i64,
}

/// A process-local clipboard with independent stores for all four slots.
///
/// Every mutation bumps the slot's sequence number, so staleness detection
/// behaves exactly as it does against a platform clipboard. The
/// [`write_external`](MemoryClipboard::write_external) hook simulates
/// another process claiming the clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    slots: [Mutex<SlotStore>; 4],
}

impl MemoryClipboard {
    /// Create an empty in-process clipboard
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, slot: ClipboardSlot) -> &Mutex<SlotStore> {
        &self.slots[slot.index()]
    }

    /// Replace a slot's content as an external agent would: the stored
    /// flavors change and the sequence number advances, but no cache or
    /// owner inside any broker is told about it.
    pub fn write_external(&self, slot: ClipboardSlot, flavor: impl Into<String>, data: Bytes) {
        let mut store = self.store(slot).lock();
        store.items = vec![(flavor.into(), data)];
        store.sequence += 1;
    }
}

#[async_trait::async_trait]
impl NativeClipboardBackend for MemoryClipboard {
    fn set_data(&self, transferable: &Transferable, slot: ClipboardSlot) -> ClipboardResult<()> {
        let items: Vec<(String, Bytes)> = transferable
            .exportable_flavors()
            .into_iter()
            .filter_map(|flavor| transferable.data(&flavor).map(|data| (flavor, data)))
            .collect();

        let mut store = self.store(slot).lock();
        store.items = items;
        store.sequence += 1;
        Ok(())
    }

    fn get_data(&self, flavor: &str, slot: ClipboardSlot) -> ClipboardResult<Option<Bytes>> {
        let store = self.store(slot).lock();
        Ok(store
            .items
            .iter()
            .find(|(f, _)| f == flavor)
            .map(|(_, data)| data.clone()))
    }

    fn sequence_number(&self, slot: ClipboardSlot) -> ClipboardResult<i64> {
        Ok(self.store(slot).lock().sequence)
    }

    fn has_matching_flavors(&self, flavors: &[String], slot: ClipboardSlot) -> ClipboardResult<bool> {
        let store = self.store(slot).lock();
        Ok(store.items.iter().any(|(f, _)| flavors.iter().any(|q| q == f)))
    }

    fn empty(&self, slot: ClipboardSlot) -> ClipboardResult<()> {
        let mut store = self.store(slot).lock();
        store.items.clear();
        store.sequence += 1;
        Ok(())
    }
}
