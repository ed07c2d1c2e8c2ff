//! Clipboard data snapshots.
//!
//! A snapshot answers "which of the flavors I asked about are available
//! right now" without transferring any bytes. Fetching is deferred and
//! revalidated: the snapshot captures the slot's sequence number at creation
//! and refuses to deliver once the clipboard has moved on. Staleness is
//! detected, never prevented - there is no way to lock an OS clipboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use tracing::debug;

use crate::backend::ClipboardSlot;
use crate::context::WindowContext;
use crate::controller::ClipboardBroker;
use crate::error::{ClipboardError, ClipboardResult};
use crate::transferable::Transferable;
use std::sync::Arc;

/// Where a snapshot's flavor list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Derived from the broker's write cache
    Cache,
    /// Derived from native backend enumeration
    Native,
}

/// Immutable view of the flavors available on a slot at capture time.
///
/// A snapshot holds only flavor metadata plus a non-owning reference back to
/// the broker; payload bytes are fetched lazily via
/// [`get_data`](ClipboardDataSnapshot::get_data). Once a validity check
/// fails the snapshot is permanently invalid and a new one must be derived.
pub struct ClipboardDataSnapshot {
    slot: ClipboardSlot,
    sequence_number: i64,
    flavors: Vec<String>,
    origin: SnapshotOrigin,
    broker: Weak<ClipboardBroker>,
    window: Option<WindowContext>,
    defunct: AtomicBool,
}

impl std::fmt::Debug for ClipboardDataSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardDataSnapshot")
            .field("slot", &self.slot)
            .field("sequence_number", &self.sequence_number)
            .field("flavors", &self.flavors)
            .field("origin", &self.origin)
            .field("defunct", &self.defunct.load(Ordering::Relaxed))
            .finish()
    }
}

impl ClipboardDataSnapshot {
    pub(crate) fn new(
        slot: ClipboardSlot,
        sequence_number: i64,
        flavors: Vec<String>,
        origin: SnapshotOrigin,
        broker: Weak<ClipboardBroker>,
        window: Option<WindowContext>,
    ) -> Self {
        Self {
            slot,
            sequence_number,
            flavors,
            origin,
            broker,
            window,
            defunct: AtomicBool::new(false),
        }
    }

    /// The slot this snapshot was captured from
    pub fn slot(&self) -> ClipboardSlot {
        self.slot
    }

    /// The sequence number captured at creation
    pub fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    /// Where the flavor list came from
    pub fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    /// The available flavors, restricted to those the caller asked about
    pub fn flavor_list(&self) -> &[String] {
        &self.flavors
    }

    /// Returns true while the clipboard still holds the content this
    /// snapshot describes. A failed check is permanent.
    pub fn is_valid(&self) -> bool {
        if self.defunct.load(Ordering::Acquire) {
            return false;
        }
        let Some(broker) = self.broker.upgrade() else {
            self.defunct.store(true, Ordering::Release);
            return false;
        };

        let current = match self.origin {
            SnapshotOrigin::Cache => broker.cache_sequence_if_valid(self.slot),
            SnapshotOrigin::Native => broker.backend_sequence(self.slot).ok(),
        };
        if current != Some(self.sequence_number) {
            self.defunct.store(true, Ordering::Release);
            return false;
        }
        true
    }

    fn check_requested_flavors(&self, requested: &[String]) -> ClipboardResult<()> {
        for flavor in requested {
            if !self.flavors.iter().any(|f| f == flavor) {
                debug!(%flavor, "requested flavor not in snapshot");
                return Err(ClipboardError::Failure(format!(
                    "flavor {flavor} is not part of this snapshot"
                )));
            }
        }
        Ok(())
    }

    /// Fetch data into `dest` asynchronously.
    ///
    /// Rejects up front if any of `dest`'s importable flavors is outside the
    /// snapshot's flavor set. Revalidates after every asynchronous hop; a
    /// snapshot that goes stale mid-fetch fails with
    /// [`ClipboardError::NotAvailable`] rather than delivering data that may
    /// belong to someone else's write. An empty import list succeeds
    /// immediately.
    pub async fn get_data(&self, dest: &Transferable) -> ClipboardResult<()> {
        debug!(slot = %self.slot, "snapshot get_data");
        let requested = dest.importable_flavors();
        if requested.is_empty() {
            return Ok(());
        }
        self.check_requested_flavors(&requested)?;

        if !self.is_valid() {
            return Err(ClipboardError::NotAvailable);
        }
        let broker = self.broker.upgrade().ok_or(ClipboardError::NotAvailable)?;

        if self.origin == SnapshotOrigin::Cache && broker.cache_get_data(dest, self.slot).is_ok() {
            return broker.inspect_async(self.window.as_ref(), dest, self.slot).await;
        }
        // The cache could not satisfy the request (it may have been
        // invalidated concurrently), so fall through to the native backend.

        for flavor in &requested {
            let fetched = broker.backend_get_data_async(flavor, self.slot).await;
            if !self.is_valid() {
                return Err(ClipboardError::NotAvailable);
            }
            if let Ok(Some(data)) = fetched {
                dest.set_data(flavor.clone(), data);
                break;
            }
        }

        // Exhausting every flavor without a hit is not an error; inspection
        // still runs on whatever was gathered.
        broker.inspect_async(self.window.as_ref(), dest, self.slot).await
    }

    /// Synchronous variant of [`get_data`](ClipboardDataSnapshot::get_data)
    pub fn get_data_sync(&self, dest: &Transferable) -> ClipboardResult<()> {
        debug!(slot = %self.slot, "snapshot get_data_sync");
        let requested = dest.importable_flavors();
        if requested.is_empty() {
            return Ok(());
        }
        self.check_requested_flavors(&requested)?;

        if !self.is_valid() {
            return Err(ClipboardError::NotAvailable);
        }
        let broker = self.broker.upgrade().ok_or(ClipboardError::NotAvailable)?;

        if self.origin == SnapshotOrigin::Cache && broker.cache_get_data(dest, self.slot).is_ok() {
            return broker.inspect_sync_or_block(self.window.as_ref(), dest, self.slot);
        }

        for flavor in &requested {
            if let Ok(Some(data)) = broker.backend_get_data(flavor, self.slot) {
                dest.set_data(flavor.clone(), data);
                break;
            }
        }

        broker.inspect_sync_or_block(self.window.as_ref(), dest, self.slot)
    }
}

/// A snapshot over an already-populated transferable.
///
/// Used when the data is in hand before the snapshot is handed out (e.g.
/// data delivered by another process). It owns its bytes, so it is always
/// valid and needs no broker back-reference.
#[derive(Debug)]
pub struct PopulatedDataSnapshot {
    transferable: Arc<Transferable>,
    flavors: Vec<String>,
}

impl PopulatedDataSnapshot {
    /// Wrap a populated transferable
    pub fn new(transferable: Arc<Transferable>) -> Self {
        let flavors = transferable.exportable_flavors();
        Self { transferable, flavors }
    }

    /// Always true; the snapshot owns its data
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Flavors carried by the wrapped transferable
    pub fn flavor_list(&self) -> &[String] {
        &self.flavors
    }

    /// Copy data for the *first* of `dest`'s importable flavors only.
    ///
    /// All requested flavors must be present in the snapshot; beyond that,
    /// only the first is filled in, matching what one native read delivers.
    pub fn get_data_sync(&self, dest: &Transferable) -> ClipboardResult<()> {
        let requested = dest.importable_flavors();
        for flavor in &requested {
            if !self.flavors.iter().any(|f| f == flavor) {
                return Err(ClipboardError::Failure(format!(
                    "flavor {flavor} is not part of this snapshot"
                )));
            }
        }

        if let Some(first) = requested.first() {
            match self.transferable.data(first) {
                Some(data) => dest.set_data(first.clone(), data),
                None => {
                    dest.clear_all_data();
                    return Err(ClipboardError::Failure(format!(
                        "flavor {first} has no backing data"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Async variant; completes on a later tick of the runtime
    pub async fn get_data(&self, dest: &Transferable) -> ClipboardResult<()> {
        tokio::task::yield_now().await;
        self.get_data_sync(dest)
    }
}
