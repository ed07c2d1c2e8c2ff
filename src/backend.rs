//! NativeClipboardBackend trait - abstract platform clipboard interface.
//!
//! The broker never touches an OS clipboard directly; it drives one of these.
//! The trait mirrors the primitives every platform clipboard offers: set,
//! get-per-flavor, a change/sequence number, flavor matching, and empty.
//! Async variants default to their synchronous counterparts so a purely
//! synchronous backend only implements the five required methods.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ClipboardResult;
use crate::transferable::Transferable;

/// One of the independent clipboard namespaces a platform may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipboardSlot {
    /// The general copy/paste clipboard - always supported
    Global,
    /// The primary selection (X11/Wayland middle-click paste)
    Selection,
    /// The find-pasteboard (macOS search field sharing)
    Find,
    /// Cache of the last selection, for platforms that emulate one
    SelectionCache,
}

impl ClipboardSlot {
    /// All slots, in a stable order usable for per-slot tables
    pub const ALL: [ClipboardSlot; 4] = [
        ClipboardSlot::Global,
        ClipboardSlot::Selection,
        ClipboardSlot::Find,
        ClipboardSlot::SelectionCache,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            ClipboardSlot::Global => 0,
            ClipboardSlot::Selection => 1,
            ClipboardSlot::Find => 2,
            ClipboardSlot::SelectionCache => 3,
        }
    }
}

impl std::fmt::Display for ClipboardSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClipboardSlot::Global => "global",
            ClipboardSlot::Selection => "selection",
            ClipboardSlot::Find => "find",
            ClipboardSlot::SelectionCache => "selection-cache",
        };
        f.write_str(name)
    }
}

/// Which optional clipboard slots exist in this process.
///
/// [`ClipboardSlot::Global`] is always available and has no flag here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardCapabilities {
    /// Platform has a primary-selection clipboard
    pub supports_selection: bool,
    /// Platform has a find clipboard
    pub supports_find: bool,
    /// Platform keeps a selection cache
    pub supports_selection_cache: bool,
}

impl ClipboardCapabilities {
    /// Capabilities with every optional slot enabled
    pub fn all() -> Self {
        Self {
            supports_selection: true,
            supports_find: true,
            supports_selection_cache: true,
        }
    }
}

/// Platform clipboard primitives consumed by the broker.
///
/// Implementations report failures as
/// [`ClipboardError::Backend`](crate::error::ClipboardError::Backend); the
/// broker surfaces them to callers verbatim.
///
/// The sequence number is the platform's change counter: any value that
/// changes whenever the clipboard content changes, including changes made by
/// other processes. It is the only staleness-detection mechanism the broker
/// has, so a backend that cannot observe external changes must at least bump
/// the number on its own writes.
#[async_trait]
pub trait NativeClipboardBackend: Send + Sync {
    /// Write the transferable's exportable flavors to the given slot
    fn set_data(&self, transferable: &Transferable, slot: ClipboardSlot) -> ClipboardResult<()>;

    /// Read the payload for one flavor; `Ok(None)` means the flavor is not
    /// present (distinct from a backend failure)
    fn get_data(&self, flavor: &str, slot: ClipboardSlot) -> ClipboardResult<Option<Bytes>>;

    /// Async read of one flavor's payload. Defaults to the sync read.
    async fn get_data_async(&self, flavor: &str, slot: ClipboardSlot) -> ClipboardResult<Option<Bytes>> {
        self.get_data(flavor, slot)
    }

    /// Current change/sequence number for the slot
    fn sequence_number(&self, slot: ClipboardSlot) -> ClipboardResult<i64>;

    /// Returns true if any of the given flavors is present on the slot
    fn has_matching_flavors(&self, flavors: &[String], slot: ClipboardSlot) -> ClipboardResult<bool>;

    /// The subset of `flavors` present on the slot, preserving the caller's
    /// order. Defaults to one sync membership probe per flavor.
    async fn matching_flavors(&self, flavors: &[String], slot: ClipboardSlot) -> ClipboardResult<Vec<String>> {
        let mut matched = Vec::new();
        for flavor in flavors {
            if self.has_matching_flavors(std::slice::from_ref(flavor), slot)? {
                matched.push(flavor.clone());
            }
        }
        Ok(matched)
    }

    /// Discard the slot's current content
    fn empty(&self, slot: ClipboardSlot) -> ClipboardResult<()>;
}
