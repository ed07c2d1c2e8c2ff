//! # clipboard-broker
//!
//! Access-controlled, cache-aware clipboard brokering for Rust.
//!
//! This crate mediates between callers of differing trust levels and a native
//! clipboard backend:
//!
//! - **[`ClipboardBroker`]** - The read/write surface: caching, consent
//!   gating, content inspection
//! - **[`NativeClipboardBackend`] trait** - Abstract platform clipboard
//!   interface (the crate ships [`MemoryClipboard`] as an in-process one)
//! - **[`ClipboardDataSnapshot`]** - Deferred, validity-checked reads tied to
//!   the clipboard's sequence number
//! - **[`AsyncWriteRequest`]** - Single-shot pending write handles, at most
//!   one live per slot
//! - **[`ConsentPrompter`] / [`ContentInspector`] traits** - Pluggable user
//!   consent and data-loss-prevention seams
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use clipboard_broker::{ClipboardBroker, ClipboardCapabilities, ClipboardSlot, MemoryClipboard, Transferable};
//!
//! # fn main() -> clipboard_broker::ClipboardResult<()> {
//! let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());
//!
//! // Write
//! let data = Transferable::shared();
//! data.set_data("text/plain", Bytes::from_static(b"hello"));
//! broker.set_data(data, None, ClipboardSlot::Global, None)?;
//!
//! // Read
//! let dest = Transferable::new();
//! dest.add_import_flavor("text/plain");
//! broker.get_data(&dest, ClipboardSlot::Global, None)?;
//! assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"hello")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The broker keeps a per-slot cache of the last transferable written by
//! this process, tagged with the native clipboard's sequence number. Reads
//! are served from the cache while the sequence number still matches;
//! otherwise they fall through to the backend. Untrusted snapshot reads pass
//! a user-consent gate first, and every delivery can be vetoed by a
//! [`ContentInspector`]. Staleness is detected rather than prevented: an OS
//! clipboard cannot be locked, so snapshots revalidate and fail instead of
//! delivering another writer's data.

#![deny(missing_docs)]

mod cache;
mod consent;
mod controller;
mod write;

pub mod backend;
pub mod context;
pub mod error;
pub mod inspect;
pub mod memory;
pub mod snapshot;
pub mod transferable;

pub use backend::{ClipboardCapabilities, ClipboardSlot, NativeClipboardBackend};
pub use consent::ConsentPrompter;
pub use context::{ChromeDocument, Principal, PrincipalKind, WindowContext};
pub use controller::{BrokerConfig, ClipboardBroker, ClipboardBrokerBuilder};
pub use error::{ClipboardError, ClipboardResult};
pub use inspect::{ContentInspector, InspectionVerdict};
pub use memory::MemoryClipboard;
pub use snapshot::{ClipboardDataSnapshot, PopulatedDataSnapshot, SnapshotOrigin};
pub use transferable::{is_image_flavor, ClipboardOwner, Transferable, NATIVE_IMAGE_MIME};
pub use write::{AsyncWriteRequest, WriteCompleteCallback};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClipboardBroker, ClipboardCapabilities, ClipboardError, ClipboardResult, ClipboardSlot,
        NativeClipboardBackend, Principal, Transferable, WindowContext,
    };
}
