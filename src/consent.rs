//! User paste-consent gating.
//!
//! Untrusted readers get clipboard data only after a human approves. The
//! broker keeps at most one confirmation outstanding; structurally-equal
//! requests arriving while it is pending are coalesced into a queue that is
//! drained exactly once when the prompt resolves.

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::backend::ClipboardSlot;
use crate::context::{Principal, WindowContext};
use crate::error::ClipboardResult;
use crate::snapshot::ClipboardDataSnapshot;

/// Asks the user to approve a paste into the requesting window.
///
/// `Ok(true)` means the user allowed the paste, `Ok(false)` that they denied
/// it; `Err` covers a prompt that could not be shown or was dismissed
/// abnormally.
#[async_trait]
pub trait ConsentPrompter: Send + Sync {
    /// Show the paste confirmation prompt for `window`
    async fn request_paste_confirmation(&self, window: &WindowContext) -> ClipboardResult<bool>;
}

/// Completion channel for one queued snapshot request
pub(crate) type SnapshotResponder = oneshot::Sender<ClipboardResult<ClipboardDataSnapshot>>;

/// One read request waiting on the outstanding confirmation
pub(crate) struct PendingSnapshotRequest {
    pub(crate) flavors: Vec<String>,
    pub(crate) responder: SnapshotResponder,
}

/// The single outstanding confirmation and its queued read requests
pub(crate) struct UserConfirmationRequest {
    slot: ClipboardSlot,
    chrome_document_id: u64,
    principal: Principal,
    window: WindowContext,
    requests: Vec<PendingSnapshotRequest>,
}

impl UserConfirmationRequest {
    pub(crate) fn new(
        slot: ClipboardSlot,
        chrome_document_id: u64,
        principal: Principal,
        window: WindowContext,
    ) -> Self {
        Self {
            slot,
            chrome_document_id,
            principal,
            window,
            requests: Vec::new(),
        }
    }

    /// Whether a new request may share this confirmation. Window identity is
    /// compared only while content inspection is enforced; inspection may
    /// delay individual deliveries, so distinct windows must not ride on one
    /// another's verdicts.
    pub(crate) fn is_equal(
        &self,
        slot: ClipboardSlot,
        chrome_document_id: u64,
        principal: &Principal,
        window: &WindowContext,
        inspection_active: bool,
    ) -> bool {
        if self.slot != slot
            || self.chrome_document_id != chrome_document_id
            || self.principal != *principal
        {
            return false;
        }
        if !inspection_active {
            return true;
        }
        self.window.inner_window_id() == window.inner_window_id()
    }

    pub(crate) fn push(&mut self, flavors: Vec<String>, responder: SnapshotResponder) {
        debug_assert!(!flavors.is_empty());
        self.requests.push(PendingSnapshotRequest { flavors, responder });
    }

    pub(crate) fn into_parts(self) -> (ClipboardSlot, WindowContext, Vec<PendingSnapshotRequest>) {
        (self.slot, self.window, self.requests)
    }
}
