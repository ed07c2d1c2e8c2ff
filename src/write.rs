//! Pending asynchronous write requests.
//!
//! [`AsyncWriteRequest`] is the single-shot handle returned by
//! [`ClipboardBroker::async_set_data`](crate::ClipboardBroker::async_set_data).
//! At most one handle per slot is live; issuing a new one aborts the
//! previous handle before the new one is installed, and an aborted handle is
//! permanently inert. The registered callback fires exactly once, on
//! completion or abort, whichever comes first.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::backend::ClipboardSlot;
use crate::context::WindowContext;
use crate::controller::ClipboardBroker;
use crate::error::{ClipboardError, ClipboardResult};
use crate::transferable::{ClipboardOwner, Transferable};

/// Completion callback for an asynchronous write
pub type WriteCompleteCallback = Box<dyn FnOnce(ClipboardResult<()>) + Send>;

/// Handle for one in-flight asynchronous clipboard write
pub struct AsyncWriteRequest {
    slot: ClipboardSlot,
    window: Option<WindowContext>,
    broker: Weak<ClipboardBroker>,
    callback: Mutex<Option<WriteCompleteCallback>>,
}

impl std::fmt::Debug for AsyncWriteRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWriteRequest")
            .field("slot", &self.slot)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl AsyncWriteRequest {
    pub(crate) fn new(
        slot: ClipboardSlot,
        window: Option<WindowContext>,
        broker: Weak<ClipboardBroker>,
        callback: WriteCompleteCallback,
    ) -> Self {
        Self {
            slot,
            window,
            broker,
            callback: Mutex::new(Some(callback)),
        }
    }

    /// The slot this request writes to
    pub fn slot(&self) -> ClipboardSlot {
        self.slot
    }

    /// Returns true while the callback has not yet fired. Superseded,
    /// aborted, and completed handles are invalid.
    pub fn is_valid(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Perform the deferred write.
    ///
    /// Fails without touching the clipboard when this handle has been
    /// superseded or already used. On the live handle it runs the full
    /// synchronous write path and then notifies the callback with the
    /// result.
    pub fn set_data(
        &self,
        transferable: Arc<Transferable>,
        owner: Option<Arc<dyn ClipboardOwner>>,
    ) -> ClipboardResult<()> {
        debug!(slot = %self.slot, "async write request: set_data");

        if !self.is_valid() {
            return Err(ClipboardError::Failure("write request is no longer valid".into()));
        }

        let broker = self
            .broker
            .upgrade()
            .ok_or_else(|| ClipboardError::Failure("clipboard broker is gone".into()))?;

        // Remove ourselves from the pending table first so the write path's
        // own supersede step cannot abort this very request.
        if !broker.take_pending_write_if_current(self.slot, self) {
            return Err(ClipboardError::Failure("write request was superseded".into()));
        }

        let result = broker.set_data(transferable, owner, self.slot, self.window.as_ref());
        self.notify(result.clone());
        result
    }

    /// Abort the request with a failure reason, notifying the callback once.
    ///
    /// Never touches the native backend. Fails if the callback has already
    /// fired.
    pub fn abort(&self, reason: ClipboardError) -> ClipboardResult<()> {
        if !self.is_valid() {
            return Err(ClipboardError::Failure("write request is no longer valid".into()));
        }
        debug!(slot = %self.slot, %reason, "async write request aborted");
        self.notify(Err(reason));
        Ok(())
    }

    fn notify(&self, result: ClipboardResult<()>) {
        // Taking the callback is what invalidates the handle; from here on
        // set_data and abort both refuse to run.
        if let Some(callback) = self.callback.lock().take() {
            callback(result);
        }
    }
}
