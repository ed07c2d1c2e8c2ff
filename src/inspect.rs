//! Content inspection seam.
//!
//! Security-sensitive deployments route every clipboard delivery through an
//! inspection service that may veto it. The broker only needs a yes/no
//! answer; the policy engine behind it is out of scope.

use async_trait::async_trait;

use crate::backend::ClipboardSlot;
use crate::context::WindowContext;
use crate::transferable::Transferable;

/// Outcome of a content inspection check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionVerdict {
    /// Deliver the data to the caller
    Allow,
    /// Withhold the data; the caller's transferable is cleared
    Block,
}

impl InspectionVerdict {
    /// Returns true if the content may be delivered
    pub fn should_allow_content(self) -> bool {
        matches!(self, InspectionVerdict::Allow)
    }
}

/// Inspects clipboard content before it is delivered to a caller.
///
/// The async [`check`](ContentInspector::check) may take arbitrarily long
/// (e.g. an out-of-process scan); the broker re-validates snapshot staleness
/// around it but never delivers data a `Block` verdict covered.
#[async_trait]
pub trait ContentInspector: Send + Sync {
    /// Whether inspection is currently enforced. Inactive inspectors relax
    /// the consent-request coalescing rule (window identity is not compared).
    fn is_active(&self) -> bool {
        true
    }

    /// Synchronous check; returns true to allow delivery
    fn check_sync(
        &self,
        window: Option<&WindowContext>,
        transferable: &Transferable,
        slot: ClipboardSlot,
    ) -> bool;

    /// Asynchronous check. Defaults to the synchronous verdict.
    async fn check(
        &self,
        window: Option<&WindowContext>,
        transferable: &Transferable,
        slot: ClipboardSlot,
    ) -> InspectionVerdict {
        if self.check_sync(window, transferable, slot) {
            InspectionVerdict::Allow
        } else {
            InspectionVerdict::Block
        }
    }
}
