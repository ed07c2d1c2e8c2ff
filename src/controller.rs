//! Clipboard broker - the public read/write surface.
//!
//! [`ClipboardBroker`] mediates between callers of differing trust levels
//! and the native clipboard backend. It owns the per-slot write caches and
//! pending-write table, routes reads through the cache, the consent gate and
//! content inspection, and hands out validity-checked
//! [`ClipboardDataSnapshot`]s for deferred fetching.
//!
//! All mutable broker state is sequenced on one logical owner thread;
//! asynchronous backend and prompt work completes back on it. The `*_sync`
//! entry points block on the backend and must only be used where blocking is
//! acceptable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::backend::{ClipboardCapabilities, ClipboardSlot, NativeClipboardBackend};
use crate::cache::ClipboardCache;
use crate::consent::{ConsentPrompter, UserConfirmationRequest};
use crate::context::{Principal, WindowContext};
use crate::error::{ClipboardError, ClipboardResult};
use crate::inspect::ContentInspector;
use crate::snapshot::{ClipboardDataSnapshot, SnapshotOrigin};
use crate::transferable::{is_image_flavor, ClipboardOwner, Transferable, NATIVE_IMAGE_MIME};
use crate::write::{AsyncWriteRequest, WriteCompleteCallback};

/// Bounded retries when the sequence number moves during flavor enumeration.
/// Mismatches are rare races; there is deliberately no backoff delay.
const SEQUENCE_RETRY_COUNT: usize = 5;

/// Runtime configuration for the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Serve reads from the write cache when its sequence number still
    /// matches the native clipboard
    pub use_cached_data: bool,

    /// Skip the paste-consent prompt entirely (automated-test override)
    pub bypass_paste_prompt: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            use_cached_data: true,
            bypass_paste_prompt: false,
        }
    }
}

#[derive(Default)]
struct SlotState {
    cache: ClipboardCache,
    pending_write: Option<Arc<AsyncWriteRequest>>,
}

/// Builder for [`ClipboardBroker`]
pub struct ClipboardBrokerBuilder {
    backend: Arc<dyn NativeClipboardBackend>,
    capabilities: ClipboardCapabilities,
    config: BrokerConfig,
    inspector: Option<Arc<dyn ContentInspector>>,
    prompter: Option<Arc<dyn ConsentPrompter>>,
}

impl ClipboardBrokerBuilder {
    /// Which optional slots the platform supports
    pub fn capabilities(mut self, capabilities: ClipboardCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Runtime configuration
    pub fn config(mut self, config: BrokerConfig) -> Self {
        self.config = config;
        self
    }

    /// Content inspection service; absent means all content is allowed
    pub fn inspector(mut self, inspector: Arc<dyn ContentInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Paste-consent prompt service; absent means untrusted reads that need
    /// consent fail with [`ClipboardError::NotAllowed`]
    pub fn prompter(mut self, prompter: Arc<dyn ConsentPrompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Build the broker
    pub fn build(self) -> Arc<ClipboardBroker> {
        let broker = Arc::new(ClipboardBroker {
            config: self.config,
            capabilities: self.capabilities,
            backend: self.backend,
            inspector: self.inspector,
            prompter: self.prompter,
            slots: std::array::from_fn(|_| Mutex::new(SlotState::default())),
            confirmation: Mutex::new(None),
            ignore_empty: AtomicBool::new(false),
        });
        debug!(capabilities = ?broker.capabilities, "clipboard broker initialized");
        broker
    }
}

/// Mediates clipboard access: caching, consent gating, content inspection
pub struct ClipboardBroker {
    config: BrokerConfig,
    capabilities: ClipboardCapabilities,
    backend: Arc<dyn NativeClipboardBackend>,
    inspector: Option<Arc<dyn ContentInspector>>,
    prompter: Option<Arc<dyn ConsentPrompter>>,
    slots: [Mutex<SlotState>; 4],
    confirmation: Mutex<Option<UserConfirmationRequest>>,
    // Set around the native write so a reentrant empty notification from the
    // backend does not clear the entry being written.
    ignore_empty: AtomicBool,
}

impl std::fmt::Debug for ClipboardBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardBroker")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl ClipboardBroker {
    /// Start building a broker over the given backend
    pub fn builder(backend: Arc<dyn NativeClipboardBackend>) -> ClipboardBrokerBuilder {
        ClipboardBrokerBuilder {
            backend,
            capabilities: ClipboardCapabilities::default(),
            config: BrokerConfig::default(),
            inspector: None,
            prompter: None,
        }
    }

    /// Broker with default configuration and no consent/inspection services
    pub fn new(
        backend: Arc<dyn NativeClipboardBackend>,
        capabilities: ClipboardCapabilities,
    ) -> Arc<Self> {
        Self::builder(backend).capabilities(capabilities).build()
    }

    /// The capability set this broker was built with
    pub fn capabilities(&self) -> ClipboardCapabilities {
        self.capabilities
    }

    /// Returns true if the slot exists in this process
    pub fn is_slot_supported(&self, slot: ClipboardSlot) -> bool {
        match slot {
            ClipboardSlot::Global => true,
            ClipboardSlot::Selection => self.capabilities.supports_selection,
            ClipboardSlot::Find => self.capabilities.supports_find,
            ClipboardSlot::SelectionCache => self.capabilities.supports_selection_cache,
        }
    }

    fn slot_state(&self, slot: ClipboardSlot) -> &Mutex<SlotState> {
        &self.slots[slot.index()]
    }

    fn inspection_active(&self) -> bool {
        self.inspector.as_ref().map_or(false, |i| i.is_active())
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Write `transferable` to the slot and take ownership of it in the
    /// cache.
    ///
    /// A write with the identical transferable+owner pair as the cached one
    /// is treated as a no-op success: no native write, no spurious
    /// owner-loss notification. Any pending asynchronous write on the slot
    /// is aborted before the native write happens.
    pub fn set_data(
        &self,
        transferable: Arc<Transferable>,
        owner: Option<Arc<dyn ClipboardOwner>>,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
    ) -> ClipboardResult<()> {
        debug!(%slot, "set_data");
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }
        for flavor in transferable.exportable_flavors() {
            debug!(%flavor, "  writing flavor");
        }

        let superseded = {
            let mut state = self.slot_state(slot).lock();

            let same_transferable = state
                .cache
                .transferable()
                .map_or(false, |cached| Arc::ptr_eq(cached, &transferable));
            let same_owner = match (state.cache.owner(), owner.as_ref()) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same_transferable && same_owner {
                debug!(%slot, "skipping update, transferable and owner unchanged");
                return Ok(());
            }

            state.cache.clear();
            state.pending_write.take()
        };
        if let Some(request) = superseded {
            let _ = request.abort(ClipboardError::Aborted);
        }

        self.ignore_empty.store(true, Ordering::Release);
        let write_result = self.backend.set_data(&transferable, slot);
        self.ignore_empty.store(false, Ordering::Release);
        if let Err(err) = write_result {
            debug!(%slot, %err, "native clipboard write failed");
            return Err(err);
        }

        // The post-write sequence number tags the cache entry; without it
        // the entry could never be validated, so the cache stays empty.
        let sequence = match self.backend.sequence_number(slot) {
            Ok(sequence) => sequence,
            Err(err) => {
                debug!(%slot, %err, "unable to read post-write sequence number");
                return Err(err);
            }
        };

        self.slot_state(slot).lock().cache.update(
            transferable,
            owner,
            sequence,
            window.map(|w| w.inner_window_id()),
        );
        Ok(())
    }

    /// Create a deferred write handle for the slot.
    ///
    /// Any previous pending handle on the slot is aborted (its callback
    /// fires with [`ClipboardError::Aborted`]) before the new handle is
    /// installed; the superseded handle is permanently inert.
    pub fn async_set_data(
        self: &Arc<Self>,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
        callback: WriteCompleteCallback,
    ) -> ClipboardResult<Arc<AsyncWriteRequest>> {
        debug!(%slot, "async_set_data");
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }

        let previous = self.slot_state(slot).lock().pending_write.take();
        if let Some(request) = previous {
            let _ = request.abort(ClipboardError::Aborted);
        }

        let request = Arc::new(AsyncWriteRequest::new(
            slot,
            window.cloned(),
            Arc::downgrade(self),
            callback,
        ));
        self.slot_state(slot).lock().pending_write = Some(Arc::clone(&request));
        Ok(request)
    }

    /// Remove `request` from the pending table if it is still the slot's
    /// current pending write. Returns false for superseded handles.
    pub(crate) fn take_pending_write_if_current(
        &self,
        slot: ClipboardSlot,
        request: &AsyncWriteRequest,
    ) -> bool {
        let mut state = self.slot_state(slot).lock();
        let is_current = state
            .pending_write
            .as_ref()
            .map_or(false, |current| std::ptr::eq(Arc::as_ptr(current), request as *const _));
        if is_current {
            state.pending_write = None;
        }
        is_current
    }

    /// Discard the slot's content, native and cached
    pub fn empty_clipboard(&self, slot: ClipboardSlot) -> ClipboardResult<()> {
        debug!(%slot, "empty_clipboard");
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }

        if let Err(err) = self.backend.empty(slot) {
            debug!(%slot, %err, "native empty failed");
        }

        if self.ignore_empty.load(Ordering::Acquire) {
            return Ok(());
        }

        self.slot_state(slot).lock().cache.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cache plumbing
    // ------------------------------------------------------------------

    /// Run `f` against the slot's cache entry if it is still valid: an entry
    /// exists and its sequence number matches the native clipboard's. A
    /// stale entry is cleared on the way out.
    fn with_valid_cache<R>(
        &self,
        slot: ClipboardSlot,
        f: impl FnOnce(&ClipboardCache) -> R,
    ) -> Option<R> {
        let mut state = self.slot_state(slot).lock();
        state.cache.transferable()?;

        let current = self.backend.sequence_number(slot).ok()?;
        if current != state.cache.sequence_number() {
            debug!(%slot, "clipboard cache is stale, clearing");
            state.cache.clear();
            return None;
        }
        Some(f(&state.cache))
    }

    pub(crate) fn cache_sequence_if_valid(&self, slot: ClipboardSlot) -> Option<i64> {
        self.with_valid_cache(slot, |cache| cache.sequence_number())
    }

    pub(crate) fn backend_sequence(&self, slot: ClipboardSlot) -> ClipboardResult<i64> {
        self.backend.sequence_number(slot)
    }

    pub(crate) fn backend_get_data(
        &self,
        flavor: &str,
        slot: ClipboardSlot,
    ) -> ClipboardResult<Option<bytes::Bytes>> {
        self.backend.get_data(flavor, slot)
    }

    pub(crate) async fn backend_get_data_async(
        &self,
        flavor: &str,
        slot: ClipboardSlot,
    ) -> ClipboardResult<Option<bytes::Bytes>> {
        self.backend.get_data_async(flavor, slot).await
    }

    pub(crate) fn cache_get_data(&self, dest: &Transferable, slot: ClipboardSlot) -> ClipboardResult<()> {
        self.with_valid_cache(slot, |cache| cache.get_data(dest))
            .unwrap_or_else(|| Err(ClipboardError::Failure("clipboard cache is not valid".into())))
    }

    /// Inner window id of the document whose data is validly cached for the
    /// slot, if one was recorded at write time
    pub fn clipboard_cache_window_id(&self, slot: ClipboardSlot) -> Option<u64> {
        if !self.is_slot_supported(slot) {
            return None;
        }
        self.with_valid_cache(slot, |cache| cache.inner_window_id())
            .flatten()
    }

    // ------------------------------------------------------------------
    // Content inspection
    // ------------------------------------------------------------------

    pub(crate) fn inspect_sync_or_block(
        &self,
        window: Option<&WindowContext>,
        dest: &Transferable,
        slot: ClipboardSlot,
    ) -> ClipboardResult<()> {
        let Some(inspector) = &self.inspector else {
            return Ok(());
        };
        if inspector.check_sync(window, dest, slot) {
            Ok(())
        } else {
            dest.clear_all_data();
            Err(ClipboardError::ContentBlocked)
        }
    }

    pub(crate) async fn inspect_async(
        &self,
        window: Option<&WindowContext>,
        dest: &Transferable,
        slot: ClipboardSlot,
    ) -> ClipboardResult<()> {
        let Some(inspector) = &self.inspector else {
            return Ok(());
        };
        if inspector.check(window, dest, slot).await.should_allow_content() {
            Ok(())
        } else {
            dest.clear_all_data();
            Err(ClipboardError::ContentBlocked)
        }
    }

    // ------------------------------------------------------------------
    // Synchronous read path
    // ------------------------------------------------------------------

    /// Read into `dest`, serving the first of its importable flavors that
    /// has data.
    ///
    /// Prefers the write cache when enabled and valid; otherwise queries the
    /// native backend flavor by flavor. Content inspection runs on the
    /// result either way - an empty result is still inspected - and a
    /// rejection clears `dest` and fails with
    /// [`ClipboardError::ContentBlocked`].
    pub fn get_data(
        &self,
        dest: &Transferable,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
    ) -> ClipboardResult<()> {
        debug!(%slot, "get_data");
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }

        if self.config.use_cached_data && self.cache_get_data(dest, slot).is_ok() {
            return self.inspect_sync_or_block(window, dest, slot);
        }

        // Cache could not satisfy the request; look at what other agents put
        // on the native clipboard.
        for flavor in dest.importable_flavors() {
            match self.backend.get_data(&flavor, slot) {
                Ok(Some(data)) => {
                    dest.set_data(flavor, data);
                    break;
                }
                Ok(None) => continue,
                Err(err) => {
                    debug!(%flavor, %err, "native read failed, trying next flavor");
                    continue;
                }
            }
        }

        self.inspect_sync_or_block(window, dest, slot)
    }

    /// Returns true if any of `flavors` is available on the slot, checking
    /// the valid write cache before the backend
    pub fn has_data_matching_flavors(
        &self,
        flavors: &[String],
        slot: ClipboardSlot,
    ) -> ClipboardResult<bool> {
        debug!(%slot, "has_data_matching_flavors");
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }

        if self.config.use_cached_data {
            let cached_match = self.with_valid_cache(slot, |cache| {
                cache
                    .transferable()
                    .map(|t| t.exportable_flavors())
                    .unwrap_or_default()
                    .iter()
                    .any(|have| flavors.iter().any(|asked| asked == have))
            });
            if cached_match == Some(true) {
                return Ok(true);
            }
        }

        self.backend.has_matching_flavors(flavors, slot)
    }

    // ------------------------------------------------------------------
    // Snapshot derivation
    // ------------------------------------------------------------------

    /// Capture which of `flavors` are available on the slot, gating the
    /// request on user consent when the requester is untrusted.
    ///
    /// Consent is skipped for the automated-test override, for principals
    /// holding the clipboard-read permission, and when valid cached data is
    /// same-origin with the requester. Extension principals without the
    /// permission fail immediately without a prompt.
    pub async fn get_data_snapshot(
        self: &Arc<Self>,
        flavors: Vec<String>,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
        principal: &Principal,
    ) -> ClipboardResult<ClipboardDataSnapshot> {
        debug!(%slot, "get_data_snapshot");
        if flavors.is_empty() {
            return Err(ClipboardError::InvalidArgument("flavor list must not be empty"));
        }
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }

        if self.config.bypass_paste_prompt || principal.has_clipboard_read() {
            return self.get_data_snapshot_internal(flavors, slot, window).await;
        }

        let cached_principal = self
            .with_valid_cache(slot, |cache| {
                cache.transferable().and_then(|t| t.data_principal())
            })
            .flatten();
        if let Some(data_principal) = cached_principal {
            if principal.subsumes(&data_principal) {
                debug!(%slot, "cached clipboard data is same-origin with requester");
                return self.get_data_snapshot_internal(flavors, slot, window).await;
            }
        }

        if principal.is_extension() {
            debug!("extension principal without clipboard-read permission");
            return Err(ClipboardError::NotAllowed);
        }

        self.request_user_confirmation(slot, flavors, window, principal).await
    }

    /// Snapshot derivation with consent already settled
    pub(crate) async fn get_data_snapshot_internal(
        self: &Arc<Self>,
        flavors: Vec<String>,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
    ) -> ClipboardResult<ClipboardDataSnapshot> {
        if let Some(snapshot) = self.snapshot_from_cache(&flavors, slot, window) {
            return Ok(snapshot);
        }
        self.snapshot_from_native(flavors, slot, window).await
    }

    /// Synchronous snapshot derivation. Unconditionally bypasses consent;
    /// callers are responsible for having authorized the read beforehand.
    pub fn get_data_snapshot_sync(
        self: &Arc<Self>,
        flavors: Vec<String>,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
    ) -> ClipboardResult<ClipboardDataSnapshot> {
        debug!(%slot, "get_data_snapshot_sync");
        if flavors.is_empty() {
            return Err(ClipboardError::InvalidArgument("flavor list must not be empty"));
        }
        if !self.is_slot_supported(slot) {
            debug!(%slot, "slot is not supported");
            return Err(ClipboardError::NotSupported);
        }

        if let Some(snapshot) = self.snapshot_from_cache(&flavors, slot, window) {
            return Ok(snapshot);
        }

        let sequence = self.backend.sequence_number(slot)?;
        let mut matched = Vec::new();
        for flavor in &flavors {
            if let Ok(true) = self.backend.has_matching_flavors(std::slice::from_ref(flavor), slot) {
                debug!(%flavor, "native snapshot has flavor");
                matched.push(flavor.clone());
            }
        }

        Ok(ClipboardDataSnapshot::new(
            slot,
            sequence,
            matched,
            SnapshotOrigin::Native,
            Arc::downgrade(self),
            window.cloned(),
        ))
    }

    /// Build a cache-provenance snapshot when the cache is enabled and
    /// valid. Snapshot matching is a *set* intersection, not first-match: it
    /// reports every requested flavor the cached transferable can export,
    /// with a native-image entry satisfying any requested image flavor.
    fn snapshot_from_cache(
        self: &Arc<Self>,
        flavors: &[String],
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
    ) -> Option<ClipboardDataSnapshot> {
        if !self.config.use_cached_data {
            return None;
        }

        let (matched, sequence) = self.with_valid_cache(slot, |cache| {
            let exportable = cache
                .transferable()
                .map(|t| t.exportable_flavors())
                .unwrap_or_default();
            let matched: Vec<String> = flavors
                .iter()
                .filter(|flavor| {
                    exportable
                        .iter()
                        .any(|have| have == *flavor || (have == NATIVE_IMAGE_MIME && is_image_flavor(flavor)))
                })
                .cloned()
                .collect();
            (matched, cache.sequence_number())
        })?;

        for flavor in &matched {
            debug!(%flavor, "cache snapshot has flavor");
        }
        Some(ClipboardDataSnapshot::new(
            slot,
            sequence,
            matched,
            SnapshotOrigin::Cache,
            Arc::downgrade(self),
            window.cloned(),
        ))
    }

    /// Enumerate matching flavors from the backend, bracketed by sequence
    /// number reads. A mismatch means the clipboard changed mid-read; retry
    /// a bounded number of times before giving up.
    async fn snapshot_from_native(
        self: &Arc<Self>,
        flavors: Vec<String>,
        slot: ClipboardSlot,
        window: Option<&WindowContext>,
    ) -> ClipboardResult<ClipboardDataSnapshot> {
        let mut attempts_left = SEQUENCE_RETRY_COUNT;
        loop {
            // The pre-read sequence number pins which clipboard content the
            // enumeration describes.
            let before = self.backend.sequence_number(slot)?;
            let matched = self.backend.matching_flavors(&flavors, slot).await?;
            let after = self.backend.sequence_number(slot)?;

            if before == after {
                for flavor in &matched {
                    debug!(%flavor, "native snapshot has flavor");
                }
                return Ok(ClipboardDataSnapshot::new(
                    slot,
                    before,
                    matched,
                    SnapshotOrigin::Native,
                    Arc::downgrade(self),
                    window.cloned(),
                ));
            }

            if attempts_left == 0 {
                warn!(%slot, "clipboard kept changing during flavor enumeration");
                return Err(ClipboardError::Failure(
                    "clipboard changed repeatedly during flavor enumeration".into(),
                ));
            }
            attempts_left -= 1;
            debug!(%slot, attempts_left, "sequence number moved during enumeration, retrying");
        }
    }

    // ------------------------------------------------------------------
    // Consent gate
    // ------------------------------------------------------------------

    async fn request_user_confirmation(
        self: &Arc<Self>,
        slot: ClipboardSlot,
        flavors: Vec<String>,
        window: Option<&WindowContext>,
        principal: &Principal,
    ) -> ClipboardResult<ClipboardDataSnapshot> {
        let Some(window) = window else {
            debug!("paste consent requires a window context");
            return Err(ClipboardError::Failure("consent requires a window context".into()));
        };

        let chrome = Arc::clone(window.chrome_document());
        if !chrome.has_focus() {
            debug!("rejecting paste request, chrome document is not focused");
            return Err(ClipboardError::Failure("requesting window is not focused".into()));
        }
        if chrome.active_embedder() != Some(window.embedder_id()) {
            // Background tabs do not get to snoop the clipboard.
            debug!("rejecting paste request, requesting tab is not active");
            return Err(ClipboardError::Failure("requesting tab is not active".into()));
        }

        let receiver = {
            let mut confirmation = self.confirmation.lock();
            match confirmation.as_mut() {
                Some(pending) => {
                    if !pending.is_equal(slot, chrome.id(), principal, window, self.inspection_active()) {
                        debug!("incompatible paste prompt already outstanding");
                        return Err(ClipboardError::NotAllowed);
                    }
                    debug!(%slot, "coalescing into outstanding paste prompt");
                    let (tx, rx) = oneshot::channel();
                    pending.push(flavors, tx);
                    rx
                }
                None => {
                    let Some(prompter) = self.prompter.clone() else {
                        debug!("no consent prompter configured");
                        return Err(ClipboardError::NotAllowed);
                    };

                    let (tx, rx) = oneshot::channel();
                    let mut pending =
                        UserConfirmationRequest::new(slot, chrome.id(), principal.clone(), window.clone());
                    pending.push(flavors, tx);
                    *confirmation = Some(pending);

                    let broker = Arc::clone(self);
                    let prompt_window = window.clone();
                    tokio::spawn(async move {
                        let outcome = prompter.request_paste_confirmation(&prompt_window).await;
                        broker.resolve_user_confirmation(outcome).await;
                    });
                    rx
                }
            }
        };

        receiver.await.unwrap_or_else(|_| Err(ClipboardError::Aborted))
    }

    /// Complete the outstanding confirmation, draining every queued request
    /// exactly once
    async fn resolve_user_confirmation(self: &Arc<Self>, outcome: ClipboardResult<bool>) {
        let Some(confirmation) = self.confirmation.lock().take() else {
            return;
        };
        let (slot, window, requests) = confirmation.into_parts();

        match outcome {
            Ok(true) => {
                debug!(%slot, count = requests.len(), "paste approved, draining queued requests");
                for request in requests {
                    let result = self
                        .get_data_snapshot_internal(request.flavors, slot, Some(&window))
                        .await;
                    let _ = request.responder.send(result);
                }
            }
            Ok(false) => {
                debug!(%slot, count = requests.len(), "paste denied");
                for request in requests {
                    let _ = request.responder.send(Err(ClipboardError::NotAllowed));
                }
            }
            Err(err) => {
                debug!(%slot, %err, "paste prompt failed");
                for request in requests {
                    let _ = request
                        .responder
                        .send(Err(ClipboardError::Failure(err.to_string())));
                }
            }
        }
    }
}

impl Drop for ClipboardBroker {
    fn drop(&mut self) {
        // Pending writes must never dangle; queued consent requests fail via
        // their dropped responders.
        for state in &self.slots {
            let pending = state.lock().pending_write.take();
            if let Some(request) = pending {
                let _ = request.abort(ClipboardError::Aborted);
            }
        }
    }
}
