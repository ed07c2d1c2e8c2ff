//! End-to-end broker tests over the in-process backend.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;

use clipboard_broker::{
    BrokerConfig, ChromeDocument, ClipboardBroker, ClipboardCapabilities, ClipboardError,
    ClipboardResult, ClipboardSlot, ConsentPrompter, ContentInspector, MemoryClipboard,
    NativeClipboardBackend, Principal, SnapshotOrigin, Transferable, WindowContext,
};

fn text_transferable(data: &'static [u8]) -> Arc<Transferable> {
    let t = Transferable::shared();
    t.set_data("text/plain", Bytes::from_static(data));
    t
}

fn text_reader() -> Transferable {
    let dest = Transferable::new();
    dest.add_import_flavor("text/plain");
    dest
}

fn focused_window() -> WindowContext {
    let chrome = Arc::new(ChromeDocument::new(1));
    chrome.set_focused(true);
    chrome.set_active_embedder(Some(7));
    WindowContext::new(100, 7, chrome)
}

struct CountingPrompter {
    calls: AtomicUsize,
    allow: bool,
}

impl CountingPrompter {
    fn new(allow: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            allow,
        })
    }
}

#[async_trait]
impl ConsentPrompter for CountingPrompter {
    async fn request_paste_confirmation(&self, _window: &WindowContext) -> ClipboardResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.allow)
    }
}

/// Prompter that blocks until the test releases it, so requests can pile up
/// behind one outstanding confirmation.
struct GatedPrompter {
    calls: AtomicUsize,
    gate: Notify,
}

impl GatedPrompter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        })
    }
}

#[async_trait]
impl ConsentPrompter for GatedPrompter {
    async fn request_paste_confirmation(&self, _window: &WindowContext) -> ClipboardResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(true)
    }
}

struct DenyAllInspector;

#[async_trait]
impl ContentInspector for DenyAllInspector {
    fn check_sync(&self, _: Option<&WindowContext>, _: &Transferable, _: ClipboardSlot) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Write / read round trips
// ---------------------------------------------------------------------------

#[test]
fn write_then_read_from_cache() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"hello"), None, ClipboardSlot::Global, None)
        .unwrap();

    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"hello")));
}

#[test]
fn read_falls_back_to_backend_after_external_write() {
    let backend = Arc::new(MemoryClipboard::new());
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"ours"), None, ClipboardSlot::Global, None)
        .unwrap();

    backend.write_external(ClipboardSlot::Global, "text/plain", Bytes::from_static(b"theirs"));

    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"theirs")));
}

#[test]
fn external_write_notifies_owner_on_next_cache_check() {
    struct RecordingOwner(AtomicUsize);
    impl clipboard_broker::ClipboardOwner for RecordingOwner {
        fn losing_ownership(&self, _: Option<&Transferable>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let backend = Arc::new(MemoryClipboard::new());
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    let owner = Arc::new(RecordingOwner(AtomicUsize::new(0)));
    broker
        .set_data(text_transferable(b"x"), Some(owner.clone()), ClipboardSlot::Global, None)
        .unwrap();

    backend.write_external(ClipboardSlot::Global, "text/plain", Bytes::from_static(b"y"));

    // The stale entry is discovered (and the owner told) on the next read.
    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(owner.0.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_clipboard_clears_backend_and_cache() {
    let backend = Arc::new(MemoryClipboard::new());
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"gone"), None, ClipboardSlot::Global, None)
        .unwrap();

    broker.empty_clipboard(ClipboardSlot::Global).unwrap();

    assert_eq!(backend.get_data("text/plain", ClipboardSlot::Global).unwrap(), None);
    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(dest.data("text/plain"), None);
}

/// Backend that calls back into the broker's `empty_clipboard` from inside
/// its own `set_data`, the way a platform layer can emit an ownership-lost
/// notification while a write is still in flight.
struct ReentrantEmptyBackend {
    inner: MemoryClipboard,
    broker: Mutex<Option<Weak<ClipboardBroker>>>,
}

impl ReentrantEmptyBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryClipboard::new(),
            broker: Mutex::new(None),
        })
    }
}

#[async_trait]
impl NativeClipboardBackend for ReentrantEmptyBackend {
    fn set_data(&self, transferable: &Transferable, slot: ClipboardSlot) -> ClipboardResult<()> {
        self.inner.set_data(transferable, slot)?;
        let broker = self.broker.lock().as_ref().and_then(Weak::upgrade);
        if let Some(broker) = broker {
            broker.empty_clipboard(slot)?;
        }
        Ok(())
    }

    fn get_data(&self, flavor: &str, slot: ClipboardSlot) -> ClipboardResult<Option<Bytes>> {
        self.inner.get_data(flavor, slot)
    }

    fn sequence_number(&self, slot: ClipboardSlot) -> ClipboardResult<i64> {
        self.inner.sequence_number(slot)
    }

    fn has_matching_flavors(&self, flavors: &[String], slot: ClipboardSlot) -> ClipboardResult<bool> {
        self.inner.has_matching_flavors(flavors, slot)
    }

    fn empty(&self, slot: ClipboardSlot) -> ClipboardResult<()> {
        self.inner.empty(slot)
    }
}

#[test]
fn reentrant_empty_during_write_keeps_cache_entry() {
    let backend = ReentrantEmptyBackend::new();
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    *backend.broker.lock() = Some(Arc::downgrade(&broker));

    broker
        .set_data(text_transferable(b"kept"), None, ClipboardSlot::Global, None)
        .unwrap();

    // The reentrant empty must not have cleared the entry being written.
    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"kept")));

    // The guard only covers the write window; a later empty clears as usual.
    broker.empty_clipboard(ClipboardSlot::Global).unwrap();
    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(dest.data("text/plain"), None);
}

#[test]
fn has_data_matching_flavors_checks_cache_and_backend() {
    let backend = Arc::new(MemoryClipboard::new());
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    let text = vec!["text/plain".to_string()];
    let html = vec!["text/html".to_string()];
    assert!(broker.has_data_matching_flavors(&text, ClipboardSlot::Global).unwrap());
    assert!(!broker.has_data_matching_flavors(&html, ClipboardSlot::Global).unwrap());

    backend.write_external(ClipboardSlot::Global, "text/html", Bytes::from_static(b"<i>x</i>"));
    assert!(broker.has_data_matching_flavors(&html, ClipboardSlot::Global).unwrap());
}

// ---------------------------------------------------------------------------
// Pending asynchronous writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn newer_pending_write_aborts_older() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());

    let first_result: Arc<Mutex<Option<ClipboardResult<()>>>> = Arc::new(Mutex::new(None));
    let first_slot = first_result.clone();
    let first = broker
        .async_set_data(
            ClipboardSlot::Global,
            None,
            Box::new(move |result| *first_slot.lock() = Some(result)),
        )
        .unwrap();

    let second = broker
        .async_set_data(ClipboardSlot::Global, None, Box::new(|_| {}))
        .unwrap();

    // Issuing the second request fired the first's callback with an abort.
    assert_eq!(*first_result.lock(), Some(Err(ClipboardError::Aborted)));
    assert!(!first.is_valid());
    assert!(first.set_data(text_transferable(b"late"), None).is_err());

    second.set_data(text_transferable(b"winner"), None).unwrap();
    let dest = text_reader();
    broker.get_data(&dest, ClipboardSlot::Global, None).unwrap();
    assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"winner")));
}

#[tokio::test]
async fn sync_write_aborts_pending_write() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());

    let aborted = Arc::new(AtomicUsize::new(0));
    let counter = aborted.clone();
    let pending = broker
        .async_set_data(
            ClipboardSlot::Global,
            None,
            Box::new(move |result| {
                assert_eq!(result, Err(ClipboardError::Aborted));
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    broker
        .set_data(text_transferable(b"direct"), None, ClipboardSlot::Global, None)
        .unwrap();

    assert_eq!(aborted.load(Ordering::SeqCst), 1);
    assert!(!pending.is_valid());
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_invalidated_by_external_write() {
    let backend = Arc::new(MemoryClipboard::new());
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"hi"), None, ClipboardSlot::Global, None)
        .unwrap();

    let snapshot = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            None,
            &Principal::system(),
        )
        .await
        .unwrap();
    assert!(snapshot.is_valid());

    backend.write_external(ClipboardSlot::Global, "text/plain", Bytes::from_static(b"other"));
    assert!(!snapshot.is_valid());

    let dest = text_reader();
    assert_eq!(snapshot.get_data(&dest).await, Err(ClipboardError::NotAvailable));

    // Invalidation is permanent even though the sequence number could in
    // principle wrap back.
    assert!(!snapshot.is_valid());
}

#[tokio::test]
async fn snapshot_delivers_cached_data() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"cached"), None, ClipboardSlot::Global, None)
        .unwrap();

    let snapshot = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            None,
            &Principal::system(),
        )
        .await
        .unwrap();
    assert_eq!(snapshot.origin(), SnapshotOrigin::Cache);

    let dest = text_reader();
    snapshot.get_data(&dest).await.unwrap();
    assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"cached")));
}

#[tokio::test]
async fn snapshot_rejects_flavor_outside_its_set() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    let snapshot = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            None,
            &Principal::system(),
        )
        .await
        .unwrap();

    let dest = Transferable::new();
    dest.add_import_flavor("text/html");
    assert!(snapshot.get_data(&dest).await.is_err());
}

#[tokio::test]
async fn snapshot_from_native_content() {
    let backend = Arc::new(MemoryClipboard::new());
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());
    backend.write_external(ClipboardSlot::Global, "text/plain", Bytes::from_static(b"native"));

    let snapshot = broker
        .get_data_snapshot(
            vec!["text/html".to_string(), "text/plain".to_string()],
            ClipboardSlot::Global,
            None,
            &Principal::system(),
        )
        .await
        .unwrap();
    assert_eq!(snapshot.origin(), SnapshotOrigin::Native);
    assert_eq!(snapshot.flavor_list(), ["text/plain"]);

    let dest = text_reader();
    snapshot.get_data(&dest).await.unwrap();
    assert_eq!(dest.data("text/plain"), Some(Bytes::from_static(b"native")));
}

/// Backend whose sequence number advances on every query, so a flavor
/// enumeration can never be bracketed by two equal reads.
struct RestlessBackend {
    sequence: AtomicI64,
    enumerations: AtomicUsize,
}

impl RestlessBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sequence: AtomicI64::new(0),
            enumerations: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl NativeClipboardBackend for RestlessBackend {
    fn set_data(&self, _: &Transferable, _: ClipboardSlot) -> ClipboardResult<()> {
        Ok(())
    }

    fn get_data(&self, _: &str, _: ClipboardSlot) -> ClipboardResult<Option<Bytes>> {
        Ok(None)
    }

    fn sequence_number(&self, _: ClipboardSlot) -> ClipboardResult<i64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst))
    }

    fn has_matching_flavors(&self, _: &[String], _: ClipboardSlot) -> ClipboardResult<bool> {
        Ok(true)
    }

    async fn matching_flavors(&self, flavors: &[String], _: ClipboardSlot) -> ClipboardResult<Vec<String>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(flavors.to_vec())
    }

    fn empty(&self, _: ClipboardSlot) -> ClipboardResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn ever_changing_clipboard_exhausts_enumeration_retries() {
    let backend = RestlessBackend::new();
    let broker = ClipboardBroker::new(backend.clone(), ClipboardCapabilities::default());

    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            None,
            &Principal::system(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClipboardError::Failure(_)));

    // One initial attempt plus five retries, with no backoff between them.
    assert_eq!(backend.enumerations.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn empty_flavor_list_is_invalid() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());
    let err = broker
        .get_data_snapshot(Vec::new(), ClipboardSlot::Global, None, &Principal::system())
        .await
        .unwrap_err();
    assert!(matches!(err, ClipboardError::InvalidArgument(_)));
}

#[tokio::test]
async fn sync_snapshot_skips_consent() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    let snapshot = broker
        .get_data_snapshot_sync(vec!["text/plain".to_string()], ClipboardSlot::Global, None)
        .unwrap();
    assert_eq!(snapshot.flavor_list(), ["text/plain"]);
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Consent gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn untrusted_read_prompts_once_and_delivers() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();
    broker
        .set_data(text_transferable(b"secret"), None, ClipboardSlot::Global, None)
        .unwrap();

    let window = focused_window();
    let snapshot = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap();

    assert_eq!(prompter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.flavor_list(), ["text/plain"]);
}

#[tokio::test]
async fn denied_prompt_fails_with_not_allowed() {
    let prompter = CountingPrompter::new(false);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter)
        .build();
    broker
        .set_data(text_transferable(b"secret"), None, ClipboardSlot::Global, None)
        .unwrap();

    let window = focused_window();
    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, ClipboardError::NotAllowed);
}

#[tokio::test]
async fn concurrent_requests_share_one_prompt() {
    let prompter = GatedPrompter::new();
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();
    broker
        .set_data(text_transferable(b"shared"), None, ClipboardSlot::Global, None)
        .unwrap();

    let window = focused_window();
    let principal = Principal::content("https://example.com");

    let first = {
        let broker = broker.clone();
        let window = window.clone();
        let principal = principal.clone();
        tokio::spawn(async move {
            broker
                .get_data_snapshot(
                    vec!["text/plain".to_string()],
                    ClipboardSlot::Global,
                    Some(&window),
                    &principal,
                )
                .await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let second = {
        let broker = broker.clone();
        let window = window.clone();
        let principal = principal.clone();
        tokio::spawn(async move {
            broker
                .get_data_snapshot(
                    vec!["text/plain".to_string()],
                    ClipboardSlot::Global,
                    Some(&window),
                    &principal,
                )
                .await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    prompter.gate.notify_one();

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.flavor_list(), ["text/plain"]);
    assert_eq!(second.flavor_list(), ["text/plain"]);
}

#[tokio::test]
async fn incompatible_concurrent_request_is_rejected() {
    let prompter = GatedPrompter::new();
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    let window = focused_window();
    let first = {
        let broker = broker.clone();
        let window = window.clone();
        tokio::spawn(async move {
            broker
                .get_data_snapshot(
                    vec!["text/plain".to_string()],
                    ClipboardSlot::Global,
                    Some(&window),
                    &Principal::content("https://example.com"),
                )
                .await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // Different principal while the prompt is outstanding: refused outright.
    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://other.test"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, ClipboardError::NotAllowed);

    prompter.gate.notify_one();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn unfocused_window_cannot_request_consent() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();

    let chrome = Arc::new(ChromeDocument::new(1));
    let window = WindowContext::new(100, 7, chrome);

    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClipboardError::Failure(_)));
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn background_tab_cannot_request_consent() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();

    let chrome = Arc::new(ChromeDocument::new(1));
    chrome.set_focused(true);
    chrome.set_active_embedder(Some(99));
    let window = WindowContext::new(100, 7, chrome);

    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClipboardError::Failure(_)));
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn extension_without_permission_is_rejected_without_prompt() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();

    let window = focused_window();
    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::extension("ext://id"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, ClipboardError::NotAllowed);
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn clipboard_read_permission_skips_prompt() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    let window = focused_window();
    broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::extension("ext://id").with_clipboard_read(true),
        )
        .await
        .unwrap();
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn same_origin_cached_data_skips_prompt() {
    let prompter = CountingPrompter::new(true);
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .prompter(prompter.clone())
        .build();

    let writer = text_transferable(b"mine");
    writer.set_data_principal(Some(Principal::content("https://example.com")));
    broker.set_data(writer, None, ClipboardSlot::Global, None).unwrap();

    let window = focused_window();
    broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap();
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);

    // A different origin does not get the shortcut.
    broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&window),
            &Principal::content("https://other.test"),
        )
        .await
        .unwrap();
    assert_eq!(prompter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bypass_config_skips_prompt_and_prompter() {
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .config(BrokerConfig {
            bypass_paste_prompt: true,
            ..BrokerConfig::default()
        })
        .build();
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    // No prompter configured at all; the bypass makes that irrelevant.
    broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&focused_window()),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_prompter_rejects_untrusted_read() {
    let broker = ClipboardBroker::new(Arc::new(MemoryClipboard::new()), ClipboardCapabilities::default());
    broker
        .set_data(text_transferable(b"x"), None, ClipboardSlot::Global, None)
        .unwrap();

    let err = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            Some(&focused_window()),
            &Principal::content("https://example.com"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, ClipboardError::NotAllowed);
}

// ---------------------------------------------------------------------------
// Content inspection
// ---------------------------------------------------------------------------

#[test]
fn blocked_content_is_withheld_and_cleared() {
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .inspector(Arc::new(DenyAllInspector))
        .build();
    broker
        .set_data(text_transferable(b"sensitive"), None, ClipboardSlot::Global, None)
        .unwrap();

    let dest = text_reader();
    let err = broker.get_data(&dest, ClipboardSlot::Global, None).unwrap_err();
    assert_eq!(err, ClipboardError::ContentBlocked);
    assert!(!dest.has_data());
}

#[tokio::test]
async fn blocked_content_fails_snapshot_fetch() {
    let broker = ClipboardBroker::builder(Arc::new(MemoryClipboard::new()))
        .inspector(Arc::new(DenyAllInspector))
        .build();
    broker
        .set_data(text_transferable(b"sensitive"), None, ClipboardSlot::Global, None)
        .unwrap();

    let snapshot = broker
        .get_data_snapshot(
            vec!["text/plain".to_string()],
            ClipboardSlot::Global,
            None,
            &Principal::system(),
        )
        .await
        .unwrap();

    let dest = text_reader();
    assert_eq!(snapshot.get_data(&dest).await, Err(ClipboardError::ContentBlocked));
    assert!(!dest.has_data());
}
