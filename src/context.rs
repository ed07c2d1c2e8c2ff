//! Requester identity and window context.
//!
//! Consent decisions need to know *who* is asking (the [`Principal`]) and
//! *where* the request comes from (the [`WindowContext`] and its top-level
//! [`ChromeDocument`]). These are deliberately small value types; the real
//! document/window machinery lives outside this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Trust category of a requesting principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// Fully trusted chrome/system code
    System,
    /// Ordinary web content
    Content,
    /// Extension (addon) content
    Extension,
}

/// Identity of the party requesting clipboard access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    origin: String,
    kind: PrincipalKind,
    clipboard_read: bool,
}

impl Principal {
    /// The system principal - always trusted, never prompted
    pub fn system() -> Self {
        Self {
            origin: String::new(),
            kind: PrincipalKind::System,
            clipboard_read: false,
        }
    }

    /// A content principal for the given origin
    pub fn content(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            kind: PrincipalKind::Content,
            clipboard_read: false,
        }
    }

    /// An extension principal for the given origin
    pub fn extension(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            kind: PrincipalKind::Extension,
            clipboard_read: false,
        }
    }

    /// Grant or revoke the blanket clipboard-read permission
    pub fn with_clipboard_read(mut self, allowed: bool) -> Self {
        self.clipboard_read = allowed;
        self
    }

    /// The origin this principal represents
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns true if this principal may read the clipboard without a prompt
    pub fn has_clipboard_read(&self) -> bool {
        self.clipboard_read || self.kind == PrincipalKind::System
    }

    /// Returns true for extension principals
    pub fn is_extension(&self) -> bool {
        self.kind == PrincipalKind::Extension
    }

    /// Returns true if this principal's authority covers `other`.
    ///
    /// The system principal subsumes everything; content and extension
    /// principals subsume only an identical principal.
    pub fn subsumes(&self, other: &Principal) -> bool {
        self.kind == PrincipalKind::System || self == other
    }
}

/// The top-level chrome document hosting a requesting tab.
///
/// Tracks the focus state the broker consults before showing a paste
/// prompt: the document itself must be focused and the requesting tab's
/// embedder element must be its active element.
#[derive(Debug)]
pub struct ChromeDocument {
    id: u64,
    focused: AtomicBool,
    active_embedder: Mutex<Option<u64>>,
}

impl ChromeDocument {
    /// Create a chrome document with the given identity, initially unfocused
    pub fn new(id: u64) -> Self {
        Self {
            id,
            focused: AtomicBool::new(false),
            active_embedder: Mutex::new(None),
        }
    }

    /// Stable identity of this document
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Update the document's focus state
    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::Relaxed);
    }

    /// Returns true if the document currently has focus
    pub fn has_focus(&self) -> bool {
        self.focused.load(Ordering::Relaxed)
    }

    /// Set which embedder element is active (the foreground tab)
    pub fn set_active_embedder(&self, embedder: Option<u64>) {
        *self.active_embedder.lock() = embedder;
    }

    /// The currently active embedder element, if any
    pub fn active_embedder(&self) -> Option<u64> {
        *self.active_embedder.lock()
    }
}

/// The window a clipboard request originates from
#[derive(Debug, Clone)]
pub struct WindowContext {
    inner_window_id: u64,
    embedder_id: u64,
    chrome_document: Arc<ChromeDocument>,
}

impl WindowContext {
    /// Create a window context.
    ///
    /// `embedder_id` identifies the element in `chrome_document` that embeds
    /// this window's tab.
    pub fn new(inner_window_id: u64, embedder_id: u64, chrome_document: Arc<ChromeDocument>) -> Self {
        Self {
            inner_window_id,
            embedder_id,
            chrome_document,
        }
    }

    /// Identity of the inner window making the request
    pub fn inner_window_id(&self) -> u64 {
        self.inner_window_id
    }

    /// The embedder element for this window's tab
    pub fn embedder_id(&self) -> u64 {
        self.embedder_id
    }

    /// The top-level chrome document hosting this window
    pub fn chrome_document(&self) -> &Arc<ChromeDocument> {
        &self.chrome_document
    }
}
