//! Host clipboard capability. Writes are fire-and-forget from the session's point of view.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(String),
}

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via `arboard`.
///
/// One handle lives for the whole process: on X11/Wayland the copied text is
/// served by that handle and disappears once it is dropped. Writes block, so
/// callers run them on the blocking pool.
pub struct ArboardClipboard {
    clipboard: Mutex<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self {
            clipboard: Mutex::new(clipboard),
        })
    }
}

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Used on headless hosts (`CLIPBOARD_ENABLED=false`).
#[derive(Debug, Default)]
pub struct NoopClipboard;

impl ClipboardWriter for NoopClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        debug!("Clipboard disabled, dropping {} bytes", text.len());
        Ok(())
    }
}
