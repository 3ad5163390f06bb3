//! System clipboard access.

use anyhow::{Context, Result};
use tracing::debug;

/// Text clipboard capability.
pub trait Clipboard {
    /// Current clipboard text; an empty or non-text clipboard reads as `""`.
    fn read_text(&mut self) -> Result<String>;
    /// Replace the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Clipboard backed by the OS clipboard through `arboard`.
///
/// The handle must live for the whole process: on X11 the contents we set
/// are served by this handle and vanish when it is dropped.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn open() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("open system clipboard")?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Result<String> {
        match self.inner.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => {
                debug!("clipboard has no text content");
                Ok(String::new())
            }
            Err(err) => Err(err).context("read clipboard text"),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .context("write clipboard text")
    }
}
