//! Clipboard access for copying API keys and snippets.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[from] arboard::Error),
}

pub trait Clipboard: Send {
    fn set(&mut self, contents: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via arboard, opened lazily on first copy.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set(&mut self, contents: &str) -> Result<(), ClipboardError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard.set_text(contents.to_owned())?;
        Ok(())
    }
}
