//! Hand-off of finished stickers to a transport.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stickerforge_core::{Error, Result};

/// Where a sticker goes and which message it answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryContext {
    /// Chat, channel, or file name, depending on the sink.
    pub destination: String,
    /// Message the sticker replies to, if any.
    pub quoted_message_id: Option<String>,
}

impl DeliveryContext {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            quoted_message_id: None,
        }
    }

    pub fn quoting(mut self, message_id: impl Into<String>) -> Self {
        self.quoted_message_id = Some(message_id.into());
        self
    }
}

/// A transport that accepts finished sticker bytes.
#[async_trait]
pub trait StickerSink: Send + Sync {
    async fn send_sticker(&self, context: &DeliveryContext, sticker: Vec<u8>) -> Result<()>;
}

/// Writes stickers into a directory, one file per destination name.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path a destination name maps to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the destination is a single plain
    /// file name.
    pub fn target_path(&self, destination: &str) -> Result<PathBuf> {
        let mut components = Path::new(destination).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.root.join(name)),
            _ => Err(Error::Validation(format!(
                "destination {destination:?} is not a plain file name"
            ))),
        }
    }
}

#[async_trait]
impl StickerSink for FileSink {
    async fn send_sticker(&self, context: &DeliveryContext, sticker: Vec<u8>) -> Result<()> {
        let path = self.target_path(&context.destination)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &sticker).await?;
        tracing::info!(
            "Wrote {} byte sticker to {}{}",
            sticker.len(),
            path.display(),
            context
                .quoted_message_id
                .as_deref()
                .map(|id| format!(" (reply to {id})"))
                .unwrap_or_default()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_sink_writes_into_root() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(tmp.path().join("out"));
        let ctx = DeliveryContext::new("cat.webp").quoting("msg-42");

        sink.send_sticker(&ctx, b"RIFF....WEBP".to_vec()).await.unwrap();
        let written = std::fs::read(tmp.path().join("out").join("cat.webp")).unwrap();
        assert_eq!(written, b"RIFF....WEBP");
    }

    #[test]
    fn destination_must_be_plain_name() {
        let sink = FileSink::new("/srv/stickers");
        assert!(sink.target_path("ok.webp").is_ok());
        for bad in ["../escape.webp", "nested/dir.webp", "/abs.webp", "", ".."] {
            assert!(
                matches!(sink.target_path(bad), Err(Error::Validation(_))),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn context_builder() {
        let ctx = DeliveryContext::new("room").quoting("7");
        assert_eq!(ctx.destination, "room");
        assert_eq!(ctx.quoted_message_id.as_deref(), Some("7"));
    }
}
