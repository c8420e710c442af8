use bytes::Bytes;
use futures::SinkExt;
use serde::Serialize;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

use super::frame::FrameCodec;
use crate::error::Result;

/// Instructions sent back to the browser extension.
///
/// The variant name travels in the `command` field, which is what the
/// extension dispatches on: `{"command":"select","tabId":42}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Action {
    /// Activate the tab and focus its window.
    Select {
        #[serde(rename = "tabId")]
        tab_id: i64,
    },
}

impl Action {
    /// Serialize to a frame payload (without length header).
    pub fn to_payload(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

/// Framed writer for actions. Each action is written as one frame and
/// flushed before `send` returns.
pub struct ActionSink<W> {
    frames: FramedWrite<W, FrameCodec>,
}

impl<W: AsyncWrite + Unpin> ActionSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            frames: FramedWrite::new(writer, FrameCodec::new()),
        }
    }

    pub async fn send(&mut self, action: Action) -> Result<()> {
        let payload = action.to_payload()?;
        self.frames.send(payload).await
    }

    pub fn into_inner(self) -> W {
        self.frames.into_inner()
    }
}
