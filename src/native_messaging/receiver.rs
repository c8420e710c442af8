use futures::StreamExt;
use tokio::{io::AsyncRead, sync::mpsc};
use tokio_util::codec::FramedRead;

use super::{event::Event, frame::FrameCodec};
use crate::error::{Error, ProtocolError, Result};

/// Spawn the event receiver on `input` and return the queue it feeds.
///
/// The task stops for good on end of stream, a read error or an oversized
/// frame. The returned receiver then yields `None`.
pub fn spawn_event_receiver<R>(input: R) -> mpsc::Receiver<Event>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        match receive_events(input, tx).await {
            Ok(()) => tracing::debug!("Event queue closed, stopping event receiver"),
            Err(Error::Protocol(ProtocolError::StreamClosed)) => {
                tracing::info!("Input stream closed");
            }
            Err(e) => tracing::error!("Event receiver stopped: {e}"),
        }
    });

    rx
}

/// Read frames from `input` and forward decoded events to `events`.
///
/// Frames that fail to decode are logged and skipped. Returns `Ok(())` only
/// when the receiving side of `events` has gone away; every other exit is
/// the fatal error that ended the stream.
pub async fn receive_events<R>(input: R, events: mpsc::Sender<Event>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(input, FrameCodec::new());

    loop {
        let payload = match frames.next().await {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => return Err(e),
            None => return Err(ProtocolError::StreamClosed.into()),
        };

        let event = match Event::decode(&payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Skipping frame ({} bytes): {e}", payload.len());
                continue;
            }
        };

        tracing::info!("Received event: {}", event.kind());
        if events.send(event).await.is_err() {
            return Ok(());
        }
    }
}
