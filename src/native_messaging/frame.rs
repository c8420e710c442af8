use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Error, ProtocolError};

/// Largest payload accepted in either direction (10 MiB).
pub const MAX_FRAME_SIZE: usize = 10 * 1024 * 1024;

const HEADER_LEN: usize = 4;

/// Codec for native-messaging frames: a `u32` little-endian length followed
/// by that many payload bytes.
///
/// A header announcing more than `max_len` bytes is rejected before any
/// payload is buffered.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_len: usize,
}

impl FrameCodec {
    pub const fn new() -> Self {
        Self {
            max_len: MAX_FRAME_SIZE,
        }
    }

    #[cfg(test)]
    pub const fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&src[..HEADER_LEN]);
        let len = u32::from_le_bytes(header) as usize;

        if len > self.max_len {
            return Err(ProtocolError::OversizedFrame {
                len,
                max: self.max_len,
            }
            .into());
        }

        if src.len() < HEADER_LEN + len {
            src.reserve(HEADER_LEN + len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        Ok(Some(src.split_to(len)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(ProtocolError::StreamClosed.into()),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let len = payload.len();
        let header = u32::try_from(len)
            .ok()
            .filter(|_| len <= self.max_len)
            .ok_or(ProtocolError::OversizedFrame {
                len,
                max: self.max_len,
            })?;

        dst.reserve(HEADER_LEN + len);
        dst.put_u32_le(header);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
