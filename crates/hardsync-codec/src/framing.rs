//! Stream reassembly.
//!
//! Transports deliver bytes in arbitrary chunks. A [`FrameBuffer`]
//! accumulates them and hands out one complete message at a time, using the
//! active encoding's [`Encoding::frame_length`] to find message boundaries.

use crate::binary::{HEADER_LEN, MAX_PAYLOAD_LEN};
use crate::{CodecError, CodecResult, Encoding};
use bytes::BytesMut;

/// Largest message a [`FrameBuffer`] accepts by default.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN;

/// Accumulates received bytes until a whole message is available.
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: BytesMut,
    max_frame_len: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a buffer accepting messages up to [`MAX_FRAME_LEN`].
    pub fn new() -> Self {
        Self::with_max_frame_len(MAX_FRAME_LEN)
    }

    /// Create a buffer with a custom message size limit.
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        FrameBuffer {
            buffer: BytesMut::with_capacity(256),
            max_frame_len,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete message out of the buffer.
    ///
    /// Returns `Ok(None)` if more data is needed. A message exceeding the
    /// size limit is an error and the buffer is cleared.
    pub fn next_frame(&mut self, encoding: &dyn Encoding) -> CodecResult<Option<Vec<u8>>> {
        match encoding.frame_length(&self.buffer) {
            Some(len) if len > self.max_frame_len => self.overflow(len),
            Some(len) if self.buffer.len() >= len => Ok(Some(self.buffer.split_to(len).to_vec())),
            Some(_) => Ok(None),
            None if self.buffer.len() > self.max_frame_len => self.overflow(self.buffer.len()),
            None => Ok(None),
        }
    }

    fn overflow(&mut self, actual: usize) -> CodecResult<Option<Vec<u8>>> {
        log::warn!(
            "discarding {} buffered byte(s): frame exceeds {} bytes",
            self.buffer.len(),
            self.max_frame_len
        );
        self.buffer.clear();
        Err(CodecError::FrameTooLong {
            max: self.max_frame_len,
            actual,
        })
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
