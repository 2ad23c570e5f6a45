//! # CRSF Stream Framer
//!
//! Accumulates inbound serial bytes and cuts them into CRSF frames.
//!
//! The framer trusts the length byte at offset 1 of its buffer. A length
//! that cannot describe a legal frame (total size outside 4..=64) means the
//! stream is out of step, and the whole buffer is dropped; the next bytes
//! to arrive start a fresh frame. There is no scan for the sync byte.

use bytes::{Bytes, BytesMut};

use super::decoder::validate_frame;
use super::protocol::{Frame, CRSF_MAX_FRAME_SIZE, CRSF_MIN_FRAME_SIZE};

/// Initial receive buffer capacity
const RX_BUFFER_CAPACITY: usize = 4 * CRSF_MAX_FRAME_SIZE;

/// Outcome of one framing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramerEvent {
    /// A complete frame whose CRC checked out
    Frame(Frame),

    /// A complete frame whose CRC did not match; the raw bytes are dropped
    ChecksumMismatch(Bytes),

    /// The length byte described an impossible frame; the buffer was cleared
    Desync {
        /// Frame size implied by the length byte (length + 2)
        declared_len: usize,
        /// Number of buffered bytes thrown away
        discarded: usize,
    },
}

/// Stateful CRSF framer over a rolling receive buffer
///
/// # Examples
///
/// ```
/// use crsf_link::crsf::encoder::encode_rc_frame;
/// use crsf_link::crsf::framer::{FramerEvent, StreamFramer};
///
/// let frame = encode_rc_frame(&[0u8; 22]);
/// let mut framer = StreamFramer::new();
///
/// framer.push(&frame[..10]);
/// assert!(framer.next_event().is_none());
///
/// framer.push(&frame[10..]);
/// assert!(matches!(framer.next_event(), Some(FramerEvent::Frame(_))));
/// assert_eq!(framer.buffered(), 0);
/// ```
#[derive(Debug)]
pub struct StreamFramer {
    buffer: BytesMut,
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(RX_BUFFER_CAPACITY),
        }
    }

    /// Append freshly read bytes to the receive buffer
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Number of bytes waiting in the receive buffer
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Run one step of the framing state machine
    ///
    /// Call repeatedly after every [`push`](Self::push) until it returns
    /// `None`, which means more bytes are needed.
    pub fn next_event(&mut self) -> Option<FramerEvent> {
        if self.buffer.len() <= 2 {
            return None;
        }

        let expected_len = self.buffer[1] as usize + 2;
        if !(CRSF_MIN_FRAME_SIZE..=CRSF_MAX_FRAME_SIZE).contains(&expected_len) {
            let discarded = self.buffer.len();
            self.buffer.clear();
            return Some(FramerEvent::Desync {
                declared_len: expected_len,
                discarded,
            });
        }

        if self.buffer.len() < expected_len {
            return None;
        }

        let candidate = self.buffer.split_to(expected_len).freeze();
        if !validate_frame(&candidate) {
            return Some(FramerEvent::ChecksumMismatch(candidate));
        }

        Some(FramerEvent::Frame(Frame::from_checked(candidate)))
    }
}
