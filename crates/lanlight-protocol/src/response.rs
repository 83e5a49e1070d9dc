use thiserror::Error;

use crate::header::{Header, HEADER_SIZE};
use crate::message::MessageKind;

/// Errors from [`parse_response`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response too short: {len} bytes, header needs {}", HEADER_SIZE)]
    TooShort { len: usize },
    #[error("response size mismatch: header declares {declared} bytes, datagram has {actual}")]
    SizeMismatch { declared: usize, actual: usize },
}

/// A decoded datagram. Borrows the read buffer, so it lives only until the next read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// Declared datagram size, header included.
    pub size: u16,
    pub source: u32,
    pub target: u64,
    pub sequence: u8,
    pub kind: MessageKind,
    pub payload: &'a [u8],
}

impl Response<'_> {
    /// True if this is an acknowledgement addressed to `source`.
    pub fn is_ack_for(&self, source: u32) -> bool {
        self.source == source && self.kind.is_ack()
    }
}

/// Decode the header of a received datagram.
///
/// The declared size must match the datagram length exactly; the payload is
/// returned uninterpreted.
pub fn parse_response(buf: &[u8]) -> Result<Response<'_>, ParseError> {
    if buf.len() < HEADER_SIZE {
        return Err(ParseError::TooShort { len: buf.len() });
    }
    let size = u16::from_le_bytes([buf[0], buf[1]]);
    if usize::from(size) != buf.len() {
        return Err(ParseError::SizeMismatch {
            declared: usize::from(size),
            actual: buf.len(),
        });
    }

    let header = Header::read_from(buf);
    Ok(Response {
        size,
        source: header.source,
        target: header.target,
        sequence: header.sequence,
        kind: header.kind,
        payload: &buf[HEADER_SIZE..],
    })
}
