//! Fixed-size header shared by every datagram.
//!
//! ```text
//! [0..2]    Size of the whole datagram (u16 LE)
//! [2..4]    Protocol (low 12 bits) | addressable (bit 12) | tagged (bit 13) | origin (bits 14-15)
//! [4..8]    Source (u32 LE), chosen by the client, echoed by the device
//! [8..16]   Target (u64 LE), 6-byte MAC followed by two zero bytes
//! [16..22]  Reserved
//! [22]      Flags: res_required (bit 0), ack_required (bit 1)
//! [23]      Sequence (u8)
//! [24..32]  Reserved
//! [32..34]  Message type (u16 LE)
//! [34..36]  Reserved
//! [36..]    Payload
//! ```

use crate::message::MessageKind;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 36;

/// Protocol number carried in the low 12 bits of bytes 2..4.
pub const PROTOCOL_NUMBER: u16 = 1024;

/// Device should reply with a state response.
pub const FLAG_RES_REQUIRED: u8 = 1 << 0;

/// Device should reply with an acknowledgement.
pub const FLAG_ACK_REQUIRED: u8 = 1 << 1;

const ADDRESSABLE_BIT: u16 = 1 << 12;
const TAGGED_BIT: u16 = 1 << 13;

/// Header fields a client sets or reads. Reserved bytes are always zero on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub source: u32,
    pub target: u64,
    /// Broadcast to all devices (target must be zero).
    pub tagged: bool,
    pub ack_required: bool,
    pub res_required: bool,
    pub sequence: u8,
    pub kind: MessageKind,
}

impl Header {
    /// Header for an acknowledgement of `sequence`, as a device would send it.
    pub fn ack(source: u32, target: u64, sequence: u8) -> Self {
        Self {
            source,
            target,
            tagged: false,
            ack_required: false,
            res_required: false,
            sequence,
            kind: MessageKind::Acknowledgement,
        }
    }

    /// Serialize the header into the first [`HEADER_SIZE`] bytes of `buf`.
    /// The size field covers the header plus `payload_len`.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`HEADER_SIZE`] or the total exceeds `u16::MAX`.
    pub fn write_to(&self, buf: &mut [u8], payload_len: usize) {
        assert!(buf.len() >= HEADER_SIZE);
        assert!(HEADER_SIZE + payload_len <= u16::MAX as usize);
        let size = (HEADER_SIZE + payload_len) as u16;

        let mut protocol = PROTOCOL_NUMBER | ADDRESSABLE_BIT;
        if self.tagged {
            protocol |= TAGGED_BIT;
        }
        let mut flags = 0u8;
        if self.res_required {
            flags |= FLAG_RES_REQUIRED;
        }
        if self.ack_required {
            flags |= FLAG_ACK_REQUIRED;
        }

        buf[..HEADER_SIZE].fill(0);
        buf[0..2].copy_from_slice(&size.to_le_bytes());
        buf[2..4].copy_from_slice(&protocol.to_le_bytes());
        buf[4..8].copy_from_slice(&self.source.to_le_bytes());
        buf[8..16].copy_from_slice(&self.target.to_le_bytes());
        buf[22] = flags;
        buf[23] = self.sequence;
        buf[32..34].copy_from_slice(&u16::from(self.kind).to_le_bytes());
    }

    /// Encode a full datagram: header followed by `payload`.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE + payload.len()];
        self.write_to(&mut buf, payload.len());
        buf[HEADER_SIZE..].copy_from_slice(payload);
        buf
    }

    /// Read header fields from `buf`. Caller guarantees `buf.len() >= HEADER_SIZE`.
    pub(crate) fn read_from(buf: &[u8]) -> Self {
        let protocol = u16::from_le_bytes([buf[2], buf[3]]);
        let flags = buf[22];
        Self {
            source: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            target: u64::from_le_bytes([
                buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
            ]),
            tagged: protocol & TAGGED_BIT != 0,
            ack_required: flags & FLAG_ACK_REQUIRED != 0,
            res_required: flags & FLAG_RES_REQUIRED != 0,
            sequence: buf[23],
            kind: MessageKind::from(u16::from_le_bytes([buf[32], buf[33]])),
        }
    }
}
