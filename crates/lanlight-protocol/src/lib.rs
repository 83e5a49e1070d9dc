//! LAN device-control protocol: header layout and response decoding.
//!
//! Only the parts a client needs to classify incoming datagrams live here:
//! the fixed 36-byte header, the message type discriminator, and a decoder
//! that hands back the header fields plus the raw payload slice. Payloads
//! are never interpreted.

pub mod header;
pub mod message;
pub mod response;

pub use header::{Header, FLAG_ACK_REQUIRED, FLAG_RES_REQUIRED, HEADER_SIZE, PROTOCOL_NUMBER};
pub use message::MessageKind;
pub use response::{parse_response, ParseError, Response};
