//! Lanlight ack waiting: block until a device has acknowledged a set of requests.
//!
//! Requests sent with `ack_required` are answered by an `Acknowledgement`
//! carrying the request's sequence number and the client's source. This crate
//! waits for those acknowledgements over a datagram endpoint:
//! - Bounded reads (100 ms by default) so cancellation is seen promptly
//! - Partial progress reported on failure (`R of T ack(s) received`)
//! - Duplicate and foreign acknowledgements ignored
//! - Blocking ([`wait_for_acks`]) and tokio ([`wait_for_acks_async`]) loops
//!
//! The wait drains every datagram it reads. Only one wait may run per
//! endpoint, and nothing else may read from it while the wait is in flight.

pub mod cancel;
pub mod config;
pub mod conn;
pub mod error;
pub mod pending;
pub mod sequence_set;
pub mod wait;
pub mod wait_async;

pub use cancel::{Cancellation, Cancelled, WaitContext};
pub use config::{
    read_deadline, WaitConfig, DEFAULT_READ_TIMEOUT, DEFAULT_RESPONSE_BUFFER_SIZE, MAX_READ_TIMEOUT,
};
pub use conn::{is_timeout, DatagramConn};
pub use error::{AckWaitCause, WaitForAcksError};
pub use pending::{AckMark, PendingAcks};
pub use sequence_set::SequenceSet;
pub use wait::{wait_for_acks, wait_for_acks_with};
pub use wait_async::{wait_for_acks_async, wait_for_acks_async_with};
