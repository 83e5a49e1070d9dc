use std::io;

use lanlight_protocol::ParseError;
use thiserror::Error;

use crate::cancel::Cancelled;

/// What ended a wait before every acknowledgement arrived.
#[derive(Debug, Error)]
pub enum AckWaitCause {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("arming read deadline: {0}")]
    Deadline(#[source] io::Error),
    #[error("reading response: {0}")]
    Transport(#[source] io::Error),
    #[error("decoding response: {0}")]
    Decode(#[from] ParseError),
}

/// Failed wait with the progress made before it stopped.
///
/// `total` counts distinct sequence numbers; `received` never exceeds it.
#[derive(Debug, Error)]
#[error("wait for acks: {received} of {total} ack(s) received: {cause}")]
pub struct WaitForAcksError {
    pub received: usize,
    pub total: usize,
    #[source]
    pub cause: AckWaitCause,
}

impl WaitForAcksError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, AckWaitCause::Cancelled(_))
    }

    /// Acknowledgements still outstanding when the wait stopped.
    pub fn missing(&self) -> usize {
        self.total - self.received
    }
}
