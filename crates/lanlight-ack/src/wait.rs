//! Blocking ack wait.
//!
//! ```text
//! loop:
//!   ctx.check()            -> stop with Cancelled
//!   set_read_deadline()    -> stop with Deadline on error
//!   read()                 -> timeout: next iteration; other error: stop with Transport
//!   parse_response()       -> stop with Decode on error
//!   ack from `source`?     -> mark sequence, return Ok once none are pending
//! ```

use lanlight_protocol::{parse_response, ParseError};
use tracing::{debug, trace};

use crate::cancel::Cancellation;
use crate::config::WaitConfig;
use crate::conn::{is_timeout, DatagramConn};
use crate::error::{AckWaitCause, WaitForAcksError};
use crate::pending::{AckMark, PendingAcks};

/// Block until `conn` has delivered an acknowledgement from `source` for
/// every sequence in `sequences`, or until `ctx` is cancelled.
///
/// Uses the process-wide [`WaitConfig::global`]. Every datagram read is
/// consumed, matching or not, so nothing else may read from `conn` while
/// this runs. An empty `sequences` returns `Ok(())` without reading.
pub fn wait_for_acks<C, T>(
    ctx: &C,
    conn: &T,
    source: u32,
    sequences: &[u8],
) -> Result<(), WaitForAcksError>
where
    C: Cancellation + ?Sized,
    T: DatagramConn + ?Sized,
{
    wait_for_acks_with(WaitConfig::global(), ctx, conn, source, sequences)
}

/// [`wait_for_acks`] with an explicit config.
pub fn wait_for_acks_with<C, T>(
    config: &WaitConfig,
    ctx: &C,
    conn: &T,
    source: u32,
    sequences: &[u8],
) -> Result<(), WaitForAcksError>
where
    C: Cancellation + ?Sized,
    T: DatagramConn + ?Sized,
{
    let mut acks = PendingAcks::new(sequences);

    if let Err(reason) = ctx.check() {
        return Err(stop(&acks, reason));
    }
    if acks.is_complete() {
        return Ok(());
    }

    debug!(source, total = acks.total(), pending = ?acks.remaining(), "waiting for acks");

    let mut buf = vec![0u8; config.buffer_len()];
    loop {
        if let Err(reason) = ctx.check() {
            return Err(stop(&acks, reason));
        }

        if let Err(e) = conn.set_read_deadline(config.read_deadline()) {
            return Err(stop(&acks, AckWaitCause::Deadline(e)));
        }

        let len = match conn.read(&mut buf) {
            Ok(len) => len,
            Err(ref e) if is_timeout(e) => {
                trace!(source, "read timed out, polling cancellation");
                continue;
            }
            Err(e) => return Err(stop(&acks, AckWaitCause::Transport(e))),
        };

        match consume(&mut acks, source, &buf[..len]) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => return Err(stop(&acks, e)),
        }
    }
}

/// Decode one datagram and apply it to `acks`. Returns true once nothing is pending.
pub(crate) fn consume(
    acks: &mut PendingAcks,
    source: u32,
    datagram: &[u8],
) -> Result<bool, ParseError> {
    let resp = parse_response(datagram)?;

    if !resp.is_ack_for(source) {
        trace!(
            source = resp.source,
            kind = ?resp.kind,
            sequence = resp.sequence,
            "dropping unrelated response"
        );
        return Ok(false);
    }

    match acks.mark(resp.sequence) {
        AckMark::Complete => {
            debug!(source, total = acks.total(), "all acks received");
            Ok(true)
        }
        AckMark::Accepted => {
            debug!(
                source,
                sequence = resp.sequence,
                received = acks.received(),
                total = acks.total(),
                "ack received"
            );
            Ok(false)
        }
        AckMark::Ignored => {
            trace!(source, sequence = resp.sequence, "dropping duplicate or unexpected ack");
            Ok(false)
        }
    }
}

pub(crate) fn stop(acks: &PendingAcks, cause: impl Into<AckWaitCause>) -> WaitForAcksError {
    let err = acks.fail(cause);
    debug!(
        received = err.received,
        total = err.total,
        cause = %err.cause,
        "ack wait stopped"
    );
    err
}
