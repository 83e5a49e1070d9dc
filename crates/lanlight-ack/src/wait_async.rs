//! Ack wait on a tokio socket.
//!
//! Same loop as [`crate::wait`]; the read deadline is a `tokio::time::timeout`
//! around `recv`, and an elapsed timeout is the polling tick.

use tokio::net::UdpSocket;
use tokio::time;
use tracing::{debug, trace};

use crate::cancel::Cancellation;
use crate::config::WaitConfig;
use crate::conn::is_timeout;
use crate::error::{AckWaitCause, WaitForAcksError};
use crate::pending::PendingAcks;
use crate::wait::{consume, stop};

/// Async [`crate::wait_for_acks`]. `socket` should be connected to the device.
pub async fn wait_for_acks_async<C>(
    ctx: &C,
    socket: &UdpSocket,
    source: u32,
    sequences: &[u8],
) -> Result<(), WaitForAcksError>
where
    C: Cancellation + ?Sized,
{
    wait_for_acks_async_with(WaitConfig::global(), ctx, socket, source, sequences).await
}

/// [`wait_for_acks_async`] with an explicit config.
pub async fn wait_for_acks_async_with<C>(
    config: &WaitConfig,
    ctx: &C,
    socket: &UdpSocket,
    source: u32,
    sequences: &[u8],
) -> Result<(), WaitForAcksError>
where
    C: Cancellation + ?Sized,
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

        let read = time::timeout(config.bounded_read_timeout(), socket.recv(&mut buf));
        let len = match read.await {
            Ok(Ok(len)) => len,
            Ok(Err(ref e)) if is_timeout(e) => continue,
            Ok(Err(e)) => return Err(stop(&acks, AckWaitCause::Transport(e))),
            Err(_elapsed) => {
                trace!(source, "read timed out, polling cancellation");
                continue;
            }
        };

        match consume(&mut acks, source, &buf[..len]) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => return Err(stop(&acks, e)),
        }
    }
}
