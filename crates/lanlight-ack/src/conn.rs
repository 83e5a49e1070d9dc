//! Datagram endpoint the wait loop reads from.

use std::io;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shortest timeout handed to the OS. std rejects a zero read timeout and
/// socket2 treats it as "no timeout", so a passed deadline is rounded up.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// Readable datagram endpoint with a per-read deadline.
///
/// Implementations must report an expired deadline as an error that
/// [`is_timeout`] recognises, and `read` must block until data arrives or
/// the deadline passes. A non-blocking endpoint that returns `WouldBlock`
/// at once turns the wait loop into a busy spin. The socket impls below
/// put the socket back into blocking mode when arming the deadline.
pub trait DatagramConn {
    /// Best-effort: bound the next [`DatagramConn::read`] to finish by `deadline`.
    fn set_read_deadline(&self, deadline: Instant) -> io::Result<()>;

    /// Read one datagram into `buf`, returning its length.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// True if `err` is an expired read deadline rather than a real failure.
/// Unix reports `WouldBlock`, Windows reports `TimedOut`.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn timeout_until(deadline: Instant) -> Duration {
    deadline
        .saturating_duration_since(Instant::now())
        .max(MIN_READ_TIMEOUT)
}

/// Expects a connected socket; datagrams from any peer are read otherwise.
impl DatagramConn for UdpSocket {
    fn set_read_deadline(&self, deadline: Instant) -> io::Result<()> {
        self.set_nonblocking(false)?;
        self.set_read_timeout(Some(timeout_until(deadline)))
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }
}

impl DatagramConn for socket2::Socket {
    fn set_read_deadline(&self, deadline: Instant) -> io::Result<()> {
        self.set_nonblocking(false)?;
        self.set_read_timeout(Some(timeout_until(deadline)))
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader: &socket2::Socket = self;
        io::Read::read(&mut reader, buf)
    }
}

impl<T: DatagramConn + ?Sized> DatagramConn for Arc<T> {
    fn set_read_deadline(&self, deadline: Instant) -> io::Result<()> {
        (**self).set_read_deadline(deadline)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
}

impl<T: DatagramConn + ?Sized> DatagramConn for &T {
    fn set_read_deadline(&self, deadline: Instant) -> io::Result<()> {
        (**self).set_read_deadline(deadline)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
}
