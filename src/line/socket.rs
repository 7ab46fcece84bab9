//! Line endpoint over the kernel socket transport.

use std::os::fd::{AsRawFd, RawFd};

use super::LineChannel;
use crate::codec::LineCodec;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::transport::{Readiness, Socket};

/// Line-buffered endpoint backed by a real socket.
///
/// Consumers poll opportunistically, so an empty `readline` is never
/// logged.
#[derive(Debug)]
pub struct SocketLineEndpoint {
    inner: Endpoint<String, LineCodec>,
}

impl SocketLineEndpoint {
    pub(crate) fn new(socket: Socket, name: String) -> Self {
        Self {
            inner: Endpoint::new(socket, name, true),
        }
    }

    /// Number of sends that failed because of backpressure.
    pub fn failure_count(&self) -> u64 {
        self.inner.failure_count()
    }

    /// Current read/write readiness, without waiting.
    pub fn readiness(&self) -> Result<Readiness> {
        self.inner.readiness()
    }
}

impl LineChannel for SocketLineEndpoint {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn send(&mut self, line: &str) -> Result<bool> {
        self.inner.send(&line.to_owned())
    }

    fn readline(&mut self) -> Result<Option<String>> {
        self.inner.recv()
    }

    fn fileno(&self) -> Option<RawFd> {
        Some(self.inner.fileno())
    }
}

impl AsRawFd for SocketLineEndpoint {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;

    fn pair(name: &str) -> (SocketLineEndpoint, SocketLineEndpoint) {
        let (a, b) = Socket::pair().unwrap();
        (
            SocketLineEndpoint::new(a, format!("{}[0]", name)),
            SocketLineEndpoint::new(b, format!("{}[1]", name)),
        )
    }

    #[test]
    fn test_ping_then_no_data() {
        let (mut a, mut b) = pair("x");

        assert!(a.send("ping").unwrap());
        assert_eq!(b.readline().unwrap().as_deref(), Some("ping"));
        assert_eq!(b.readline().unwrap(), None);
    }

    #[test]
    fn test_recv_always_true() {
        let (_a, mut b) = pair("r");
        assert!(b.recv());
        assert_eq!(b.readline().unwrap(), None);
        assert!(b.recv());
    }

    #[test]
    fn test_record_terminators_preserved() {
        let (mut a, mut b) = pair("nl");
        a.send("rudder.angle=3.5\n").unwrap();
        assert_eq!(b.readline().unwrap().as_deref(), Some("rudder.angle=3.5\n"));
    }

    #[test]
    fn test_backpressure_counts_failures() {
        let (mut a, _b) = pair("bp");
        let line = "x".repeat(200);

        while a.send(&line).unwrap() {}
        assert_eq!(a.failure_count(), 1);
        assert!(!a.send(&line).unwrap());
        assert_eq!(a.failure_count(), 2);
        assert!(!a.readiness().unwrap().is_writable());
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let (mut raw, b) = Socket::pair().unwrap();
        let mut b = SocketLineEndpoint::new(b, "utf8[1]".to_string());

        raw.try_send(&[0xff, 0xfe]).unwrap();
        assert!(matches!(b.readline(), Err(PipeError::InvalidRecord(_))));
    }

    #[test]
    fn test_fileno_exposed() {
        let (a, _b) = pair("fd");
        assert_eq!(a.fileno(), Some(a.as_raw_fd()));
    }
}
