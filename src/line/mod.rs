//! Line-buffered endpoints for textual command/record traffic.
//!
//! One message is one text record. Two transports implement the same
//! [`LineChannel`] contract:
//!
//! - [`SocketLineEndpoint`] - real kernel socket, usable across processes
//! - [`QueueLineEndpoint`] - bounded in-process queues, no OS resources
//!
//! [`LineEndpoint`] is the tagged variant handed out by
//! [`line_pipe`](crate::pipe::line_pipe); which variant is built is decided
//! by configuration, never by inspecting the endpoint at runtime.
//!
//! # Example
//!
//! ```
//! use nbpipe::line::LineChannel;
//! use nbpipe::pipe::line_pipe;
//!
//! let (mut a, mut b) = line_pipe("nmea", false).unwrap();
//! a.send("$GPRMC,...").unwrap();
//! assert_eq!(b.readline().unwrap().as_deref(), Some("$GPRMC,..."));
//! assert_eq!(b.readline().unwrap(), None);
//! ```

mod queue;
mod socket;

use std::os::fd::RawFd;

use crate::config::TransportKind;
use crate::error::Result;

pub(crate) use queue::LineQueue;
pub use queue::{QueueLineEndpoint, DEFAULT_QUEUE_CAPACITY};
pub use socket::SocketLineEndpoint;

/// Non-blocking line-oriented channel.
pub trait LineChannel {
    /// Diagnostic name, e.g. `"nmea[1]"`.
    fn name(&self) -> &str;

    /// Send one record. `Ok(false)` means the peer cannot take it right now.
    fn send(&mut self, line: &str) -> Result<bool>;

    /// Next pending record, or `Ok(None)` when nothing is pending.
    fn readline(&mut self) -> Result<Option<String>>;

    /// Always true: readiness is checked per record by
    /// [`readline`](Self::readline), so a caller polling `recv` is never
    /// told the channel is dead.
    fn recv(&mut self) -> bool {
        true
    }

    /// No-op.
    fn flush(&mut self) {}

    /// Descriptor to multiplex on, `None` when the transport has none and
    /// the caller must poll [`readline`](Self::readline) directly.
    fn fileno(&self) -> Option<RawFd>;

    /// Every record pending right now, oldest first.
    fn read_available(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.readline()? {
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Line endpoint over either transport.
#[derive(Debug)]
pub enum LineEndpoint {
    /// Kernel socket transport.
    Socket(SocketLineEndpoint),
    /// In-process queue transport.
    Queue(QueueLineEndpoint),
}

impl LineEndpoint {
    /// Which transport this endpoint runs on.
    pub fn transport(&self) -> TransportKind {
        match self {
            LineEndpoint::Socket(_) => TransportKind::Socket,
            LineEndpoint::Queue(_) => TransportKind::Queue,
        }
    }
}

impl LineChannel for LineEndpoint {
    fn name(&self) -> &str {
        match self {
            LineEndpoint::Socket(e) => e.name(),
            LineEndpoint::Queue(e) => e.name(),
        }
    }

    fn send(&mut self, line: &str) -> Result<bool> {
        match self {
            LineEndpoint::Socket(e) => e.send(line),
            LineEndpoint::Queue(e) => e.send(line),
        }
    }

    fn readline(&mut self) -> Result<Option<String>> {
        match self {
            LineEndpoint::Socket(e) => e.readline(),
            LineEndpoint::Queue(e) => e.readline(),
        }
    }

    fn fileno(&self) -> Option<RawFd> {
        match self {
            LineEndpoint::Socket(e) => e.fileno(),
            LineEndpoint::Queue(e) => e.fileno(),
        }
    }
}

impl From<SocketLineEndpoint> for LineEndpoint {
    fn from(endpoint: SocketLineEndpoint) -> Self {
        LineEndpoint::Socket(endpoint)
    }
}

impl From<QueueLineEndpoint> for LineEndpoint {
    fn from(endpoint: QueueLineEndpoint) -> Self {
        LineEndpoint::Queue(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::line_pipe;

    #[test]
    fn test_variant_follows_transport_choice() {
        let (a, b) = line_pipe("real", true).unwrap();
        assert_eq!(a.transport(), TransportKind::Socket);
        assert_eq!(b.transport(), TransportKind::Socket);
        assert!(a.fileno().is_some());

        let (c, d) = line_pipe("emulated", false).unwrap();
        assert_eq!(c.transport(), TransportKind::Queue);
        assert_eq!(d.transport(), TransportKind::Queue);
        assert!(c.fileno().is_none());
    }

    #[test]
    fn test_same_contract_on_both_transports() {
        for use_real in [true, false] {
            let (mut a, mut b) = line_pipe("both", use_real).unwrap();

            assert!(a.recv());
            assert!(b.recv());
            assert_eq!(b.readline().unwrap(), None);

            assert!(a.send("one").unwrap());
            assert!(a.send("two").unwrap());
            a.flush();
            assert!(b.send("back").unwrap());

            assert_eq!(b.read_available().unwrap(), vec!["one", "two"]);
            assert_eq!(a.readline().unwrap().as_deref(), Some("back"));
            assert!(b.read_available().unwrap().is_empty());
        }
    }

    #[test]
    fn test_names_on_both_transports() {
        for use_real in [true, false] {
            let (a, b) = line_pipe("gps", use_real).unwrap();
            assert_eq!(a.name(), "gps[0]");
            assert_eq!(b.name(), "gps[1]");
        }
    }
}
