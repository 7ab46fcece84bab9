//! Generic non-blocking endpoint.
//!
//! An [`Endpoint`] is one side of a duplex pipe created by
//! [`pipe`](crate::pipe::pipe). Every operation returns immediately:
//!
//! - `send` returns `Ok(false)` when the peer's buffer is full
//! - `recv` returns `Ok(None)` when nothing is pending
//! - only a broken channel or an undecodable message is an `Err`
//!
//! Failed sends are counted per endpoint and reported through `tracing`
//! at counts 1, 10, 100, ... so a stalled peer cannot flood the log.
//!
//! # Example
//!
//! ```
//! use nbpipe::pipe::pipe;
//!
//! let (mut a, mut b) = pipe::<(String, f64)>("sensors").unwrap();
//!
//! assert!(a.send(&("heading".to_string(), 182.5)).unwrap());
//! assert_eq!(b.recv().unwrap(), Some(("heading".to_string(), 182.5)));
//! assert_eq!(b.recv().unwrap(), None);
//! ```

use std::marker::PhantomData;
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

use crate::backpressure::SendFailures;
use crate::codec::{Codec, MsgPackCodec};
use crate::error::Result;
use crate::transport::{Interest, Readiness, Socket};

/// One side of a real-transport duplex pipe.
///
/// `T` is the message type and `C` the codec turning it into a single
/// transport message.
#[derive(Debug)]
pub struct Endpoint<T, C = MsgPackCodec> {
    name: String,
    socket: Socket,
    recv_fail_ok: bool,
    failures: SendFailures,
    _marker: PhantomData<fn(T, C) -> T>,
}

impl<T, C> Endpoint<T, C>
where
    C: Codec<T>,
{
    pub(crate) fn new(socket: Socket, name: String, recv_fail_ok: bool) -> Self {
        Self {
            name,
            socket,
            recv_fail_ok,
            failures: SendFailures::new(),
            _marker: PhantomData,
        }
    }

    /// Diagnostic name, e.g. `"servo[0]"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an empty `recv` is an expected outcome for this endpoint.
    pub fn recv_fail_ok(&self) -> bool {
        self.recv_fail_ok
    }

    /// Number of sends that failed because of backpressure.
    pub fn failure_count(&self) -> u64 {
        self.failures.count()
    }

    /// Current read/write readiness, without waiting.
    pub fn readiness(&self) -> Result<Readiness> {
        self.socket.readiness(None)
    }

    /// Receive the next message if one is pending.
    ///
    /// Never waits. When nothing is pending and the endpoint was created
    /// with `recv_fail_ok = false`, a warning is logged.
    pub fn recv(&mut self) -> Result<Option<T>> {
        let ready = self.socket.readiness_for(Interest::Readable, None)?;
        self.recv_ready(ready)
    }

    /// Receive the next message, waiting at most `timeout` for one to arrive.
    ///
    /// The wait happens in `poll(2)`; use [`recv`](Self::recv) or an external
    /// [`Poller`](crate::transport::Poller) when the caller must never block.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<T>> {
        let ready = self
            .socket
            .readiness_for(Interest::Readable, Some(timeout))?;
        self.recv_ready(ready)
    }

    fn recv_ready(&mut self, ready: Readiness) -> Result<Option<T>> {
        if ready.is_readable() || ready.is_hangup() || ready.is_error() {
            if let Some(bytes) = self.socket.try_recv()? {
                return C::decode(bytes).map(Some);
            }
        }

        if !self.recv_fail_ok {
            tracing::warn!(endpoint = %self.name, "pipe blocked on recv");
        }
        Ok(None)
    }

    /// Send a message if the peer can take it right now.
    ///
    /// Returns `Ok(false)` without retrying when the channel is full. A
    /// warning is logged on the 1st, 10th, 100th, ... failure.
    pub fn send(&mut self, value: &T) -> Result<bool> {
        let payload = C::encode(value)?;

        // The MSG_DONTWAIT send is the write-readiness check: POLLOUT on unix
        // sockets already drops once a quarter of the send buffer is in use.
        if self.socket.try_send(&payload)? {
            return Ok(true);
        }

        if let Some(count) = self.failures.record() {
            tracing::warn!(endpoint = %self.name, count, "pipe full, cannot send");
        }
        Ok(false)
    }

    /// No-op; every message is handed to the kernel as soon as it is sent.
    #[inline]
    pub fn flush(&mut self) {}

    /// Raw descriptor, for callers multiplexing several endpoints.
    #[inline]
    pub fn fileno(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    /// Close this end. The peer sees a hang-up.
    pub fn close(self) {
        tracing::debug!(endpoint = %self.name, "closing pipe endpoint");
    }
}

impl<T, C> AsRawFd for Endpoint<T, C> {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;
    use crate::pipe::{pipe, pipe_with};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    enum Control {
        Set { name: String, value: f64 },
        Watch(String),
        Shutdown,
    }

    #[test]
    fn test_send_recv_structured() {
        let (mut a, mut b) = pipe::<Control>("ctl").unwrap();

        let messages = vec![
            Control::Set {
                name: "ap.heading_command".to_string(),
                value: 90.0,
            },
            Control::Watch("imu.heading".to_string()),
            Control::Shutdown,
        ];

        for m in &messages {
            assert!(a.send(m).unwrap());
        }
        for m in &messages {
            assert_eq!(b.recv().unwrap().as_ref(), Some(m));
        }
        assert_eq!(b.recv().unwrap(), None);
    }

    #[test]
    fn test_names() {
        let (a, b) = pipe::<u32>("servo").unwrap();
        assert_eq!(a.name(), "servo[0]");
        assert_eq!(b.name(), "servo[1]");
    }

    #[test]
    fn test_recv_empty_returns_none() {
        let (_a, mut b) = pipe::<u32>("empty").unwrap();
        assert_eq!(b.recv().unwrap(), None);

        // Logging instead of failing when data was expected
        let (_c, mut d) = pipe_with::<u32>("strict", false).unwrap();
        assert!(!d.recv_fail_ok());
        assert_eq!(d.recv().unwrap(), None);
    }

    #[test]
    fn test_per_direction_fifo() {
        let (mut a, mut b) = pipe::<u32>("fifo").unwrap();

        for i in 0..20 {
            assert!(a.send(&i).unwrap());
            assert!(b.send(&(1000 + i)).unwrap());
        }
        for i in 0..20 {
            assert_eq!(b.recv().unwrap(), Some(i));
        }
        for i in 0..20 {
            assert_eq!(a.recv().unwrap(), Some(1000 + i));
        }
    }

    #[test]
    fn test_send_fails_once_full_and_counts_each_failure() {
        let (mut a, _b) = pipe::<Vec<u8>>("full").unwrap();
        let payload = vec![7u8; 512];

        let mut sent = 0usize;
        while a.send(&payload).unwrap() {
            sent += 1;
            assert!(sent < 1_000_000, "kernel buffer never filled");
        }
        assert_eq!(a.failure_count(), 1);

        for expected in 2..=20u64 {
            assert!(!a.send(&payload).unwrap());
            assert_eq!(a.failure_count(), expected);
        }
    }

    #[test]
    fn test_draining_restores_writability() {
        let (mut a, mut b) = pipe::<u64>("drain").unwrap();

        let mut sent = 0u64;
        while a.send(&sent).unwrap() {
            sent += 1;
        }

        let mut received = 0u64;
        while let Some(v) = b.recv().unwrap() {
            assert_eq!(v, received);
            received += 1;
        }
        assert_eq!(received, sent);
        assert!(a.send(&sent).unwrap());
    }

    #[test]
    fn test_recv_timeout_waits_for_message() {
        let (mut a, mut b) = pipe::<String>("slow").unwrap();

        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            assert!(a.send(&"late".to_string()).unwrap());
            a
        });

        let got = b.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got.as_deref(), Some("late"));
        drop(writer.join().unwrap());
    }

    #[test]
    fn test_recv_timeout_expires() {
        let (_a, mut b) = pipe::<String>("idle").unwrap();
        assert_eq!(b.recv_timeout(Duration::from_millis(10)).unwrap(), None);
    }

    #[test]
    fn test_close_surfaces_as_transport_error() {
        let (a, mut b) = pipe::<u8>("closing").unwrap();
        a.close();

        assert!(b.readiness().unwrap().is_hangup());
        assert!(matches!(b.recv(), Err(PipeError::ConnectionClosed)));
        assert!(matches!(b.send(&1), Err(PipeError::ConnectionClosed)));
    }

    #[test]
    fn test_fileno_matches_raw_fd() {
        let (a, b) = pipe::<u8>("fd").unwrap();
        assert_eq!(a.fileno(), a.as_raw_fd());
        assert_ne!(a.fileno(), b.fileno());
    }

    #[test]
    fn test_decode_error_surfaces() {
        // Bytes written as a line record are not valid MsgPack for this type
        let (mut raw, mut typed) = {
            let (x, y) = Socket::pair().unwrap();
            (x, Endpoint::<Control>::new(y, "typed".to_string(), true))
        };
        raw.try_send(&[0xc1]).unwrap();
        assert!(matches!(typed.recv(), Err(PipeError::MsgPackDecode(_))));
    }
}
