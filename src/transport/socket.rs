//! Kernel-buffered duplex channel: one end of an `AF_UNIX` seqpacket pair.
//!
//! Seqpacket sockets keep message boundaries (one send is one receive) and
//! report a hang-up once the peer is gone, which is everything the endpoints
//! need from the OS. Every call here is non-blocking: the descriptors are
//! put in `O_NONBLOCK` mode and every send/receive also passes
//! `MSG_DONTWAIT`.
//!
//! # Wire layout
//!
//! ```text
//! ┌─────┬──────────────────────────┐
//! │ Tag │ Payload                  │
//! │ 1 B │ 0..=MAX_MESSAGE_SIZE     │
//! └─────┴──────────────────────────┘
//! ```
//!
//! The tag keeps every message non-empty, so a zero-length receive always
//! means the peer hung up and never an empty record.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use super::poller::poll_one;
use super::readiness::{Interest, Readiness};
use crate::error::{PipeError, Result};

/// Largest payload a single message may carry.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Leading byte of every message.
const MESSAGE_TAG: u8 = 0x4d;

/// Receive buffer size: tag plus the largest payload.
const FRAME_CAPACITY: usize = MAX_MESSAGE_SIZE + 1;

/// A closed peer must surface as `EPIPE`, never as `SIGPIPE`.
const SEND_FLAGS: libc::c_int = libc::MSG_DONTWAIT | libc::MSG_NOSIGNAL;

/// What a failed `sendmsg` means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendErrorKind {
    /// Interrupted before anything was queued; issue the call again.
    Retry,
    /// The kernel buffer cannot take the message right now.
    Full,
    /// The peer hung up.
    Closed,
    /// Anything else.
    Fatal,
}

fn classify_send_error(err: &io::Error) -> SendErrorKind {
    match err.raw_os_error() {
        Some(libc::EINTR) => SendErrorKind::Retry,
        Some(libc::EPIPE)
        | Some(libc::ECONNRESET)
        | Some(libc::ECONNREFUSED)
        | Some(libc::ENOTCONN) => SendErrorKind::Closed,
        Some(libc::ENOBUFS) => SendErrorKind::Full,
        _ if err.kind() == io::ErrorKind::WouldBlock => SendErrorKind::Full,
        _ => SendErrorKind::Fatal,
    }
}

/// One end of a connected seqpacket socket pair.
#[derive(Debug)]
pub struct Socket {
    fd: OwnedFd,
    recv_buf: BytesMut,
}

impl Socket {
    /// Create a connected pair.
    pub fn pair() -> Result<(Socket, Socket)> {
        let mut fds: [libc::c_int; 2] = [-1, -1];

        // SAFETY: fds points to two writable c_ints
        let rc = unsafe {
            libc::socketpair(libc::AF_UNIX, libc::SOCK_SEQPACKET, 0, fds.as_mut_ptr())
        };
        if rc != 0 {
            return Err(io::Error::last_os_error().into());
        }

        // SAFETY: socketpair succeeded, both descriptors are fresh and unowned
        let (a, b) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
        set_nonblocking(&a)?;
        set_nonblocking(&b)?;

        tracing::debug!(fd0 = fds[0], fd1 = fds[1], "created seqpacket pair");

        Ok((Socket::from_owned(a), Socket::from_owned(b)))
    }

    fn from_owned(fd: OwnedFd) -> Self {
        Self {
            fd,
            recv_buf: BytesMut::new(),
        }
    }

    /// Query read/write readiness with one `poll(2)` call.
    ///
    /// `None` checks without waiting; `Some(d)` waits at most `d`.
    pub fn readiness(&self, timeout: Option<Duration>) -> Result<Readiness> {
        poll_one(self.fd.as_raw_fd(), Interest::Both, timeout)
    }

    /// Query a single kind of readiness.
    pub fn readiness_for(&self, interest: Interest, timeout: Option<Duration>) -> Result<Readiness> {
        poll_one(self.fd.as_raw_fd(), interest, timeout)
    }

    /// Send one message without blocking.
    ///
    /// Returns `Ok(false)` when the kernel buffer cannot take the message
    /// right now. A hung-up peer is reported as `ConnectionClosed`.
    pub fn try_send(&mut self, payload: &[u8]) -> Result<bool> {
        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(PipeError::MessageTooLarge {
                size: payload.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        let tag = [MESSAGE_TAG];
        let iov = [
            libc::iovec {
                iov_base: tag.as_ptr() as *mut libc::c_void,
                iov_len: tag.len(),
            },
            libc::iovec {
                iov_base: payload.as_ptr() as *mut libc::c_void,
                iov_len: payload.len(),
            },
        ];

        // SAFETY: msghdr is plain data; all-zero is a valid empty header
        let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
        msg.msg_iov = iov.as_ptr() as *mut libc::iovec;
        msg.msg_iovlen = iov.len() as _;

        loop {
            // SAFETY: msg references iov, tag and payload, all alive for the call
            let rc = unsafe { libc::sendmsg(self.fd.as_raw_fd(), &msg, SEND_FLAGS) };
            if rc >= 0 {
                return Ok(true);
            }

            let err = io::Error::last_os_error();
            match classify_send_error(&err) {
                SendErrorKind::Retry => continue,
                SendErrorKind::Full => return Ok(false),
                SendErrorKind::Closed => return Err(PipeError::ConnectionClosed),
                SendErrorKind::Fatal => return Err(err.into()),
            }
        }
    }

    /// Receive one message without blocking.
    ///
    /// Returns `Ok(None)` when nothing is pending, `ConnectionClosed` once
    /// the peer has hung up and every queued message has been read.
    pub fn try_recv(&mut self) -> Result<Option<Bytes>> {
        // Only grows when a previous frame is still referenced by a caller
        self.recv_buf.clear();
        self.recv_buf.reserve(FRAME_CAPACITY);

        let rc = loop {
            let spare = self.recv_buf.spare_capacity_mut();

            // SAFETY: spare is writable for spare.len() bytes; recv only
            // writes into it and never reads
            let rc = unsafe {
                libc::recv(
                    self.fd.as_raw_fd(),
                    spare.as_mut_ptr() as *mut libc::c_void,
                    spare.len(),
                    libc::MSG_DONTWAIT,
                )
            };
            if rc >= 0 {
                break rc as usize;
            }

            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::ECONNRESET) => return Err(PipeError::ConnectionClosed),
                _ if err.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                _ => return Err(err.into()),
            }
        };

        if rc == 0 {
            return Err(PipeError::ConnectionClosed);
        }

        // SAFETY: recv initialised the first rc bytes of the spare capacity
        unsafe { self.recv_buf.set_len(rc) };

        let mut frame = self.recv_buf.split_to(rc);
        Ok(Some(frame.split_off(1).freeze()))
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl AsFd for Socket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

fn set_nonblocking(fd: &OwnedFd) -> Result<()> {
    let raw = fd.as_raw_fd();

    // SAFETY: raw is a valid open descriptor owned by fd
    let flags = unsafe { libc::fcntl(raw, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error().into());
    }

    // SAFETY: as above
    let rc = unsafe { libc::fcntl(raw, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(())
}
