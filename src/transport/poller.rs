//! Caller-owned readiness multiplexing over several endpoints.
//!
//! Endpoints never wait on their own. A worker that serves several pipes
//! registers their descriptors here, waits once for any of them, then calls
//! `recv`/`readline` on the ones that reported readiness.
//!
//! # Example
//!
//! ```
//! use nbpipe::pipe::line_pipe;
//! use nbpipe::line::LineChannel;
//! use nbpipe::transport::{Interest, Poller};
//! use std::time::Duration;
//!
//! let (mut a, mut b) = line_pipe("cmd", true).unwrap();
//! let mut poller = Poller::new();
//! poller.register(b.fileno().unwrap(), Interest::Readable);
//!
//! a.send("ap.enabled=true").unwrap();
//! let events = poller.poll(Some(Duration::from_millis(100))).unwrap();
//! assert_eq!(events.len(), 1);
//! assert_eq!(b.readline().unwrap().as_deref(), Some("ap.enabled=true"));
//! ```

use std::fmt;
use std::io;
use std::os::fd::RawFd;
use std::time::{Duration, Instant};

use super::readiness::{Interest, Readiness};
use crate::error::Result;

/// Convert an optional wait bound into a `poll(2)` timeout in milliseconds.
///
/// `None` means "do not wait". Sub-millisecond waits round up so a
/// non-zero bound is never silently turned into a zero-wait query.
fn timeout_millis(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => 0,
        Some(d) if d.is_zero() => 0,
        Some(d) => {
            let millis = d.as_millis().max(1);
            millis.min(libc::c_int::MAX as u128) as libc::c_int
        }
    }
}

/// Run `poll(2)` over `fds`, retrying on `EINTR` until the bound expires.
///
/// Returns the number of descriptors with non-zero `revents`.
pub(crate) fn poll_fds(fds: &mut [libc::pollfd], timeout: Option<Duration>) -> Result<usize> {
    let deadline = timeout.map(|d| Instant::now() + d);

    loop {
        let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));

        // SAFETY: fds is a valid, exclusively borrowed slice of pollfd
        let rc = unsafe {
            libc::poll(
                fds.as_mut_ptr(),
                fds.len() as libc::nfds_t,
                timeout_millis(remaining),
            )
        };

        if rc >= 0 {
            return Ok(rc as usize);
        }

        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err.into());
        }
        if remaining.map_or(true, |r| r.is_zero()) {
            return Ok(0);
        }
    }
}

/// Query the readiness of a single descriptor.
pub(crate) fn poll_one(
    fd: RawFd,
    interest: Interest,
    timeout: Option<Duration>,
) -> Result<Readiness> {
    let mut fds = [libc::pollfd {
        fd,
        events: interest.events(),
        revents: 0,
    }];
    poll_fds(&mut fds, timeout)?;
    Ok(Readiness::from_revents(fds[0].revents))
}

/// Readiness multiplexer over a set of registered descriptors.
#[derive(Default)]
pub struct Poller {
    fds: Vec<libc::pollfd>,
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("fds", &self.fds.iter().map(|p| p.fd).collect::<Vec<_>>())
            .finish()
    }
}

impl Poller {
    /// Create an empty poller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing the interest if it is already present.
    pub fn register(&mut self, fd: RawFd, interest: Interest) {
        match self.fds.iter_mut().find(|p| p.fd == fd) {
            Some(entry) => entry.events = interest.events(),
            None => self.fds.push(libc::pollfd {
                fd,
                events: interest.events(),
                revents: 0,
            }),
        }
    }

    /// Remove a descriptor. Returns false if it was not registered.
    pub fn deregister(&mut self, fd: RawFd) -> bool {
        let before = self.fds.len();
        self.fds.retain(|p| p.fd != fd);
        self.fds.len() != before
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.fds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }

    /// Wait up to `timeout` (zero wait when `None`) for any registered
    /// descriptor to become ready.
    ///
    /// Returns every descriptor with a non-empty readiness, in registration
    /// order. Hang-up and error conditions are included so the caller can
    /// drop dead peers.
    pub fn poll(&mut self, timeout: Option<Duration>) -> Result<Vec<(RawFd, Readiness)>> {
        if self.fds.is_empty() {
            return Ok(Vec::new());
        }

        for entry in self.fds.iter_mut() {
            entry.revents = 0;
        }

        let ready = poll_fds(&mut self.fds, timeout)?;
        if ready == 0 {
            return Ok(Vec::new());
        }

        Ok(self
            .fds
            .iter()
            .filter(|p| p.revents != 0)
            .map(|p| (p.fd, Readiness::from_revents(p.revents)))
            .collect())
    }
}
