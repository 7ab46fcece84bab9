//! Readiness flags reported by a single `poll(2)` query.

use std::ops::{BitOr, BitOrAssign};

/// What a caller wants to be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Read readiness only.
    Readable,
    /// Write readiness only.
    Writable,
    /// Read and write readiness in one query.
    Both,
}

impl Interest {
    pub(crate) fn events(self) -> libc::c_short {
        match self {
            Interest::Readable => libc::POLLIN,
            Interest::Writable => libc::POLLOUT,
            Interest::Both => libc::POLLIN | libc::POLLOUT,
        }
    }
}

/// Small flag set describing which operations would complete without blocking.
///
/// Hang-up and error conditions are always reported, whatever the interest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Readiness(u8);

impl Readiness {
    /// Nothing is ready.
    pub const EMPTY: Readiness = Readiness(0);
    /// A receive would return a message (or report a hang-up).
    pub const READABLE: Readiness = Readiness(0b0001);
    /// A send would be accepted by the kernel buffer.
    pub const WRITABLE: Readiness = Readiness(0b0010);
    /// The peer end has been closed.
    pub const HANGUP: Readiness = Readiness(0b0100);
    /// The descriptor is in an error state or invalid.
    pub const ERROR: Readiness = Readiness(0b1000);

    /// Translate `pollfd.revents`.
    pub(crate) fn from_revents(revents: libc::c_short) -> Self {
        let mut ready = Readiness::EMPTY;
        if revents & libc::POLLIN != 0 {
            ready |= Readiness::READABLE;
        }
        if revents & libc::POLLOUT != 0 {
            ready |= Readiness::WRITABLE;
        }
        if revents & libc::POLLHUP != 0 {
            ready |= Readiness::HANGUP;
        }
        if revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            ready |= Readiness::ERROR;
        }
        ready
    }

    /// True if every flag in `other` is set.
    #[inline]
    pub fn contains(self, other: Readiness) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_readable(self) -> bool {
        self.contains(Readiness::READABLE)
    }

    #[inline]
    pub fn is_writable(self) -> bool {
        self.contains(Readiness::WRITABLE)
    }

    #[inline]
    pub fn is_hangup(self) -> bool {
        self.contains(Readiness::HANGUP)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self.contains(Readiness::ERROR)
    }
}

impl BitOr for Readiness {
    type Output = Readiness;

    fn bitor(self, rhs: Readiness) -> Readiness {
        Readiness(self.0 | rhs.0)
    }
}

impl BitOrAssign for Readiness {
    fn bitor_assign(&mut self, rhs: Readiness) {
        self.0 |= rhs.0;
    }
}
