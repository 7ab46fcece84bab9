//! Async readiness for tokio-hosted workers.
//!
//! A worker running on a tokio runtime must not park a thread in `poll(2)`.
//! [`wait_readable`] registers the endpoint's descriptor with the runtime's
//! reactor for the duration of one wait, then hands control back so the
//! caller can `recv`/`readline` without blocking.
//!
//! Must be called from within a tokio runtime.

use std::os::fd::{AsRawFd, RawFd};

use tokio::io::unix::AsyncFd;
use tokio::io::Interest;

use crate::error::Result;

/// Borrowed descriptor; dropping it deregisters without closing.
struct Watched(RawFd);

impl AsRawFd for Watched {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

/// Wait until `source` has a message pending or its peer has hung up.
pub async fn wait_readable<S>(source: &S) -> Result<()>
where
    S: AsRawFd + ?Sized,
{
    let fd = AsyncFd::with_interest(Watched(source.as_raw_fd()), Interest::READABLE)?;
    let _ready = fd.readable().await?;
    Ok(())
}
