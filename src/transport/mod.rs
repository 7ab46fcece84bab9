//! Transport module - OS primitives under the endpoints.
//!
//! - [`Socket`] - one end of a kernel-buffered `AF_UNIX` seqpacket pair
//! - [`Readiness`] / [`Interest`] - one `poll(2)` query as a flag set
//! - [`Poller`] - caller-owned multiplexing over many endpoints
//! - [`wait_readable`] - the same readiness wait for tokio-hosted workers

mod poller;
mod readiness;
mod socket;
mod wait;

pub use poller::Poller;
pub use readiness::{Interest, Readiness};
pub use socket::{Socket, MAX_MESSAGE_SIZE};
pub use wait::wait_readable;
