//! # nbpipe
//!
//! Non-blocking duplex pipes for passing control messages between the
//! workers of a control application.
//!
//! No call in this crate waits for the peer. A full channel makes `send`
//! return `Ok(false)`, an empty one makes `recv`/`readline` return
//! `Ok(None)`; only a broken channel is an error.
//!
//! ## Endpoints
//!
//! - [`Endpoint`] - generic messages (MsgPack-encoded serde values) over a
//!   kernel socket pair, with rate-limited backpressure diagnostics
//! - [`LineEndpoint`] - text records over either a kernel socket pair or
//!   bounded in-process queues, selected by [`PipeConfig`]
//!
//! ## Example
//!
//! ```
//! use nbpipe::{line_pipe, LineChannel};
//!
//! let (mut a, mut b) = line_pipe("x", true).unwrap();
//! assert!(a.send("ping").unwrap());
//! assert_eq!(b.readline().unwrap().as_deref(), Some("ping"));
//! assert_eq!(b.readline().unwrap(), None);
//! ```

// Needs AF_UNIX seqpacket pairs and MSG_NOSIGNAL
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
compile_error!("nbpipe requires Linux, Android or a BSD with MSG_NOSIGNAL");

pub mod backpressure;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod line;
pub mod pipe;
pub mod transport;

pub use config::{PipeConfig, TransportKind};
pub use endpoint::Endpoint;
pub use error::{PipeError, Result};
pub use line::{LineChannel, LineEndpoint};
pub use pipe::{line_pipe, line_pipe_with_config, pipe, pipe_with, pipe_with_config};
