//! Pipe factories: create connected endpoint pairs.
//!
//! Pairs are created once, at worker startup, and each half is handed to
//! its owner. The two halves are named `"<name>[0]"` and `"<name>[1]"`.
//!
//! # Example
//!
//! ```
//! use nbpipe::config::{PipeConfig, TransportKind};
//! use nbpipe::line::LineChannel;
//! use nbpipe::pipe::line_pipe_with_config;
//!
//! let config = PipeConfig::with_transport(TransportKind::Queue);
//! let (mut server, mut client) = line_pipe_with_config("server", &config).unwrap();
//!
//! client.send("watch={\"ap.heading\": 0.5}").unwrap();
//! assert!(server.readline().unwrap().is_some());
//! ```

use std::sync::Arc;

use crate::codec::{Codec, MsgPackCodec};
use crate::config::{PipeConfig, TransportKind};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::line::{LineEndpoint, LineQueue, QueueLineEndpoint, SocketLineEndpoint};
use crate::transport::Socket;

fn end_names(name: &str) -> (String, String) {
    (format!("{}[0]", name), format!("{}[1]", name))
}

/// Create a generic pipe. Empty receives are not logged.
pub fn pipe<T>(name: &str) -> Result<(Endpoint<T>, Endpoint<T>)>
where
    MsgPackCodec: Codec<T>,
{
    pipe_with(name, true)
}

/// Create a generic pipe, choosing whether an empty receive is expected.
///
/// With `recv_fail_ok = false` every empty `recv` logs a warning; use it for
/// endpoints whose owner only reads after being told data is there.
pub fn pipe_with<T>(name: &str, recv_fail_ok: bool) -> Result<(Endpoint<T>, Endpoint<T>)>
where
    MsgPackCodec: Codec<T>,
{
    let (a, b) = Socket::pair()?;
    let (name0, name1) = end_names(name);
    Ok((
        Endpoint::new(a, name0, recv_fail_ok),
        Endpoint::new(b, name1, recv_fail_ok),
    ))
}

/// Create a generic pipe as described by `config`.
///
/// Only `recv_fail_ok` applies: generic endpoints always use the kernel
/// socket, whatever `config.transport` says.
pub fn pipe_with_config<T>(
    name: &str,
    config: &PipeConfig,
) -> Result<(Endpoint<T>, Endpoint<T>)>
where
    MsgPackCodec: Codec<T>,
{
    pipe_with(name, config.recv_fail_ok)
}

/// Create a line pipe over a real socket (`true`) or in-process queues.
pub fn line_pipe(name: &str, use_real_transport: bool) -> Result<(LineEndpoint, LineEndpoint)> {
    let config = PipeConfig::with_transport(TransportKind::from_use_real(use_real_transport));
    line_pipe_with_config(name, &config)
}

/// Create a line pipe as described by `config`.
pub fn line_pipe_with_config(
    name: &str,
    config: &PipeConfig,
) -> Result<(LineEndpoint, LineEndpoint)> {
    let (name0, name1) = end_names(name);

    match config.transport {
        TransportKind::Socket => {
            let (a, b) = Socket::pair()?;
            Ok((
                SocketLineEndpoint::new(a, name0).into(),
                SocketLineEndpoint::new(b, name1).into(),
            ))
        }
        TransportKind::Queue => {
            let q0: Arc<LineQueue> = Arc::default();
            let q1: Arc<LineQueue> = Arc::default();
            let to_q0 = Arc::downgrade(&q0);
            let to_q1 = Arc::downgrade(&q1);

            tracing::debug!(pipe = name, capacity = config.queue_capacity, "created queue pipe");

            Ok((
                QueueLineEndpoint::new(name0, q0, to_q1, config.queue_capacity).into(),
                QueueLineEndpoint::new(name1, q1, to_q0, config.queue_capacity).into(),
            ))
        }
    }
}
