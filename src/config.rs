//! Pipe configuration.
//!
//! Selects the transport for line pipes and tunes endpoint behaviour.
//! Usually embedded in a larger worker configuration and loaded from JSON:
//!
//! ```
//! use nbpipe::config::{PipeConfig, TransportKind};
//!
//! let config = PipeConfig::from_json(r#"{"transport": "queue"}"#).unwrap();
//! assert_eq!(config.transport, TransportKind::Queue);
//! assert_eq!(config.queue_capacity, 1000);
//! assert!(config.recv_fail_ok);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::line::DEFAULT_QUEUE_CAPACITY;

/// Transport behind a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Kernel socket pair; endpoints may live in different processes.
    #[default]
    Socket,
    /// Bounded in-process queues; both endpoints stay in this process.
    Queue,
}

impl TransportKind {
    /// Map the "use real process isolation" switch to a transport.
    pub fn from_use_real(use_real_transport: bool) -> Self {
        if use_real_transport {
            TransportKind::Socket
        } else {
            TransportKind::Queue
        }
    }
}

/// Configuration for creating pipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Transport for line pipes.
    pub transport: TransportKind,
    /// Whether an empty `recv` on a generic endpoint is expected (not logged).
    /// Read by [`pipe_with_config`](crate::pipe::pipe_with_config).
    pub recv_fail_ok: bool,
    /// Records each emulated queue holds before sends fail.
    pub queue_capacity: usize,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Socket,
            recv_fail_ok: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipeConfig {
    /// Configuration with the given transport and default settings.
    pub fn with_transport(transport: TransportKind) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
