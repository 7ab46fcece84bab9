//! Codec module - turns messages into transport payloads and back.
//!
//! - [`MsgPackCodec`] - any serde value, used by generic endpoints
//! - [`LineCodec`] - text records as raw UTF-8, used by line endpoints
//!
//! # Design
//!
//! Codecs are marker structs selected at compile time through the endpoint's
//! type parameter. No codec holds state, so encoding never depends on what
//! was sent before: one call produces exactly one message.
//!
//! # Example
//!
//! ```
//! use nbpipe::codec::{Codec, LineCodec, MsgPackCodec};
//!
//! let encoded = MsgPackCodec::encode(&(1u8, "hello".to_string())).unwrap();
//! let decoded: (u8, String) = MsgPackCodec::decode(encoded).unwrap();
//! assert_eq!(decoded, (1, "hello".to_string()));
//!
//! let line = LineCodec::encode(&"heading=90".to_string()).unwrap();
//! assert_eq!(&line[..], b"heading=90");
//! ```

mod line;
mod msgpack;

use bytes::Bytes;

use crate::error::Result;

pub use line::LineCodec;
pub use msgpack::MsgPackCodec;

/// Encoding between a message type and a single transport payload.
pub trait Codec<T> {
    /// Encode a message into one payload.
    fn encode(value: &T) -> Result<Bytes>;

    /// Decode one payload into a message.
    fn decode(bytes: Bytes) -> Result<T>;
}
