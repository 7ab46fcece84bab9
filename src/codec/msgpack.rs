//! MsgPack codec using `rmp-serde`.
//!
//! Structs are written with `to_vec_named` (struct-as-map), so both sides of
//! a pipe can evolve field order independently.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::error::Result;

/// MessagePack codec for structured messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl<T> Codec<T> for MsgPackCodec
where
    T: Serialize + DeserializeOwned,
{
    #[inline]
    fn encode(value: &T) -> Result<Bytes> {
        Ok(Bytes::from(rmp_serde::to_vec_named(value)?))
    }

    #[inline]
    fn decode(bytes: Bytes) -> Result<T> {
        Ok(rmp_serde::from_slice(&bytes)?)
    }
}
