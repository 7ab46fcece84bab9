//! Line codec - text records carried as raw UTF-8.
//!
//! Record splitting is done by the transport (one message per record), so
//! no terminator is added or stripped here. A record that already ends in
//! `\n` keeps it.

use bytes::Bytes;

use super::Codec;
use crate::error::Result;

/// Codec for single text records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl Codec<String> for LineCodec {
    #[inline]
    fn encode(value: &String) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(value.as_bytes()))
    }

    #[inline]
    fn decode(bytes: Bytes) -> Result<String> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;

    #[test]
    fn test_record_bytes_unchanged() {
        let record = "servo.command=0.25\n".to_string();
        let encoded = LineCodec::encode(&record).unwrap();
        assert_eq!(&encoded[..], record.as_bytes());

        let decoded = LineCodec::decode(encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_empty_record() {
        let encoded = LineCodec::encode(&String::new()).unwrap();
        assert!(encoded.is_empty());
        assert_eq!(LineCodec::decode(encoded).unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = LineCodec::decode(Bytes::from_static(&[0x66, 0xff, 0x6f]));
        assert!(matches!(result, Err(PipeError::InvalidRecord(_))));
    }
}
