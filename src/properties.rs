use std::io::Read;

use crate::error::{Error, Result};
use crate::framed_reader::FramedReader;

/// External contract for the opaque blob-properties payload. The byte
/// layout of a blob's properties is owned by an external, user-defined
/// schema; this layer only needs three operations on it. A caller with its
/// own property schema implements this trait directly, as long as `read`
/// can determine its own length from the stream (the BlobProperties codec
/// itself carries no length field, so the payload is opaque end-to-end).
/// [`RawProperties`] / [`RawPropertiesSerde`] is the default, schema-less
/// implementation: a self-delimited `(size, bytes)` block.
pub trait PropertiesSerde {
    type Properties;

    /// Exact serialized byte count of `properties`.
    fn size(properties: &Self::Properties) -> usize;

    /// Writes `properties` into `buf`, which must have at least
    /// `Self::size(properties)` bytes available.
    fn write(buf: &mut [u8], properties: &Self::Properties) -> Result<()>;

    /// Reads a properties value from `reader`, determining its own length.
    fn read<R: Read>(reader: &mut FramedReader<R>) -> Result<Self::Properties>;
}

/// Opaque property bytes, self-delimited as a 4-byte big-endian length
/// followed by that many bytes: `(size, bytes)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperties(pub Vec<u8>);

pub struct RawPropertiesSerde;

impl PropertiesSerde for RawPropertiesSerde {
    type Properties = RawProperties;

    fn size(properties: &RawProperties) -> usize {
        4 + properties.0.len()
    }

    fn write(buf: &mut [u8], properties: &RawProperties) -> Result<()> {
        let len = properties.0.len() as u32;
        buf[..4].copy_from_slice(&len.to_be_bytes());
        buf[4..4 + properties.0.len()].copy_from_slice(&properties.0);
        Ok(())
    }

    fn read<R: Read>(reader: &mut FramedReader<R>) -> Result<RawProperties> {
        let len = reader.read_i32_be()?;
        if len < 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("raw properties declared a negative size: {len}"),
            )));
        }
        let bytes = reader.read_exact(len as usize)?;
        Ok(RawProperties(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::{PropertiesSerde, RawProperties, RawPropertiesSerde};
    use crate::framed_reader::FramedReader;

    #[test]
    fn size_includes_length_prefix() {
        let properties = RawProperties(vec![1, 2, 3, 4, 5]);
        assert_eq!(RawPropertiesSerde::size(&properties), 4 + 5);
    }

    #[test]
    fn round_trips_through_write_and_read() {
        let properties = RawProperties(vec![9, 8, 7, 6]);
        let mut buf = vec![0u8; RawPropertiesSerde::size(&properties)];
        RawPropertiesSerde::write(&mut buf, &properties).unwrap();

        let mut reader = FramedReader::new(&buf[..]);
        let decoded = RawPropertiesSerde::read(&mut reader).unwrap();
        assert_eq!(decoded, properties);
    }

    #[test]
    fn round_trips_empty_properties() {
        let properties = RawProperties(vec![]);
        let mut buf = vec![0u8; RawPropertiesSerde::size(&properties)];
        RawPropertiesSerde::write(&mut buf, &properties).unwrap();

        let mut reader = FramedReader::new(&buf[..]);
        let decoded = RawPropertiesSerde::read(&mut reader).unwrap();
        assert_eq!(decoded, properties);
    }

    #[test]
    fn rejects_negative_declared_length() {
        let buf: [u8; 4] = (-1i32).to_be_bytes();
        let mut reader = FramedReader::new(&buf[..]);
        let err = RawPropertiesSerde::read(&mut reader).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
