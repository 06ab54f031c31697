use std::io::Read;

use crate::error::{Error, Result};
use crate::framed_reader::FramedReader;
use crate::properties::PropertiesSerde;
use crate::version::{RecordKind, FORMAT_VERSION_V1};

const VERSION_WIDTH: usize = 2;
const CRC_WIDTH: usize = 8;

/// Exact serialized byte count for `properties`. Wire layout is
/// `version(2) | properties_payload(variable, opaque) | crc(8)`.
pub fn size<P: PropertiesSerde>(properties: &P::Properties) -> usize {
    VERSION_WIDTH + P::size(properties) + CRC_WIDTH
}

/// Writes the full record (version, payload, CRC) into `buf`, which must
/// have at least `size(properties)` bytes available. Returns the number of
/// bytes written.
pub fn serialize<P: PropertiesSerde>(buf: &mut [u8], properties: &P::Properties) -> Result<usize> {
    let payload_len = P::size(properties);
    let total = VERSION_WIDTH + payload_len + CRC_WIDTH;
    buf[..VERSION_WIDTH].copy_from_slice(&FORMAT_VERSION_V1.to_be_bytes());
    P::write(&mut buf[VERSION_WIDTH..VERSION_WIDTH + payload_len], properties)?;
    let crc = crc32fast::hash(&buf[..VERSION_WIDTH + payload_len]) as u64;
    buf[VERSION_WIDTH + payload_len..total].copy_from_slice(&crc.to_be_bytes());
    Ok(total)
}

/// Reads the version tag, dispatches on it, reads the payload via `P`,
/// then validates the trailing CRC.
pub fn deserialize<P: PropertiesSerde, R: Read>(
    reader: &mut FramedReader<R>,
) -> Result<P::Properties> {
    let version = reader.read_u16_be()?;
    if version != FORMAT_VERSION_V1 {
        return Err(Error::UnknownFormatVersion {
            kind: RecordKind::BlobProperties,
            version,
        });
    }

    let properties = P::read(reader)?;
    let expected_crc = reader.crc_value();
    let actual_crc = reader.read_i64_be()? as u64;
    if expected_crc != actual_crc {
        return Err(Error::DataCorrupt {
            kind: RecordKind::BlobProperties,
            expected_crc,
            actual_crc,
        });
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{RawProperties, RawPropertiesSerde};

    #[test]
    fn round_trips() {
        let properties = RawProperties(vec![1, 2, 3, 4, 5, 6, 7]);
        let mut buf = vec![0u8; size::<RawPropertiesSerde>(&properties)];
        let written = serialize::<RawPropertiesSerde>(&mut buf, &properties).unwrap();
        assert_eq!(written, buf.len());

        let mut reader = FramedReader::new(&buf[..]);
        let decoded = deserialize::<RawPropertiesSerde, _>(&mut reader).unwrap();
        assert_eq!(decoded, properties);
    }

    #[test]
    fn rejects_unknown_version() {
        let properties = RawProperties(vec![1, 2, 3]);
        let mut buf = vec![0u8; size::<RawPropertiesSerde>(&properties)];
        serialize::<RawPropertiesSerde>(&mut buf, &properties).unwrap();
        buf[1] = 0xFF; // corrupt the version tag

        let mut reader = FramedReader::new(&buf[..]);
        let err = deserialize::<RawPropertiesSerde, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::UnknownFormatVersion { version: 0xFF, .. }));
    }

    #[test]
    fn detects_single_bit_corruption() {
        let properties = RawProperties(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let mut buf = vec![0u8; size::<RawPropertiesSerde>(&properties)];
        serialize::<RawPropertiesSerde>(&mut buf, &properties).unwrap();

        // flip one bit in the payload region
        let payload_start = VERSION_WIDTH + 4; // past the length prefix
        buf[payload_start] ^= 0x01;

        let mut reader = FramedReader::new(&buf[..]);
        let err = deserialize::<RawPropertiesSerde, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::DataCorrupt { .. }));
    }
}
