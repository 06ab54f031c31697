use std::io::Read;

use crate::error::{Error, Result};
use crate::framed_reader::FramedReader;
use crate::version::{RecordKind, FORMAT_VERSION_V1};

const VERSION_WIDTH: usize = 2;
const FLAG_WIDTH: usize = 1;
const CRC_WIDTH: usize = 8;

/// Fixed serialized byte count: `11`. Wire layout is `version(2) | flag(1)
/// | crc(8)`. The flag is a full byte rather than a bit, reserving room
/// for a future undelete/state encoding.
pub fn size() -> usize {
    VERSION_WIDTH + FLAG_WIDTH + CRC_WIDTH
}

/// Writes `version | flag:u8 | crc` into `buf`. Returns the number of bytes
/// written.
pub fn serialize(buf: &mut [u8], flag: bool) -> Result<usize> {
    let total = size();
    buf[..VERSION_WIDTH].copy_from_slice(&FORMAT_VERSION_V1.to_be_bytes());
    buf[VERSION_WIDTH] = flag as u8;
    let crc = crc32fast::hash(&buf[..VERSION_WIDTH + FLAG_WIDTH]) as u64;
    buf[VERSION_WIDTH + FLAG_WIDTH..total].copy_from_slice(&crc.to_be_bytes());
    Ok(total)
}

/// Reads the version tag and flag, then validates the trailing CRC.
/// Returns `flag == 1`.
pub fn deserialize<R: Read>(reader: &mut FramedReader<R>) -> Result<bool> {
    let version = reader.read_u16_be()?;
    if version != FORMAT_VERSION_V1 {
        return Err(Error::UnknownFormatVersion {
            kind: RecordKind::Delete,
            version,
        });
    }

    let flag = reader.read_u8()?;

    let expected_crc = reader.crc_value();
    let actual_crc = reader.read_i64_be()? as u64;
    if expected_crc != actual_crc {
        return Err(Error::DataCorrupt {
            kind: RecordKind::Delete,
            expected_crc,
            actual_crc,
        });
    }
    Ok(flag == 1)
}
