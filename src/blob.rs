use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::framed_reader::FramedReader;
use crate::version::{RecordKind, FORMAT_VERSION_V1};

const VERSION_WIDTH: usize = 2;
const SIZE_WIDTH: usize = 8;
const CRC_WIDTH: usize = 8;

/// Exact serialized byte count for `content.len() == n`: `18 + n`. Wire
/// layout is `version(2) | size(8, i64) | content(size bytes) | crc(8)`.
/// `size` must be in `0..=i32::MAX`; larger values are rejected without
/// reading any content, since the in-memory delivery type is bounded at 32
/// bits.
pub fn size(n: usize) -> usize {
    VERSION_WIDTH + SIZE_WIDTH + n + CRC_WIDTH
}

/// Writes only the version and size prefix into `buf`, returning the
/// number of bytes written. The caller streams the content bytes directly
/// (e.g. via [`FramedReader::copy_exact_to`] on the producing side, or a
/// plain `Write`) and appends the CRC separately, supporting zero-copy
/// streaming of large blobs without ever buffering them here.
pub fn serialize_partial(buf: &mut [u8], content_size: i64) -> Result<usize> {
    buf[..VERSION_WIDTH].copy_from_slice(&FORMAT_VERSION_V1.to_be_bytes());
    buf[VERSION_WIDTH..VERSION_WIDTH + SIZE_WIDTH].copy_from_slice(&content_size.to_be_bytes());
    Ok(VERSION_WIDTH + SIZE_WIDTH)
}

/// Writes the full record (version, size, content, CRC) into `buf` in one
/// shot. A convenience wrapper over [`serialize_partial`] for callers that
/// already hold the whole blob in memory.
pub fn serialize(buf: &mut [u8], content: &[u8]) -> Result<usize> {
    let prefix_len = serialize_partial(buf, content.len() as i64)?;
    buf[prefix_len..prefix_len + content.len()].copy_from_slice(content);
    let crc = crc32fast::hash(&buf[..prefix_len + content.len()]) as u64;
    buf[prefix_len + content.len()..prefix_len + content.len() + CRC_WIDTH]
        .copy_from_slice(&crc.to_be_bytes());
    Ok(prefix_len + content.len() + CRC_WIDTH)
}

/// A lazily-readable blob body. The codec deliberately does not buffer the
/// content itself; the caller drains it via [`BlobOutput::copy_to`] (or the
/// buffered convenience [`BlobOutput::read_content`]) before doing anything
/// else with the underlying stream. CRC validation happens once the
/// content has been fully consumed.
pub struct BlobOutput<'r, R> {
    pub size: i64,
    reader: &'r mut FramedReader<R>,
}

impl<'r, R: Read> BlobOutput<'r, R> {
    /// Streams the content straight into `sink` without buffering it here,
    /// then validates the trailing CRC.
    pub fn copy_to<W: Write>(self, sink: &mut W) -> Result<()> {
        self.reader.copy_exact_to(self.size as usize, sink)?;
        let expected_crc = self.reader.crc_value();
        let actual_crc = self.reader.read_i64_be()? as u64;
        if expected_crc != actual_crc {
            return Err(Error::DataCorrupt {
                kind: RecordKind::Blob,
                expected_crc,
                actual_crc,
            });
        }
        Ok(())
    }

    /// Buffers the content into a `Vec<u8>` and validates the CRC. A
    /// convenience built on [`BlobOutput::copy_to`] for callers that don't
    /// need true zero-copy streaming.
    pub fn read_content(self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size.max(0) as usize);
        self.copy_to(&mut buf)?;
        Ok(buf)
    }
}

/// Reads the version tag and declared size, validates the size is within
/// `0..=i32::MAX`, then hands back a [`BlobOutput`] positioned at the
/// content. CRC validation is deferred until the caller consumes the
/// content (see [`BlobOutput`]).
pub fn deserialize<R: Read>(reader: &mut FramedReader<R>) -> Result<BlobOutput<'_, R>> {
    let version = reader.read_u16_be()?;
    if version != FORMAT_VERSION_V1 {
        return Err(Error::UnknownFormatVersion {
            kind: RecordKind::Blob,
            version,
        });
    }

    let declared_size = reader.read_i64_be()?;
    if declared_size < 0 || declared_size > i32::MAX as i64 {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "blob declared size {declared_size} is out of range 0..={}",
                i32::MAX
            ),
        )));
    }

    Ok(BlobOutput {
        size: declared_size,
        reader,
    })
}
