use std::io::Read;

use crate::crc::Crc;
use crate::error::Result;

/// Wraps an underlying `R: Read`. Every byte consumed by a `read_*` call is
/// simultaneously fed to the internal CRC accumulator, so that after the
/// caller has consumed a sub-record's payload, [`FramedReader::crc_value`]
/// yields the expected trailing CRC.
pub struct FramedReader<R> {
    inner: R,
    crc: Crc,
}

impl<R: Read> FramedReader<R> {
    pub fn new(inner: R) -> FramedReader<R> {
        FramedReader {
            inner,
            crc: Crc::new(),
        }
    }

    /// The CRC accumulator's current value, without consuming further bytes.
    pub fn crc_value(&self) -> u64 {
        self.crc.value()
    }

    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        self.crc.update(&buf);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.read_exact(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        let bytes = self.read_exact(2)?;
        Ok(u16::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i32_be(&mut self) -> Result<i32> {
        let bytes = self.read_exact(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i64_be(&mut self) -> Result<i64> {
        let bytes = self.read_exact(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Copies exactly `n` bytes straight to `sink` without buffering them in
    /// this reader, still updating the CRC accumulator as they pass through.
    /// Used by the [`crate::blob`] codec to avoid holding large blob
    /// contents in memory.
    pub fn copy_exact_to<W: std::io::Write>(&mut self, n: usize, sink: &mut W) -> Result<()> {
        let mut remaining = n;
        let mut chunk = [0u8; 8192];
        while remaining > 0 {
            let take = remaining.min(chunk.len());
            self.inner.read_exact(&mut chunk[..take])?;
            self.crc.update(&chunk[..take]);
            sink.write_all(&chunk[..take])?;
            remaining -= take;
        }
        Ok(())
    }
}
