/// Incremental CRC-32 (IEEE 802.3) accumulator used by every record codec.
///
/// Deterministic: feeding one large slice or an equivalent sequence of
/// smaller slices produces the same [`Crc::value`]. Not thread-safe; each
/// codec call constructs a fresh instance.
#[derive(Clone)]
pub struct Crc {
    hasher: crc32fast::Hasher,
}

impl Crc {
    pub fn new() -> Crc {
        Crc {
            hasher: crc32fast::Hasher::new(),
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// The current CRC-32, carried in the low 32 bits of a `u64` to match
    /// the 8-byte on-disk field width.
    pub fn value(&self) -> u64 {
        self.hasher.clone().finalize() as u64
    }
}

impl Default for Crc {
    fn default() -> Self {
        Crc::new()
    }
}
