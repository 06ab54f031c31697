use std::fmt;

/// Which sub-record (or the header) an error or log line is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Header,
    BlobProperties,
    UserMetadata,
    Blob,
    Delete,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Header => "header",
            RecordKind::BlobProperties => "blob-properties",
            RecordKind::UserMetadata => "user-metadata",
            RecordKind::Blob => "blob",
            RecordKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// The only format generation defined so far. Every sub-record
/// deserializer reads its 2-byte version tag through the
/// [`crate::framed_reader::FramedReader`] (so the CRC accumulator sees it)
/// and compares it against the version(s) it knows how to decode; unknown
/// versions fail with [`crate::error::Error::UnknownFormatVersion`]. Only
/// one generation exists today, so each codec's check is a single equality
/// test against this constant. A second generation would turn that
/// equality test into a per-codec match on the versions it supports,
/// without touching the other codecs.
pub const FORMAT_VERSION_V1: u16 = 1;
