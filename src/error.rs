use std::io;
use std::result;

use thiserror::Error;

use crate::version::RecordKind;

/// Errors produced by the record codecs.
///
/// The core never retries or substitutes a default on any of these; every
/// error is surfaced to the immediate caller with enough context to log and
/// to match on (record kind, expected/actual CRC, or the violated
/// constraint).
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} record is corrupt: expected crc {expected_crc:#010x}, got {actual_crc:#010x}")]
    DataCorrupt {
        kind: RecordKind,
        expected_crc: u64,
        actual_crc: u64,
    },

    #[error("{kind} record has unknown format version {version}")]
    UnknownFormatVersion { kind: RecordKind, version: u16 },

    #[error("header constraint violated: {0}")]
    HeaderConstraintError(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = result::Result<T, Error>;
