use crate::error::Error;
use crate::version::RecordKind;

/// A sink for corruption events. Codecs (`crc`, `framed_reader`,
/// `blob_properties`, `user_metadata`, `blob`, `delete`, `header`,
/// `version`) never log; they stay pure functions over buffers and
/// streams, directly unit-testable without a log capture harness. Only the
/// composition layer (`message`) logs, through a `LogSink` it is handed,
/// once per corruption event, before propagating the typed error.
/// Implementors decide where the structured line goes, or whether it goes
/// anywhere at all (see [`NullLogSink`]).
pub trait LogSink {
    fn corruption(&self, kind: RecordKind, err: &Error);
}

/// Logs one structured `tracing::error!` line per corruption event,
/// including the record kind and, where the error carries them, the
/// expected/actual CRC values or the violated constraint.
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn corruption(&self, kind: RecordKind, err: &Error) {
        match err {
            Error::DataCorrupt {
                expected_crc,
                actual_crc,
                ..
            } => {
                tracing::error!(
                    kind = %kind,
                    expected_crc = %format!("{expected_crc:#010x}"),
                    actual_crc = %format!("{actual_crc:#010x}"),
                    "record failed crc validation"
                );
            }
            Error::UnknownFormatVersion { version, .. } => {
                tracing::error!(
                    kind = %kind,
                    version = %version,
                    "record has an unrecognized format version"
                );
            }
            Error::HeaderConstraintError(reason) => {
                tracing::error!(
                    kind = %kind,
                    reason = %reason,
                    "header failed its cross-field shape constraints"
                );
            }
            Error::Io(io_err) => {
                tracing::error!(
                    kind = %kind,
                    error = %io_err,
                    "io failure while reading or writing a record"
                );
            }
        }
    }
}

/// Discards every event. Useful for callers that already log at a higher
/// layer and want `message`'s entry points to stay silent.
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn corruption(&self, _kind: RecordKind, _err: &Error) {}
}
