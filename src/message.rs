use std::io::Read;

use crate::blob::{self, BlobOutput};
use crate::blob_properties;
use crate::delete;
use crate::diagnostics::LogSink;
use crate::error::{Error, Result};
use crate::framed_reader::FramedReader;
use crate::header::{self, HeaderView, INVALID};
use crate::properties::PropertiesSerde;
use crate::user_metadata;
use crate::version::RecordKind;

/// Logs `result`'s error through `sink` before handing it back to the
/// caller. The only place in this module that calls into
/// [`crate::diagnostics`]; every codec it wraps stays pure.
fn logged<T>(sink: &impl LogSink, kind: RecordKind, result: Result<T>) -> Result<T> {
    result.map_err(|err| {
        sink.corruption(kind, &err);
        err
    })
}

/// Assembles a put-message (header + BlobProperties + UserMetadata + Blob)
/// into `buf`. The blob content is streamed from `blob_source` rather than
/// required to already be in memory, mirroring [`blob::serialize_partial`]'s
/// zero-copy intent. Returns the number of bytes written. This and the
/// other entry points in this module are the two producer entry points and
/// four consumer entry points that form the crate's public library surface.
pub fn serialize_put_message<P: PropertiesSerde>(
    buf: &mut [u8],
    properties: &P::Properties,
    user_metadata_bytes: &[u8],
    blob_size: i64,
    blob_source: &mut impl Read,
    sink: &impl LogSink,
) -> Result<usize> {
    if blob_size < 0 || blob_size > i32::MAX as i64 {
        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("blob size {blob_size} is out of range 0..={}", i32::MAX),
        ));
        sink.corruption(RecordKind::Blob, &err);
        return Err(err);
    }

    let bp_size = blob_properties::size::<P>(properties);
    let um_size = user_metadata::size(user_metadata_bytes.len());
    let blob_record_size = blob::size(blob_size as usize);
    let total_size = (bp_size + um_size + blob_record_size) as u64;

    let header_size = header::HEADER_SIZE;
    let off_bp = header_size as i32;
    let off_um = off_bp + bp_size as i32;
    let off_blob = off_um + um_size as i32;

    if buf.len() < header_size + bp_size + um_size + blob_record_size {
        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            "output buffer too small for put-message",
        ));
        sink.corruption(RecordKind::Header, &err);
        return Err(err);
    }

    logged(
        sink,
        RecordKind::Header,
        header::serialize(buf, total_size, off_bp, INVALID, off_um, off_blob),
    )?;

    let mut pos = header_size;
    pos += logged(
        sink,
        RecordKind::BlobProperties,
        blob_properties::serialize::<P>(&mut buf[pos..], properties),
    )?;
    pos += logged(
        sink,
        RecordKind::UserMetadata,
        user_metadata::serialize(&mut buf[pos..], user_metadata_bytes),
    )?;

    let blob_record_start = pos;
    let prefix_len = logged(
        sink,
        RecordKind::Blob,
        blob::serialize_partial(&mut buf[pos..], blob_size),
    )?;
    pos += prefix_len;

    let content_len = blob_size as usize;
    blob_source
        .read_exact(&mut buf[pos..pos + content_len])
        .map_err(|io_err| {
            let err = Error::Io(io_err);
            sink.corruption(RecordKind::Blob, &err);
            err
        })?;
    pos += content_len;

    let crc = crc32fast::hash(&buf[blob_record_start..pos]) as u64;
    buf[pos..pos + 8].copy_from_slice(&crc.to_be_bytes());
    pos += 8;

    Ok(pos)
}

/// Assembles a delete-message (header + Delete) into `buf`. Returns the
/// number of bytes written.
pub fn serialize_delete_message(buf: &mut [u8], flag: bool, sink: &impl LogSink) -> Result<usize> {
    let header_size = header::HEADER_SIZE;
    let total_size = delete::size() as u64;
    let off_delete = header_size as i32;

    logged(
        sink,
        RecordKind::Header,
        header::serialize(buf, total_size, INVALID, off_delete, INVALID, INVALID),
    )?;

    let written = logged(
        sink,
        RecordKind::Delete,
        delete::serialize(&mut buf[header_size..], flag),
    )?;
    Ok(header_size + written)
}

/// Parses a header-only view without reading or validating anything past
/// the header bytes.
pub fn parse_header(bytes: &[u8]) -> Result<HeaderView<'_>> {
    header::parse(bytes)
}

/// Verifies a parsed header's CRC and cross-field constraints, logging the
/// corruption event (if any) before returning it.
pub fn verify_header(view: &HeaderView, sink: &impl LogSink) -> Result<()> {
    logged(sink, RecordKind::Header, header::verify(view))
}

pub fn deserialize_blob_properties<P: PropertiesSerde, R: Read>(
    reader: &mut FramedReader<R>,
    sink: &impl LogSink,
) -> Result<P::Properties> {
    logged(
        sink,
        RecordKind::BlobProperties,
        blob_properties::deserialize::<P, R>(reader),
    )
}

pub fn deserialize_user_metadata<R: Read>(
    reader: &mut FramedReader<R>,
    sink: &impl LogSink,
) -> Result<Vec<u8>> {
    logged(sink, RecordKind::UserMetadata, user_metadata::deserialize(reader))
}

pub fn deserialize_blob<R: Read>(
    reader: &mut FramedReader<R>,
    sink: &impl LogSink,
) -> Result<BlobOutput<'_, R>> {
    logged(sink, RecordKind::Blob, blob::deserialize(reader))
}

pub fn deserialize_delete<R: Read>(reader: &mut FramedReader<R>, sink: &impl LogSink) -> Result<bool> {
    logged(sink, RecordKind::Delete, delete::deserialize(reader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullLogSink;
    use crate::properties::{RawProperties, RawPropertiesSerde};

    #[test]
    fn put_message_round_trips() {
        let properties = RawProperties(vec![1, 2, 3]);
        let user_metadata_bytes = b"metadata";
        let blob_content = b"the blob's content";

        let bp_size = blob_properties::size::<RawPropertiesSerde>(&properties);
        let um_size = user_metadata::size(user_metadata_bytes.len());
        let blob_record_size = blob::size(blob_content.len());
        let mut buf = vec![0u8; header::HEADER_SIZE + bp_size + um_size + blob_record_size];

        let mut blob_source: &[u8] = blob_content;
        let written = serialize_put_message::<RawPropertiesSerde>(
            &mut buf,
            &properties,
            user_metadata_bytes,
            blob_content.len() as i64,
            &mut blob_source,
            &NullLogSink,
        )
        .unwrap();
        assert_eq!(written, buf.len());

        let view = parse_header(&buf).unwrap();
        verify_header(&view, &NullLogSink).unwrap();
        assert_eq!(view.blob_properties_rel_off(), header::HEADER_SIZE as i32);

        let mut reader = FramedReader::new(&buf[header::HEADER_SIZE..]);
        let decoded_properties =
            deserialize_blob_properties::<RawPropertiesSerde, _>(&mut reader, &NullLogSink).unwrap();
        assert_eq!(decoded_properties, properties);

        let decoded_user_metadata = deserialize_user_metadata(&mut reader, &NullLogSink).unwrap();
        assert_eq!(decoded_user_metadata, user_metadata_bytes);

        let blob_output = deserialize_blob(&mut reader, &NullLogSink).unwrap();
        let decoded_blob = blob_output.read_content().unwrap();
        assert_eq!(decoded_blob, blob_content);
    }

    #[test]
    fn delete_message_round_trips() {
        let mut buf = vec![0u8; header::HEADER_SIZE + delete::size()];
        let written = serialize_delete_message(&mut buf, true, &NullLogSink).unwrap();
        assert_eq!(written, buf.len());

        let view = parse_header(&buf).unwrap();
        verify_header(&view, &NullLogSink).unwrap();
        assert_eq!(view.delete_rel_off(), header::HEADER_SIZE as i32);

        let mut reader = FramedReader::new(&buf[header::HEADER_SIZE..]);
        assert!(deserialize_delete(&mut reader, &NullLogSink).unwrap());
    }

    #[test]
    fn rejects_oversized_blob_before_writing_content() {
        let properties = RawProperties(vec![]);
        let mut buf = vec![0u8; 1024];
        let mut blob_source: &[u8] = &[];
        let err = serialize_put_message::<RawPropertiesSerde>(
            &mut buf,
            &properties,
            b"",
            0x8000_0000i64,
            &mut blob_source,
            &NullLogSink,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
