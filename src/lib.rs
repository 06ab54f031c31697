mod blob;
mod blob_properties;
mod crc;
mod delete;
mod diagnostics;
mod error;
mod framed_reader;
mod header;
mod message;
mod properties;
mod user_metadata;
mod version;

pub use blob::BlobOutput;
pub use diagnostics::{LogSink, NullLogSink, TracingLogSink};
pub use error::{Error, Result};
pub use framed_reader::FramedReader;
pub use header::{HeaderView, INVALID};
pub use message::{
    deserialize_blob, deserialize_blob_properties, deserialize_delete, deserialize_user_metadata,
    parse_header, serialize_delete_message, serialize_put_message, verify_header,
};
pub use properties::{PropertiesSerde, RawProperties, RawPropertiesSerde};
pub use version::RecordKind;
