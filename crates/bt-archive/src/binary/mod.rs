//! Binary substrate.
//!
//! A flat big-endian byte stream. Every object and caller-defined
//! transaction is prefixed with its body length, so readers can skip what
//! they do not understand.
//!
//! ```text
//! value(nullable T) ::= flag:u8 (flag==0 | flag==1 payload(T))
//! string            ::= value(nullable) of (len:u32 bytes[len])
//! object            ::= transaction{ flag:u8 (flag==1 hierarchy:string fields...) }
//! transaction       ::= size:u32 body[size]
//! ```

mod buffer;
mod reader;
mod writer;

pub use buffer::PatchBuffer;
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use crate::archivable::Archivable;
use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::Result;
use crate::object::ROOT_FIELD;
use crate::options::{BinaryReaderOptions, BinaryWriterOptions};
use crate::registry::TypeRegistry;

/// Width of a transaction or string length prefix.
pub(crate) const LENGTH_WIDTH: usize = 4;

/// Presence byte of an absent value.
pub(crate) const NULL_FLAG: u8 = 0;

/// Presence byte of a present value.
pub(crate) const PRESENT_FLAG: u8 = 1;

/// Encode a possibly-null object.
pub fn to_bytes(value: Option<&dyn Archivable>) -> Result<Vec<u8>> {
    to_bytes_with_options(value, BinaryWriterOptions::default())
}

/// Encode a possibly-null object with options.
pub fn to_bytes_with_options(
    value: Option<&dyn Archivable>,
    options: BinaryWriterOptions,
) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::with_options(options);
    writer.write_object(ROOT_FIELD, value)?;
    let bytes = writer.finish()?;
    tracing::debug!(bytes = bytes.len(), "Encoded binary archive");
    Ok(bytes)
}

/// Decode an object written by [`to_bytes`].
pub fn from_bytes(data: &[u8], registry: &TypeRegistry) -> Result<Option<Box<dyn Archivable>>> {
    from_bytes_with_options(data, registry, BinaryReaderOptions::default())
}

/// Decode an object written by [`to_bytes`] with options.
pub fn from_bytes_with_options(
    data: &[u8],
    registry: &TypeRegistry,
    options: BinaryReaderOptions,
) -> Result<Option<Box<dyn Archivable>>> {
    let mut reader = BinaryReader::with_options(data, registry, options);
    let value = reader.read_object(ROOT_FIELD)?;
    reader.finish()?;
    tracing::debug!(bytes = data.len(), "Decoded binary archive");
    Ok(value)
}
