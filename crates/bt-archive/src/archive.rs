//! Archive contracts.
//!
//! Two layers:
//!
//! - [`WriteSubstrate`] / [`ReadSubstrate`]: the small capability set a
//!   concrete encoding provides (frames, presence flags, scalars, type tags).
//!   The binary and XML archives implement these and nothing else.
//! - [`ArchiveWriter`] / [`ArchiveReader`]: the typed, object-safe API that
//!   [`Archivable`] values are written and read through. Both are
//!   blanket-implemented over the substrate traits, so the object protocol in
//!   [`crate::object`] exists exactly once.

use chrono::{NaiveDate, NaiveDateTime};

use crate::archivable::Archivable;
use crate::calendar::{format_day, format_timestamp, parse_day, parse_timestamp};
use crate::error::{ArchiveError, Result};
use crate::object;
use crate::registry::TypeRegistry;
use crate::scalar::{Scalar, ScalarKind, ScalarValue};

/// What a read-side frame is about to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// An object: always starts with a presence flag, so it is never empty.
    Object,
    /// A caller-defined group of fields.
    Group,
}

/// Write-side capabilities of a concrete encoding.
pub trait WriteSubstrate {
    /// Open a frame whose size is not known yet.
    fn open_frame(&mut self, name: &str) -> Result<()>;

    /// Close the innermost open frame.
    fn close_frame(&mut self) -> Result<()>;

    /// Mark the innermost frame's object as present or absent.
    fn put_presence(&mut self, present: bool) -> Result<()>;

    /// Store the comma-joined type hierarchy of the innermost frame's object.
    fn put_type_hierarchy(&mut self, hierarchy: &str) -> Result<()>;

    /// Write a non-null scalar. Nullable kinds are preceded by their presence flag.
    fn put_scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<()>;

    /// Write an absent value of a nullable kind.
    fn put_null(&mut self, name: &str, kind: ScalarKind) -> Result<()>;

    /// Write a nullable scalar.
    fn put_nullable(&mut self, name: &str, kind: ScalarKind, value: Option<Scalar<'_>>) -> Result<()> {
        match value {
            Some(value) => self.put_scalar(name, value),
            None => self.put_null(name, kind),
        }
    }
}

/// Read-side capabilities of a concrete encoding.
pub trait ReadSubstrate {
    /// Registry used to resolve object type hierarchies.
    fn registry(&self) -> &TypeRegistry;

    /// Enter the next frame named `name`.
    fn open_frame(&mut self, name: &str, kind: FrameKind) -> Result<()>;

    /// Leave the innermost frame, skipping whatever was not read.
    fn close_frame(&mut self) -> Result<()>;

    /// Whether the innermost frame still holds unread content.
    fn frame_has_remaining(&self) -> bool;

    /// Read the innermost frame's presence marker.
    fn take_presence(&mut self) -> Result<bool>;

    /// Read the innermost frame's comma-joined type hierarchy.
    fn take_type_hierarchy(&mut self) -> Result<String>;

    /// Read a scalar of `kind`. `None` means the value was absent.
    fn take_scalar(&mut self, name: &str, kind: ScalarKind) -> Result<Option<ScalarValue>>;
}

/// Typed write API used by [`Archivable::write_fields`].
pub trait ArchiveWriter {
    /// Begin a caller-defined transaction.
    fn begin_transaction(&mut self, name: &str) -> Result<()>;

    /// End the innermost transaction.
    fn end_transaction(&mut self) -> Result<()>;

    fn write_i8(&mut self, name: &str, value: i8) -> Result<()>;

    fn write_i32(&mut self, name: &str, value: i32) -> Result<()>;

    fn write_i64(&mut self, name: &str, value: Option<i64>) -> Result<()>;

    fn write_f32(&mut self, name: &str, value: f32) -> Result<()>;

    fn write_f64(&mut self, name: &str, value: Option<f64>) -> Result<()>;

    fn write_bool(&mut self, name: &str, value: Option<bool>) -> Result<()>;

    fn write_string(&mut self, name: &str, value: Option<&str>) -> Result<()>;

    fn write_bytes(&mut self, name: &str, value: Option<&[u8]>) -> Result<()>;

    /// Write a possibly-null polymorphic object.
    fn write_object(&mut self, name: &str, value: Option<&dyn Archivable>) -> Result<()>;

    /// Write a sequence of non-null objects.
    fn write_object_list(&mut self, name: &str, items: &[&dyn Archivable]) -> Result<()>;

    /// Write a timestamp through its canonical string form.
    fn write_timestamp(&mut self, name: &str, value: Option<NaiveDateTime>) -> Result<()> {
        self.write_string(name, value.map(format_timestamp).as_deref())
    }

    /// Write a calendar day through its canonical string form.
    fn write_day(&mut self, name: &str, value: Option<NaiveDate>) -> Result<()> {
        self.write_string(name, value.map(format_day).as_deref())
    }
}

/// Typed read API used by [`Archivable::read_fields`].
pub trait ArchiveReader {
    /// Begin a caller-defined transaction.
    fn begin_transaction(&mut self, name: &str) -> Result<()>;

    /// End the innermost transaction, skipping unread content.
    fn end_transaction(&mut self) -> Result<()>;

    /// Whether the innermost transaction still holds unread fields.
    ///
    /// Lets a value read a field that older data may not contain.
    fn has_remaining(&self) -> bool;

    fn read_i8(&mut self, name: &str) -> Result<i8>;

    fn read_i32(&mut self, name: &str) -> Result<i32>;

    fn read_i64(&mut self, name: &str) -> Result<Option<i64>>;

    fn read_f32(&mut self, name: &str) -> Result<f32>;

    fn read_f64(&mut self, name: &str) -> Result<Option<f64>>;

    fn read_bool(&mut self, name: &str) -> Result<Option<bool>>;

    fn read_string(&mut self, name: &str) -> Result<Option<String>>;

    fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Read a possibly-null polymorphic object.
    fn read_object(&mut self, name: &str) -> Result<Option<Box<dyn Archivable>>>;

    /// Read a sequence written by [`ArchiveWriter::write_object_list`].
    fn read_object_list(&mut self, name: &str) -> Result<Vec<Box<dyn Archivable>>>;

    /// Read a timestamp from its canonical string form.
    fn read_timestamp(&mut self, name: &str) -> Result<Option<NaiveDateTime>> {
        match self.read_string(name)? {
            Some(text) => parse_timestamp(&text)
                .map(Some)
                .map_err(|e| ArchiveError::malformed(name, ScalarKind::Str, format!("{e}: '{text}'"))),
            None => Ok(None),
        }
    }

    /// Read a calendar day from its canonical string form.
    fn read_day(&mut self, name: &str) -> Result<Option<NaiveDate>> {
        match self.read_string(name)? {
            Some(text) => parse_day(&text)
                .map(Some)
                .map_err(|e| ArchiveError::malformed(name, ScalarKind::Str, format!("{e}: '{text}'"))),
            None => Ok(None),
        }
    }
}

impl dyn ArchiveReader + '_ {
    /// Read an object and downcast it to `T`.
    pub fn read_object_as<T: Archivable>(&mut self, name: &str) -> Result<Option<T>> {
        match self.read_object(name)? {
            Some(value) => object::downcast_object::<T>(value).map(Some),
            None => Ok(None),
        }
    }

    /// Read an object list and downcast every item to `T`.
    pub fn read_object_list_as<T: Archivable>(&mut self, name: &str) -> Result<Vec<T>> {
        self.read_object_list(name)?
            .into_iter()
            .map(object::downcast_object::<T>)
            .collect()
    }
}

/// Error for a substrate answer that does not match the requested kind.
pub(crate) fn kind_mismatch(name: &str, expected: ScalarKind, found: Option<ScalarValue>) -> ArchiveError {
    match found {
        Some(value) => ArchiveError::KindMismatch {
            field: name.to_string(),
            expected,
            found: value.kind(),
        },
        None => ArchiveError::unexpected_null(name),
    }
}

impl<S: WriteSubstrate> ArchiveWriter for S {
    fn begin_transaction(&mut self, name: &str) -> Result<()> {
        self.open_frame(name)
    }

    fn end_transaction(&mut self) -> Result<()> {
        self.close_frame()
    }

    fn write_i8(&mut self, name: &str, value: i8) -> Result<()> {
        self.put_scalar(name, Scalar::I8(value))
    }

    fn write_i32(&mut self, name: &str, value: i32) -> Result<()> {
        self.put_scalar(name, Scalar::I32(value))
    }

    fn write_i64(&mut self, name: &str, value: Option<i64>) -> Result<()> {
        self.put_nullable(name, ScalarKind::I64, value.map(Scalar::I64))
    }

    fn write_f32(&mut self, name: &str, value: f32) -> Result<()> {
        self.put_scalar(name, Scalar::F32(value))
    }

    fn write_f64(&mut self, name: &str, value: Option<f64>) -> Result<()> {
        self.put_nullable(name, ScalarKind::F64, value.map(Scalar::F64))
    }

    fn write_bool(&mut self, name: &str, value: Option<bool>) -> Result<()> {
        self.put_nullable(name, ScalarKind::Bool, value.map(Scalar::Bool))
    }

    fn write_string(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.put_nullable(name, ScalarKind::Str, value.map(Scalar::Str))
    }

    fn write_bytes(&mut self, name: &str, value: Option<&[u8]>) -> Result<()> {
        self.put_nullable(name, ScalarKind::Bytes, value.map(Scalar::Bytes))
    }

    fn write_object(&mut self, name: &str, value: Option<&dyn Archivable>) -> Result<()> {
        object::write_object(self, name, value)
    }

    fn write_object_list(&mut self, name: &str, items: &[&dyn Archivable]) -> Result<()> {
        object::write_object_list(self, name, items)
    }
}

impl<S: ReadSubstrate> ArchiveReader for S {
    fn begin_transaction(&mut self, name: &str) -> Result<()> {
        self.open_frame(name, FrameKind::Group)
    }

    fn end_transaction(&mut self) -> Result<()> {
        self.close_frame()
    }

    fn has_remaining(&self) -> bool {
        self.frame_has_remaining()
    }

    fn read_i8(&mut self, name: &str) -> Result<i8> {
        match self.take_scalar(name, ScalarKind::I8)? {
            Some(ScalarValue::I8(v)) => Ok(v),
            other => Err(kind_mismatch(name, ScalarKind::I8, other)),
        }
    }

    fn read_i32(&mut self, name: &str) -> Result<i32> {
        match self.take_scalar(name, ScalarKind::I32)? {
            Some(ScalarValue::I32(v)) => Ok(v),
            other => Err(kind_mismatch(name, ScalarKind::I32, other)),
        }
    }

    fn read_i64(&mut self, name: &str) -> Result<Option<i64>> {
        match self.take_scalar(name, ScalarKind::I64)? {
            None => Ok(None),
            Some(ScalarValue::I64(v)) => Ok(Some(v)),
            other => Err(kind_mismatch(name, ScalarKind::I64, other)),
        }
    }

    fn read_f32(&mut self, name: &str) -> Result<f32> {
        match self.take_scalar(name, ScalarKind::F32)? {
            Some(ScalarValue::F32(v)) => Ok(v),
            other => Err(kind_mismatch(name, ScalarKind::F32, other)),
        }
    }

    fn read_f64(&mut self, name: &str) -> Result<Option<f64>> {
        match self.take_scalar(name, ScalarKind::F64)? {
            None => Ok(None),
            Some(ScalarValue::F64(v)) => Ok(Some(v)),
            other => Err(kind_mismatch(name, ScalarKind::F64, other)),
        }
    }

    fn read_bool(&mut self, name: &str) -> Result<Option<bool>> {
        match self.take_scalar(name, ScalarKind::Bool)? {
            None => Ok(None),
            Some(ScalarValue::Bool(v)) => Ok(Some(v)),
            other => Err(kind_mismatch(name, ScalarKind::Bool, other)),
        }
    }

    fn read_string(&mut self, name: &str) -> Result<Option<String>> {
        match self.take_scalar(name, ScalarKind::Str)? {
            None => Ok(None),
            Some(ScalarValue::Str(v)) => Ok(Some(v)),
            other => Err(kind_mismatch(name, ScalarKind::Str, other)),
        }
    }

    fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        match self.take_scalar(name, ScalarKind::Bytes)? {
            None => Ok(None),
            Some(ScalarValue::Bytes(v)) => Ok(Some(v)),
            other => Err(kind_mismatch(name, ScalarKind::Bytes, other)),
        }
    }

    fn read_object(&mut self, name: &str) -> Result<Option<Box<dyn Archivable>>> {
        object::read_object(self, name)
    }

    fn read_object_list(&mut self, name: &str) -> Result<Vec<Box<dyn Archivable>>> {
        object::read_object_list(self, name)
    }
}
