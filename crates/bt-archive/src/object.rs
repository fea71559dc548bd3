//! The object protocol shared by every substrate.
//!
//! An object is one frame holding a presence marker and, when present, the
//! comma-joined type hierarchy followed by the value's own fields. Readers
//! resolve the hierarchy against a [`TypeRegistry`](crate::TypeRegistry) by
//! probing tags in order, so older readers fall back to an ancestor they know
//! and skip the fields they do not.

use crate::archivable::{Archivable, check_hierarchy, join_hierarchy};
use crate::archive::{ArchiveReader, ArchiveWriter, FrameKind, ReadSubstrate, WriteSubstrate};
use crate::error::{ArchiveError, Result};
use crate::scalar::ScalarKind;

/// Field name of the top-level object.
pub const ROOT_FIELD: &str = "root";

/// Field name of an object list's length.
pub const COUNT_FIELD: &str = "count";

/// Field name of each object list entry.
pub const ITEM_FIELD: &str = "item";

/// Field name reported for hierarchy decoding errors.
const TYPE_FIELD: &str = "type";

/// Upper bound on list capacity reserved from an untrusted count.
const MAX_PREALLOCATED_ITEMS: usize = 1024;

pub(crate) fn write_object<S: WriteSubstrate>(
    out: &mut S,
    name: &str,
    value: Option<&dyn Archivable>,
) -> Result<()> {
    out.open_frame(name)?;
    match value {
        None => out.put_presence(false)?,
        Some(value) => {
            let hierarchy = join_hierarchy(value.type_hierarchy())?;
            out.put_presence(true)?;
            out.put_type_hierarchy(&hierarchy)?;
            value.write_fields(out)?;
        }
    }
    out.close_frame()
}

pub(crate) fn read_object<S: ReadSubstrate>(
    input: &mut S,
    name: &str,
) -> Result<Option<Box<dyn Archivable>>> {
    input.open_frame(name, FrameKind::Object)?;
    if !input.take_presence()? {
        input.close_frame()?;
        return Ok(None);
    }

    let hierarchy = input.take_type_hierarchy()?;
    if let Err(err) = check_hierarchy(&hierarchy) {
        return Err(ArchiveError::malformed(
            TYPE_FIELD,
            ScalarKind::Str,
            format!("{err} in hierarchy '{hierarchy}'"),
        ));
    }

    let mut value = input.registry().instantiate(&hierarchy)?;
    value.read_fields(input)?;
    input.close_frame()?;
    Ok(Some(value))
}

pub(crate) fn write_object_list<S: WriteSubstrate>(
    out: &mut S,
    name: &str,
    items: &[&dyn Archivable],
) -> Result<()> {
    let count = list_count(items.len())?;
    out.open_frame(name)?;
    out.write_i32(COUNT_FIELD, count)?;
    for item in items {
        write_object(out, ITEM_FIELD, Some(*item))?;
    }
    out.close_frame()
}

/// Item count as stored in the `count` field.
fn list_count(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        ArchiveError::malformed(
            COUNT_FIELD,
            ScalarKind::I32,
            format!("{len} items exceed the i32 count range"),
        )
    })
}

pub(crate) fn read_object_list<S: ReadSubstrate>(
    input: &mut S,
    name: &str,
) -> Result<Vec<Box<dyn Archivable>>> {
    input.open_frame(name, FrameKind::Group)?;
    let count = input.read_i32(COUNT_FIELD)?;
    let count = usize::try_from(count).map_err(|_| {
        ArchiveError::malformed(COUNT_FIELD, ScalarKind::I32, format!("negative count {count}"))
    })?;

    let mut items = Vec::with_capacity(count.min(MAX_PREALLOCATED_ITEMS));
    for _ in 0..count {
        let item = read_object(input, ITEM_FIELD)?.ok_or_else(|| ArchiveError::unexpected_null(ITEM_FIELD))?;
        items.push(item);
    }
    input.close_frame()?;
    Ok(items)
}

/// Convert a resolved object into the concrete type `T`.
pub(crate) fn downcast_object<T: Archivable>(value: Box<dyn Archivable>) -> Result<T> {
    let found = value.type_tag().to_string();
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .ok_or(ArchiveError::UnexpectedType {
            expected: std::any::type_name::<T>(),
            found,
        })
}
