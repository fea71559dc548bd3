//! Whole-file archive reading and writing.
//!
//! Writes go to a temporary sibling first and are renamed into place, so an
//! interrupted save never leaves a half-written archive behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::archivable::Archivable;
use crate::binary;
use crate::error::{ArchiveError, Result};
use crate::registry::TypeRegistry;
use crate::xml;

/// Write a binary archive to `path`.
pub fn write_binary_file(path: &Path, value: Option<&dyn Archivable>) -> Result<()> {
    let bytes = binary::to_bytes(value)?;
    write_atomic(path, &bytes)?;
    tracing::info!("Saved binary archive to {}", path.display());
    Ok(())
}

/// Read a binary archive from `path`.
pub fn read_binary_file(path: &Path, registry: &TypeRegistry) -> Result<Option<Box<dyn Archivable>>> {
    let bytes = fs::read(path).map_err(|e| ArchiveError::File {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = binary::from_bytes(&bytes, registry)?;
    tracing::info!("Loaded binary archive from {}", path.display());
    Ok(value)
}

/// Write an XML archive to `path`.
pub fn write_xml_file(path: &Path, value: Option<&dyn Archivable>) -> Result<()> {
    let text = xml::to_string(value)?;
    write_atomic(path, text.as_bytes())?;
    tracing::info!("Saved XML archive to {}", path.display());
    Ok(())
}

/// Read an XML archive from `path`.
pub fn read_xml_file(path: &Path, registry: &TypeRegistry) -> Result<Option<Box<dyn Archivable>>> {
    let text = fs::read_to_string(path).map_err(|e| ArchiveError::File {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = xml::from_str(&text, registry)?;
    tracing::info!("Loaded XML archive from {}", path.display());
    Ok(value)
}

/// `<path>.tmp`, keeping the original extension.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ArchiveError::File {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path(path);
    let mut file = File::create(&temp_path).map_err(|e| ArchiveError::File {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(bytes).map_err(|e| ArchiveError::File {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| ArchiveError::File {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ArchiveError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}
