//! Tests for whole-file archive reading and writing.

mod common;

use std::fs;

use bt_archive::{
    ArchiveError, ErrorCategory, read_binary_file, read_xml_file, write_binary_file,
    write_xml_file,
};
use common::{Portfolio, init_tracing, registry, sample_portfolio};
use tempfile::tempdir;

#[test]
fn test_binary_file_roundtrip() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("books").join("2024").join("portfolio.bta");
    let portfolio = sample_portfolio();

    write_binary_file(&path, Some(&portfolio)).unwrap();
    assert!(path.exists());
    assert!(!dir.path().join("books/2024/portfolio.bta.tmp").exists());

    let value = read_binary_file(&path, &registry())
        .unwrap()
        .and_then(|v| v.downcast::<Portfolio>());
    assert_eq!(value.as_deref(), Some(&portfolio));
}

#[test]
fn test_xml_file_roundtrip() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("portfolio.xml");
    let portfolio = sample_portfolio();

    write_xml_file(&path, Some(&portfolio)).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml"));

    let value = read_xml_file(&path, &registry())
        .unwrap()
        .and_then(|v| v.downcast::<Portfolio>());
    assert_eq!(value.as_deref(), Some(&portfolio));
}

#[test]
fn test_overwrite_replaces_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("portfolio.bta");

    write_binary_file(&path, Some(&sample_portfolio())).unwrap();
    let first = fs::metadata(&path).unwrap().len();

    let empty = Portfolio::default();
    write_binary_file(&path, Some(&empty)).unwrap();
    assert!(fs::metadata(&path).unwrap().len() < first);

    let value = read_binary_file(&path, &registry())
        .unwrap()
        .and_then(|v| v.downcast::<Portfolio>());
    assert_eq!(value.as_deref(), Some(&empty));
}

#[test]
fn test_missing_files() {
    let dir = tempdir().unwrap();
    let registry = registry();

    let err = read_binary_file(&dir.path().join("absent.bta"), &registry).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
    assert!(!err.is_data_error());

    let err = read_xml_file(&dir.path().join("absent.xml"), &registry).unwrap_err();
    assert!(matches!(err, ArchiveError::File { operation: "read", .. }));
}

#[test]
fn test_corrupted_files() {
    let dir = tempdir().unwrap();
    let registry = registry();

    let path = dir.path().join("portfolio.bta");
    write_binary_file(&path, Some(&sample_portfolio())).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&path, &bytes).unwrap();
    let err = read_binary_file(&path, &registry).unwrap_err();
    assert!(err.is_data_error(), "{err}");

    let path = dir.path().join("portfolio.xml");
    fs::write(&path, "<document><root type=\"Portfolio\">").unwrap();
    let err = read_xml_file(&path, &registry).unwrap_err();
    assert!(err.is_data_error(), "{err}");
}
