//! Error types for archive operations.
//!
//! Every failure is fatal for the read or write call that produced it. The
//! only tolerated irregularity is the forward-compatibility skip performed
//! when a transaction closes, which is not an error at all.

use std::path::PathBuf;
use thiserror::Error;

use crate::scalar::ScalarKind;

/// Broad classification of an [`ArchiveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Underlying stream or file failure.
    Io,
    /// Transaction framing was violated or the substrate structure is broken.
    Framing,
    /// No tag of an object's type hierarchy is registered.
    UnresolvedType,
    /// A scalar could not be decoded from its binary or textual form.
    MalformedScalar,
    /// The caller broke the archive contract (unbalanced transactions,
    /// invalid names, duplicate registrations).
    Usage,
}

/// Errors that can occur when writing or reading an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File I/O error with context.
    #[error("failed to {operation} file: {path}")]
    File {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("failed to move {temp_path} over {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read past the end of the underlying buffer.
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Read would cross the end of the innermost open transaction.
    #[error("read of {needed} bytes at offset {offset} overruns transaction ending at {frame_end}")]
    FrameOverrun {
        offset: usize,
        needed: usize,
        frame_end: usize,
    },

    /// Transaction consumed more bytes than it declared.
    #[error("transaction declared {declared} bytes but {consumed} were consumed")]
    FrameOverread { declared: usize, consumed: usize },

    /// Declared transaction size exceeds the data available to it.
    #[error("transaction at offset {offset} declares {declared} bytes but only {available} remain")]
    FrameTruncated {
        offset: usize,
        declared: usize,
        available: usize,
    },

    /// Object transaction with a zero length field (unpatched write).
    #[error("object frame at offset {offset} is empty")]
    EmptyObjectFrame { offset: usize },

    /// Transaction body does not fit the 32-bit length field.
    #[error("transaction of {size} bytes exceeds the 32-bit length field")]
    FrameTooLarge { size: usize },

    /// Session finished with transactions still open.
    #[error("{open} transaction(s) still open")]
    UnbalancedTransaction { open: usize },

    /// `end_transaction` without a matching `begin_transaction`.
    #[error("no open transaction to end")]
    NoOpenTransaction,

    /// Transaction nesting deeper than the configured limit.
    #[error("transaction nesting exceeds limit of {limit}")]
    DepthExceeded { limit: usize },

    /// Unread data after the root object.
    #[error("{count} unread byte(s) after the root object")]
    TrailingBytes { count: usize },

    /// None of the hierarchy tags is registered.
    #[error("no registered type for hierarchy '{hierarchy}'")]
    UnresolvedType { hierarchy: String },

    /// Type tag registered twice.
    #[error("type tag '{tag}' is already registered")]
    DuplicateType { tag: String },

    /// Type tag that cannot be stored in a hierarchy string.
    #[error("invalid type tag '{tag}'")]
    InvalidTypeTag { tag: String },

    /// Resolved object is not of the requested concrete type.
    #[error("expected object of type {expected}, resolved '{found}'")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    /// Scalar could not be decoded.
    #[error("malformed {kind} field '{field}': {message}")]
    MalformedScalar {
        field: String,
        kind: ScalarKind,
        message: String,
    },

    /// Presence byte other than 0 or 1.
    #[error("invalid presence flag {value:#04x} at offset {offset}")]
    InvalidPresenceFlag { offset: usize, value: u8 },

    /// Null found where a value is required.
    #[error("field '{field}' is null")]
    UnexpectedNull { field: String },

    /// Named element not found in the current XML context.
    #[error("missing element '{name}'")]
    MissingElement { name: String },

    /// Field name that cannot be used as an XML element name.
    #[error("invalid field name '{name}'")]
    InvalidFieldName { name: String },

    /// Substrate returned a scalar of a different kind than requested.
    #[error("expected {expected} for field '{field}', found {found}")]
    KindMismatch {
        field: String,
        expected: ScalarKind,
        found: ScalarKind,
    },

    /// XML parse or render failure.
    #[error("XML error: {message}")]
    Xml { message: String },
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

impl ArchiveError {
    /// Create a MalformedScalar error.
    pub fn malformed(field: impl Into<String>, kind: ScalarKind, message: impl Into<String>) -> Self {
        Self::MalformedScalar {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create an UnexpectedNull error.
    pub fn unexpected_null(field: impl Into<String>) -> Self {
        Self::UnexpectedNull {
            field: field.into(),
        }
    }

    /// Create a MissingElement error.
    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::MissingElement { name: name.into() }
    }

    /// Create an UnresolvedType error.
    pub fn unresolved_type(hierarchy: impl Into<String>) -> Self {
        Self::UnresolvedType {
            hierarchy: hierarchy.into(),
        }
    }

    /// Create an Xml error from any displayable parser or writer failure.
    pub fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }

    /// Map this error onto the framework's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) | Self::File { .. } | Self::AtomicWriteFailed { .. } => ErrorCategory::Io,
            Self::UnexpectedEof { .. }
            | Self::FrameOverrun { .. }
            | Self::FrameOverread { .. }
            | Self::FrameTruncated { .. }
            | Self::EmptyObjectFrame { .. }
            | Self::DepthExceeded { .. }
            | Self::TrailingBytes { .. }
            | Self::MissingElement { .. }
            | Self::Xml { .. } => ErrorCategory::Framing,
            Self::UnresolvedType { .. } => ErrorCategory::UnresolvedType,
            Self::MalformedScalar { .. }
            | Self::InvalidPresenceFlag { .. }
            | Self::UnexpectedNull { .. } => ErrorCategory::MalformedScalar,
            Self::FrameTooLarge { .. }
            | Self::UnbalancedTransaction { .. }
            | Self::NoOpenTransaction
            | Self::DuplicateType { .. }
            | Self::InvalidTypeTag { .. }
            | Self::UnexpectedType { .. }
            | Self::InvalidFieldName { .. }
            | Self::KindMismatch { .. } => ErrorCategory::Usage,
        }
    }

    /// Whether the error indicates corrupted or incompatible input data.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Framing | ErrorCategory::MalformedScalar
        )
    }
}
