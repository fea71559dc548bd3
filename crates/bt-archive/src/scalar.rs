//! Scalar kinds and values shared by both substrates.
//!
//! Substrates exchange scalars through [`Scalar`] (borrowed, for writes) and
//! [`ScalarValue`] (owned, for reads). The textual forms defined here are the
//! canonical representation used by the XML substrate.

use std::borrow::Cow;
use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

/// The primitive types an archive can carry.
///
/// | Kind    | Nullable | Binary payload              |
/// |---------|----------|-----------------------------|
/// | `I8`    | no       | 1 byte                      |
/// | `I32`   | no       | 4 bytes, big-endian         |
/// | `I64`   | yes      | 8 bytes, big-endian         |
/// | `F32`   | no       | 4 bytes, IEEE-754 BE        |
/// | `F64`   | yes      | 8 bytes, IEEE-754 BE        |
/// | `Bool`  | yes      | 1 byte (0 or 1)             |
/// | `Str`   | yes      | u32 length + UTF-8 bytes    |
/// | `Bytes` | yes      | u32 length + raw bytes      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Str,
    Bytes,
}

impl ScalarKind {
    /// Whether values of this kind carry a presence flag.
    #[must_use]
    pub const fn is_nullable(self) -> bool {
        !matches!(self, Self::I8 | Self::I32 | Self::F32)
    }

    /// Payload width in bytes, or `None` for length-prefixed kinds.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::I8 | Self::Bool => Some(1),
            Self::I32 | Self::F32 => Some(4),
            Self::I64 | Self::F64 => Some(8),
            Self::Str | Self::Bytes => None,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Str => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed scalar handed to a substrate for writing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    I8(i8),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> Scalar<'a> {
    /// The kind of this scalar.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::I8(_) => ScalarKind::I8,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Str(_) => ScalarKind::Str,
            Self::Bytes(_) => ScalarKind::Bytes,
        }
    }

    /// Canonical text form.
    ///
    /// Floats use the shortest representation that parses back to the same
    /// value; blobs are standard base64 with padding.
    #[must_use]
    pub fn to_text(&self) -> Cow<'a, str> {
        match *self {
            Self::I8(v) => Cow::Owned(v.to_string()),
            Self::I32(v) => Cow::Owned(v.to_string()),
            Self::I64(v) => Cow::Owned(v.to_string()),
            Self::F32(v) => Cow::Owned(v.to_string()),
            Self::F64(v) => Cow::Owned(v.to_string()),
            Self::Bool(v) => Cow::Borrowed(if v { "true" } else { "false" }),
            Self::Str(v) => Cow::Borrowed(v),
            Self::Bytes(v) => Cow::Owned(BASE64.encode(v)),
        }
    }
}

/// An owned scalar produced by a substrate read.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    I8(i8),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        self.as_scalar().kind()
    }

    /// Borrow as a [`Scalar`].
    #[must_use]
    pub fn as_scalar(&self) -> Scalar<'_> {
        match self {
            Self::I8(v) => Scalar::I8(*v),
            Self::I32(v) => Scalar::I32(*v),
            Self::I64(v) => Scalar::I64(*v),
            Self::F32(v) => Scalar::F32(*v),
            Self::F64(v) => Scalar::F64(*v),
            Self::Bool(v) => Scalar::Bool(*v),
            Self::Str(v) => Scalar::Str(v),
            Self::Bytes(v) => Scalar::Bytes(v),
        }
    }

    /// Parse the canonical text form of `kind`.
    ///
    /// Returns the parser's message on failure; callers attach the field name.
    pub fn from_text(kind: ScalarKind, text: &str) -> Result<Self, String> {
        match kind {
            ScalarKind::I8 => text.parse().map(Self::I8).map_err(|e| e.to_string()),
            ScalarKind::I32 => text.parse().map(Self::I32).map_err(|e| e.to_string()),
            ScalarKind::I64 => text.parse().map(Self::I64).map_err(|e| e.to_string()),
            ScalarKind::F32 => text.parse().map(Self::F32).map_err(|e| e.to_string()),
            ScalarKind::F64 => text.parse().map(Self::F64).map_err(|e| e.to_string()),
            ScalarKind::Bool => match text {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                other => Err(format!("expected 'true' or 'false', found '{other}'")),
            },
            ScalarKind::Str => Ok(Self::Str(text.to_string())),
            ScalarKind::Bytes => {
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                BASE64
                    .decode(compact)
                    .map(Self::Bytes)
                    .map_err(|e| e.to_string())
            }
        }
    }
}

impl From<Scalar<'_>> for ScalarValue {
    fn from(scalar: Scalar<'_>) -> Self {
        match scalar {
            Scalar::I8(v) => Self::I8(v),
            Scalar::I32(v) => Self::I32(v),
            Scalar::I64(v) => Self::I64(v),
            Scalar::F32(v) => Self::F32(v),
            Scalar::F64(v) => Self::F64(v),
            Scalar::Bool(v) => Self::Bool(v),
            Scalar::Str(v) => Self::Str(v.to_string()),
            Scalar::Bytes(v) => Self::Bytes(v.to_vec()),
        }
    }
}
