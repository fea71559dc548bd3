//! Binary archive reader.

use crate::archive::{FrameKind, ReadSubstrate};
use crate::error::{ArchiveError, Result};
use crate::options::BinaryReaderOptions;
use crate::registry::TypeRegistry;
use crate::scalar::{ScalarKind, ScalarValue};

use super::{LENGTH_WIDTH, NULL_FLAG, PRESENT_FLAG};

/// An open transaction on the read side.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Offset of the first body byte.
    body_start: usize,
    /// Body size from the length prefix.
    declared: usize,
}

impl Frame {
    fn end(&self) -> usize {
        self.body_start + self.declared
    }
}

/// Reads an archive from a byte slice.
///
/// Reads never cross the end of the innermost open transaction. Closing a
/// transaction skips whatever its body still holds, which is how readers
/// tolerate fields added by newer writers.
#[derive(Debug)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    frames: Vec<Frame>,
    registry: &'a TypeRegistry,
    options: BinaryReaderOptions,
}

impl<'a> BinaryReader<'a> {
    /// Create a reader with default options.
    pub fn new(data: &'a [u8], registry: &'a TypeRegistry) -> Self {
        Self::with_options(data, registry, BinaryReaderOptions::default())
    }

    /// Create a reader with options.
    pub fn with_options(data: &'a [u8], registry: &'a TypeRegistry, options: BinaryReaderOptions) -> Self {
        Self {
            data,
            pos: 0,
            frames: Vec::new(),
            registry,
            options,
        }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check that every transaction was closed and, unless allowed, that no
    /// bytes are left.
    pub fn finish(self) -> Result<()> {
        if !self.frames.is_empty() {
            return Err(ArchiveError::UnbalancedTransaction {
                open: self.frames.len(),
            });
        }
        let count = self.data.len() - self.pos;
        if count > 0 && !self.options.allow_trailing_bytes {
            return Err(ArchiveError::TrailingBytes { count });
        }
        Ok(())
    }

    /// End of the region reads may currently touch.
    fn limit(&self) -> usize {
        self.frames.last().map_or(self.data.len(), Frame::end)
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
        let offset = self.pos;
        let end = offset.saturating_add(needed);
        if let Some(frame) = self.frames.last()
            && end > frame.end()
        {
            return Err(ArchiveError::FrameOverrun {
                offset,
                needed,
                frame_end: frame.end(),
            });
        }
        if end > self.data.len() {
            return Err(ArchiveError::UnexpectedEof {
                offset,
                needed,
                available: self.data.len() - offset,
            });
        }
        let data = self.data;
        self.pos = end;
        Ok(&data[offset..end])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn take_length(&mut self) -> Result<usize> {
        let len = u32::from_be_bytes(self.take_array()?);
        Ok(len as usize)
    }

    fn take_blob(&mut self) -> Result<&'a [u8]> {
        let len = self.take_length()?;
        self.take(len)
    }
}

impl ReadSubstrate for BinaryReader<'_> {
    fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    fn open_frame(&mut self, _name: &str, kind: FrameKind) -> Result<()> {
        if self.frames.len() >= self.options.max_depth {
            return Err(ArchiveError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }

        let offset = self.pos;
        let declared = self.take_length()?;
        let available = self.limit() - self.pos;
        if declared > available {
            return Err(ArchiveError::FrameTruncated {
                offset,
                declared,
                available,
            });
        }
        if declared == 0 && kind == FrameKind::Object {
            return Err(ArchiveError::EmptyObjectFrame { offset });
        }

        self.frames.push(Frame {
            body_start: offset + LENGTH_WIDTH,
            declared,
        });
        Ok(())
    }

    fn close_frame(&mut self) -> Result<()> {
        let frame = self.frames.pop().ok_or(ArchiveError::NoOpenTransaction)?;
        let consumed = self.pos - frame.body_start;
        if consumed > frame.declared {
            return Err(ArchiveError::FrameOverread {
                declared: frame.declared,
                consumed,
            });
        }
        let remaining = frame.declared - consumed;
        if remaining > 0 {
            tracing::trace!(
                offset = self.pos,
                skipped = remaining,
                "Skipped unread transaction bytes"
            );
        }
        self.pos = frame.end();
        Ok(())
    }

    fn frame_has_remaining(&self) -> bool {
        self.pos < self.limit()
    }

    fn take_presence(&mut self) -> Result<bool> {
        let offset = self.pos;
        match self.take_array::<1>()?[0] {
            NULL_FLAG => Ok(false),
            PRESENT_FLAG => Ok(true),
            value => Err(ArchiveError::InvalidPresenceFlag { offset, value }),
        }
    }

    fn take_type_hierarchy(&mut self) -> Result<String> {
        match self.take_scalar("type", ScalarKind::Str)? {
            Some(ScalarValue::Str(hierarchy)) => Ok(hierarchy),
            _ => Err(ArchiveError::malformed("type", ScalarKind::Str, "null type hierarchy")),
        }
    }

    fn take_scalar(&mut self, name: &str, kind: ScalarKind) -> Result<Option<ScalarValue>> {
        if kind.is_nullable() && !self.take_presence()? {
            return Ok(None);
        }
        let value = match kind {
            ScalarKind::I8 => ScalarValue::I8(i8::from_be_bytes(self.take_array()?)),
            ScalarKind::I32 => ScalarValue::I32(i32::from_be_bytes(self.take_array()?)),
            ScalarKind::I64 => ScalarValue::I64(i64::from_be_bytes(self.take_array()?)),
            ScalarKind::F32 => ScalarValue::F32(f32::from_bits(u32::from_be_bytes(self.take_array()?))),
            ScalarKind::F64 => ScalarValue::F64(f64::from_bits(u64::from_be_bytes(self.take_array()?))),
            ScalarKind::Bool => match self.take_array::<1>()?[0] {
                0 => ScalarValue::Bool(false),
                1 => ScalarValue::Bool(true),
                other => {
                    return Err(ArchiveError::malformed(
                        name,
                        kind,
                        format!("invalid boolean byte {other:#04x}"),
                    ));
                }
            },
            ScalarKind::Str => {
                let bytes = self.take_blob()?;
                let text = std::str::from_utf8(bytes).map_err(|e| ArchiveError::malformed(name, kind, e.to_string()))?;
                ScalarValue::Str(text.to_string())
            }
            ScalarKind::Bytes => ScalarValue::Bytes(self.take_blob()?.to_vec()),
        };
        Ok(Some(value))
    }
}
