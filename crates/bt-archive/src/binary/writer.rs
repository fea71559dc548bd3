//! Binary archive writer.

use crate::archive::WriteSubstrate;
use crate::error::{ArchiveError, Result};
use crate::options::BinaryWriterOptions;
use crate::scalar::{Scalar, ScalarKind};

use super::buffer::PatchBuffer;
use super::{LENGTH_WIDTH, NULL_FLAG, PRESENT_FLAG};

/// Writes an archive into a patchable byte buffer.
///
/// Every open transaction reserves a 4-byte length slot that is patched with
/// the body size when the transaction ends.
#[derive(Debug)]
pub struct BinaryWriter<B: PatchBuffer = Vec<u8>> {
    buffer: B,
    /// Offsets of the reserved length slots, innermost last.
    frames: Vec<usize>,
    options: BinaryWriterOptions,
}

impl BinaryWriter<Vec<u8>> {
    /// Create a writer over a fresh buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BinaryWriterOptions::default())
    }

    /// Create a writer over a fresh buffer with options.
    #[must_use]
    pub fn with_options(options: BinaryWriterOptions) -> Self {
        let buffer = Vec::with_capacity(options.initial_capacity);
        Self::from_buffer(buffer, options)
    }
}

impl Default for BinaryWriter<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PatchBuffer> BinaryWriter<B> {
    /// Create a writer that appends to an existing buffer.
    pub fn from_buffer(buffer: B, options: BinaryWriterOptions) -> Self {
        Self {
            buffer,
            frames: Vec::new(),
            options,
        }
    }

    /// Bytes in the underlying buffer.
    pub fn position(&self) -> usize {
        self.buffer.position()
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Return the buffer, failing if a transaction is still open.
    pub fn finish(self) -> Result<B> {
        if !self.frames.is_empty() {
            return Err(ArchiveError::UnbalancedTransaction {
                open: self.frames.len(),
            });
        }
        Ok(self.buffer)
    }

    fn put_flag(&mut self, present: bool) {
        let flag = if present { PRESENT_FLAG } else { NULL_FLAG };
        self.buffer.push_bytes(&[flag]);
    }

    fn put_length(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| ArchiveError::FrameTooLarge { size: len })?;
        self.buffer.push_bytes(&len.to_be_bytes());
        Ok(())
    }

    fn put_payload(&mut self, value: Scalar<'_>) -> Result<()> {
        match value {
            Scalar::I8(v) => self.buffer.push_bytes(&v.to_be_bytes()),
            Scalar::I32(v) => self.buffer.push_bytes(&v.to_be_bytes()),
            Scalar::I64(v) => self.buffer.push_bytes(&v.to_be_bytes()),
            Scalar::F32(v) => self.buffer.push_bytes(&v.to_bits().to_be_bytes()),
            Scalar::F64(v) => self.buffer.push_bytes(&v.to_bits().to_be_bytes()),
            Scalar::Bool(v) => self.buffer.push_bytes(&[u8::from(v)]),
            Scalar::Str(v) => {
                self.put_length(v.len())?;
                self.buffer.push_bytes(v.as_bytes());
            }
            Scalar::Bytes(v) => {
                self.put_length(v.len())?;
                self.buffer.push_bytes(v);
            }
        }
        Ok(())
    }
}

impl<B: PatchBuffer> WriteSubstrate for BinaryWriter<B> {
    fn open_frame(&mut self, _name: &str) -> Result<()> {
        if self.frames.len() >= self.options.max_depth {
            return Err(ArchiveError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.frames.push(self.buffer.position());
        self.buffer.push_bytes(&[0; LENGTH_WIDTH]);
        Ok(())
    }

    fn close_frame(&mut self) -> Result<()> {
        let start = self.frames.pop().ok_or(ArchiveError::NoOpenTransaction)?;
        let written = self.buffer.position() - start - LENGTH_WIDTH;
        let size = u32::try_from(written).map_err(|_| ArchiveError::FrameTooLarge { size: written })?;
        self.buffer.patch(start, &size.to_be_bytes())?;
        tracing::trace!(offset = start, size, "Patched transaction length");
        Ok(())
    }

    fn put_presence(&mut self, present: bool) -> Result<()> {
        self.put_flag(present);
        Ok(())
    }

    fn put_type_hierarchy(&mut self, hierarchy: &str) -> Result<()> {
        self.put_scalar("type", Scalar::Str(hierarchy))
    }

    fn put_scalar(&mut self, _name: &str, value: Scalar<'_>) -> Result<()> {
        if value.kind().is_nullable() {
            self.put_flag(true);
        }
        self.put_payload(value)
    }

    fn put_null(&mut self, name: &str, kind: ScalarKind) -> Result<()> {
        if !kind.is_nullable() {
            return Err(ArchiveError::unexpected_null(name));
        }
        self.put_flag(false);
        Ok(())
    }
}
