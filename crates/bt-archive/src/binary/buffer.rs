//! Growable output buffer with in-place patching.

use crate::error::{ArchiveError, Result};

/// Append-only output that can also overwrite bytes it already holds.
///
/// Transaction lengths are only known when a frame closes, so the writer
/// reserves their slot and patches it afterwards.
pub trait PatchBuffer {
    /// Number of bytes written so far.
    fn position(&self) -> usize;

    /// Append bytes at the end.
    fn push_bytes(&mut self, bytes: &[u8]);

    /// Overwrite already-written bytes starting at `offset`.
    fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;
}

impl PatchBuffer for Vec<u8> {
    fn position(&self) -> usize {
        self.len()
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let available = self.len();
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= available)
            .ok_or(ArchiveError::UnexpectedEof {
                offset,
                needed: bytes.len(),
                available: available.saturating_sub(offset),
            })?;
        self[offset..end].copy_from_slice(bytes);
        Ok(())
    }
}

impl<B: PatchBuffer + ?Sized> PatchBuffer for &mut B {
    fn position(&self) -> usize {
        (**self).position()
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        (**self).push_bytes(bytes);
    }

    fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        (**self).patch(offset, bytes)
    }
}
