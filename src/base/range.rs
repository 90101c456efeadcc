//! Helpers for building ranges from local scan indices.
//!
//! Scanners work on `usize` indices into a local substring; every range that
//! leaves a scanner is shifted by the absolute offset of that substring.

use text_size::{TextRange, TextSize};

/// Range `[base + start, base + end)` from local indices.
#[inline]
pub fn range_from(base: TextSize, start: usize, end: usize) -> TextRange {
    debug_assert!(start <= end, "inverted range {start}..{end}");
    TextRange::new(base + size(start), base + size(end))
}

/// Absolute offset of local index `local`.
#[inline]
pub fn shift(base: TextSize, local: usize) -> TextSize {
    base + size(local)
}

/// Range of `len` bytes starting at local index `start`.
#[inline]
pub fn range_at(base: TextSize, start: usize, len: usize) -> TextRange {
    TextRange::at(base + size(start), size(len))
}

#[inline]
fn size(n: usize) -> TextSize {
    TextSize::try_from(n).unwrap_or(TextSize::new(u32::MAX))
}
