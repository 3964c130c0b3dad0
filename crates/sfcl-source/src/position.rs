use std::ops::Range;

use serde::Serialize;

/// Byte range of a block, tag, or compiler error within a composite file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    start: u32,
    length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// Span covering `start..end`. Offsets beyond `u32` saturate.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        let start = u32::try_from(start).unwrap_or(u32::MAX);
        let end = u32::try_from(end).unwrap_or(u32::MAX);
        Self::new(start, end.saturating_sub(start))
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.start.saturating_add(self.length) as usize
    }

    #[must_use]
    pub fn range(self) -> Range<usize> {
        self.start_usize()..self.end_usize()
    }

    #[must_use]
    pub fn clamp_to(self, len: usize) -> Self {
        Self::from_bounds(self.start_usize().min(len), self.end_usize().min(len))
    }
}

/// Zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Line starts of a document, for turning byte offsets into positions.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Position of `offset`; offsets past the end map to the end.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        LineCol {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(offset - self.line_starts[line]).unwrap_or(u32::MAX),
        }
    }
}
