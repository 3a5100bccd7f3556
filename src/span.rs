//! Byte-offset spans and line/column locations for source tracking.

#[cfg(test)]
#[path = "./span_tests.rs"]
mod tests;

/// A byte-offset range `[start, end)` within a TOML document.
///
/// Convertible to and from [`Range<usize>`](std::ops::Range).
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new [`Span`] from start and end byte offsets.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns `true` if this span covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `other` lies entirely within this span.
    #[inline]
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(s: Span) -> Self {
        s.start..s.end
    }
}

/// A single source position: 1-based line, 0-based column.
///
/// Columns are measured in bytes, matching byte-offset spans.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LineCol {
    /// 1-based line number.
    pub line: usize,
    /// 0-based column, in bytes from the start of the line.
    pub column: usize,
}

impl LineCol {
    /// Creates a new [`LineCol`].
    #[inline]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for LineCol {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl PartialOrd for LineCol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LineCol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

/// Start and end [`LineCol`] of a token or AST node.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Loc {
    /// Location of the first character.
    pub start: LineCol,
    /// Location one past the last character.
    pub end: LineCol,
}

impl Loc {
    /// Creates a new [`Loc`] from start and end positions.
    #[inline]
    pub fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }
}
