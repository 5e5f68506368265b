/// An `(offset, len)` window into a source buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a new span.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Offset one past the last byte.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the spanned text. Out-of-range or non-boundary spans yield `""`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.offset..self.end()).unwrap_or("")
    }

    /// Span with the first and last byte removed (used to strip quotes).
    pub fn inner(&self) -> Span {
        if self.len < 2 {
            return Span::new(self.offset, 0);
        }
        Span::new(self.offset + 1, self.len - 2)
    }
}
