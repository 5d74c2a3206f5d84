//! Tokenizer configuration.

/// How the tokenizer counts columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnUnit {
    /// One column per UTF-16 code unit, so characters outside the Basic
    /// Multilingual Plane (most emoji) take two columns. Matches the positions
    /// reported by editors and existing OCL tooling.
    #[default]
    Utf16,
    /// One column per Unicode scalar value.
    Char,
}

impl ColumnUnit {
    /// Columns taken by `c`.
    #[inline]
    pub fn width(self, c: char) -> u32 {
        match self {
            ColumnUnit::Utf16 => c.len_utf16() as u32,
            ColumnUnit::Char => 1,
        }
    }
}

/// Options for [`crate::Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    pub columns: ColumnUnit,
}

impl ScanOptions {
    pub fn columns(mut self, columns: ColumnUnit) -> Self {
        self.columns = columns;
        self
    }
}
