//! Utilities module for auto-deprecator.

mod paths;

pub use paths::{collect_python_files_gitignore, is_excluded, normalize_display_path};

use ruff_text_size::TextSize;

/// A utility struct to convert byte offsets to line numbers.
///
/// The AST parser works with byte offsets, while spans and reports use
/// 1-indexed line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    /// Uses byte iteration since '\n' is always a single byte in UTF-8.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a `TextSize` (byte offset) to a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: TextSize) -> usize {
        self.line_of_byte(offset.to_usize())
    }

    /// Converts a raw byte offset to a 1-indexed line number.
    #[must_use]
    pub fn line_of_byte(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Zero-indexed byte column of an offset within its line.
    #[must_use]
    pub fn column_of_byte(&self, offset: usize) -> usize {
        offset - self.line_starts[self.line_of_byte(offset) - 1]
    }
}

/// Splits source text into lines, each keeping its own terminator.
///
/// Joining the result reproduces the input exactly.
#[must_use]
pub fn split_lines(source: &str) -> Vec<&str> {
    source.split_inclusive('\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let source = "a = 1\nb = 2\n\nc = 3";
        let index = LineIndex::new(source);
        assert_eq!(index.line_of_byte(0), 1);
        assert_eq!(index.line_of_byte(5), 1);
        assert_eq!(index.line_of_byte(6), 2);
        assert_eq!(index.line_of_byte(12), 3);
        assert_eq!(index.line_of_byte(13), 4);
        assert_eq!(index.column_of_byte(8), 2);
        assert_eq!(index.column_of_byte(13), 0);
    }

    #[test]
    fn test_split_lines_round_trips() {
        let source = "def f():\r\n    pass\n\nx = 1";
        let lines = split_lines(source);
        assert_eq!(lines, vec!["def f():\r\n", "    pass\n", "\n", "x = 1"]);
        assert_eq!(lines.concat(), source);
        assert!(split_lines("").is_empty());
    }
}
