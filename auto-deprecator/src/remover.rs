//! Line-span remover.
//!
//! Deletes whole-line spans from a source buffer, copying every other line
//! verbatim. Spans are applied from the bottom of the file upwards, so the
//! line numbers of spans not yet applied never move.
//!
//! # Usage
//!
//! ```
//! use auto_deprecator::remover::{LineSpan, SpanRemover};
//!
//! let source = "a = 1\nb = 2\nc = 3\n";
//! let mut remover = SpanRemover::new(source);
//! remover.add_span(LineSpan::new(2, 3));
//! assert_eq!(remover.apply().unwrap(), "a = 1\nc = 3\n");
//! ```

use std::fmt;

use serde::Serialize;

use crate::utils::split_lines;

/// Half-open interval `[start, end)` over 1-indexed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineSpan {
    /// First line of the span.
    pub start: usize,
    /// First line after the span.
    pub end: usize,
}

impl LineSpan {
    /// Create a span covering `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no line.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if this span overlaps with another
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end.saturating_sub(1))
    }
}

/// Error during removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveError {
    /// Two spans overlap without one containing the other
    OverlappingSpans {
        /// First span
        a: LineSpan,
        /// Second span
        b: LineSpan,
    },
    /// Span reaches outside the buffer
    OutOfBounds {
        /// The bad span
        span: LineSpan,
        /// Number of lines in the buffer
        line_count: usize,
    },
}

impl fmt::Display for RemoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlappingSpans { a, b } => {
                write!(f, "Overlapping deletion spans {a} and {b}")
            }
            Self::OutOfBounds { span, line_count } => {
                write!(
                    f,
                    "Deletion span {span} out of bounds for a {line_count}-line file"
                )
            }
        }
    }
}

impl std::error::Error for RemoveError {}

/// Removes line spans from a source buffer.
#[derive(Debug, Clone)]
pub struct SpanRemover<'s> {
    lines: Vec<&'s str>,
    spans: Vec<LineSpan>,
}

impl<'s> SpanRemover<'s> {
    /// Create a remover over `source`.
    #[must_use]
    pub fn new(source: &'s str) -> Self {
        Self {
            lines: split_lines(source),
            spans: Vec::new(),
        }
    }

    /// Queue a span for deletion.
    pub fn add_span(&mut self, span: LineSpan) {
        self.spans.push(span);
    }

    /// Queue several spans.
    pub fn add_spans(&mut self, spans: impl IntoIterator<Item = LineSpan>) {
        self.spans.extend(spans);
    }

    /// Returns the pending spans reduced to their outermost members, sorted
    /// by start line.
    ///
    /// # Errors
    /// Returns error if a span is out of bounds or two spans partially overlap
    pub fn normalized(&self) -> Result<Vec<LineSpan>, RemoveError> {
        let line_count = self.lines.len();
        let mut spans: Vec<LineSpan> = self
            .spans
            .iter()
            .copied()
            .filter(|s| !s.is_empty())
            .collect();

        if let Some(span) = spans
            .iter()
            .find(|s| s.start == 0 || s.end > line_count + 1)
        {
            return Err(RemoveError::OutOfBounds {
                span: *span,
                line_count,
            });
        }

        // Outer spans sort before the spans they contain
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut kept: Vec<LineSpan> = Vec::with_capacity(spans.len());
        for span in spans {
            match kept.last() {
                Some(last) if last.contains(&span) => {}
                Some(last) if last.overlaps(&span) => {
                    return Err(RemoveError::OverlappingSpans { a: *last, b: span });
                }
                _ => kept.push(span),
            }
        }
        Ok(kept)
    }

    /// Apply all spans and return the new text.
    ///
    /// Trailing whitespace-only lines left at the end are dropped, and the
    /// text ends with a newline only if the input did. Without spans the
    /// input is returned unchanged.
    ///
    /// # Errors
    /// Returns error if spans overlap or are out of bounds
    pub fn apply(self) -> Result<String, RemoveError> {
        let spans = self.normalized()?;
        let mut lines = self.lines;
        if spans.is_empty() {
            return Ok(lines.concat());
        }

        let ends_with_newline = lines.last().is_some_and(|l| l.ends_with('\n'));

        // Apply from end to start
        for span in spans.iter().rev() {
            lines.drain(span.start - 1..span.end - 1);
        }

        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        let mut text = lines.concat();
        if text.is_empty() {
            return Ok(text);
        }
        if ends_with_newline {
            if !text.ends_with('\n') {
                text.push('\n');
            }
        } else {
            let trimmed_len = text.trim_end_matches(['\n', '\r']).len();
            text.truncate(trimmed_len);
        }
        Ok(text)
    }
}
