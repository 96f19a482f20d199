//! Source location tracking
//!
//! Token offsets are character indices into the script, not byte offsets,
//! so everything here counts in `char`s.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and character offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Character offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self::new(self.offset + 1, self.line + 1, 1),
            _ => Self::new(self.offset + 1, self.line, self.column + 1),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Maps character offsets back to lines and columns for diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    chars: Vec<char>,
    /// Character offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0];
        for (offset, ch) in chars.iter().enumerate() {
            if *ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { chars, line_starts }
    }

    /// Number of characters in the source
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Get the line and column for a character offset. Offsets past the
    /// end clamp to the end of input.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.chars.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.line_starts[line];

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// Span covering `len` characters starting at `offset`
    pub fn span_at(&self, offset: usize, len: usize) -> Span {
        let start = self.position_at(offset);
        let end = self.position_at(offset + len);
        Span::new(start, end)
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<String> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.chars.len(),
        };

        let text: String = self.chars[start..end].iter().collect();
        Some(text.trim_end_matches('\r').to_string())
    }

    /// Format an error message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = format!("{}", span.start.line);
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let span_len = if span.start.line == span.end.line {
                (span.end.column - span.start.column) as usize
            } else {
                line.chars().count() + 1 - span.start.column as usize
            };

            result.push_str(&format!("{} | ", padding));
            result.push_str(&" ".repeat((span.start.column - 1) as usize));
            result.push_str(&"^".repeat(span_len.max(1)));
            result.push('\n');
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('a').advance('\n').advance('b');
        assert_eq!(pos, Position::new(3, 2, 2));
    }

    #[test]
    fn test_position_at_counts_chars() {
        let map = SourceMap::new("string s = \"olá\"\nint x = @");

        let pos = map.position_at(25);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 9);
        assert_eq!(map.len(), 26);
    }

    #[test]
    fn test_position_at_clamps_past_end() {
        let map = SourceMap::new("abc");
        assert_eq!(map.position_at(10), Position::new(3, 1, 4));
    }

    #[test]
    fn test_get_line() {
        let map = SourceMap::new("int x = 1\r\nint y = 2\n");
        assert_eq!(map.get_line(1).as_deref(), Some("int x = 1"));
        assert_eq!(map.get_line(2).as_deref(), Some("int y = 2"));
        assert_eq!(map.get_line(3).as_deref(), Some(""));
        assert_eq!(map.get_line(4), None);
        assert_eq!(map.get_line(0), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("int x = 5\nx = y + 1");
        let span = map.span_at(14, 1);
        let formatted = map.format_error(&span, "Unknown identifier: y");

        assert!(formatted.starts_with("Error: Unknown identifier: y\n"));
        assert!(formatted.contains("--> 2:5"));
        assert!(formatted.contains("2 | x = y + 1"));
        assert!(formatted.contains("  |     ^\n"));
    }

    #[test]
    fn test_span_display() {
        let map = SourceMap::new("while x < 3");
        assert_eq!(map.span_at(6, 1).to_string(), "1:7-8");
        assert_eq!(map.span_at(0, 5).len(), 5);
    }
}
