//! @ai:module:intent Byte spans over source text and human-facing positions
//! @ai:module:layer domain
//! @ai:module:public_api Span, Position
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Half-open byte range `[start, end)` over a text buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// @ai:intent Create a span
    /// @ai:pre start <= end
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} past end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// @ai:intent Borrow the text covered by this span
    /// @ai:pre both bounds lie on char boundaries of text
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// @ai:intent Check whether other lies entirely inside this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// @ai:intent Check whether the two spans share at least one byte or touch
    pub fn touches(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// @ai:intent A location in the original input: byte offset plus 1-based line and column
/// @ai:invariant line and column are 0 only while the position is still unresolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// @ai:intent A bare offset whose line and column are not yet known
    pub fn unresolved(offset: usize) -> Self {
        Self {
            offset,
            line: 0,
            column: 0,
        }
    }

    /// @ai:intent Compute line and column of a byte offset
    /// @ai:pre offset <= text.len()
    /// @ai:post `\r\n`, `\n` and a lone `\r` each end one line; columns count chars
    /// @ai:example ("a\nbc", 3) -> line 2, column 2
    /// @ai:effects pure
    pub fn locate(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let bytes = text.as_bytes();
        let mut line = 1;
        let mut line_start = 0;
        let mut i = 0;

        while i < offset {
            match bytes[i] {
                b'\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') && i + 1 < offset {
                        i += 1;
                    }
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }

        let column = text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start)
            + 1;

        Self {
            offset,
            line,
            column,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_resolved() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "offset {}", self.offset)
        }
    }
}
