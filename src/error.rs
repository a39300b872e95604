//! @ai:module:intent Define error types for the annotation stripper
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result, SyntaxError, SyntaxErrorKind
//! @ai:module:stateless true

use crate::escape::Translated;
use crate::language::FileKind;
use crate::span::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent The three ways a source file can be rejected by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    MalformedEscape,
    UnterminatedToken,
    MalformedAnnotation,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxErrorKind::MalformedEscape => "malformed unicode escape",
            SyntaxErrorKind::UnterminatedToken => "unterminated token",
            SyntaxErrorKind::MalformedAnnotation => "malformed annotation",
        };
        f.write_str(name)
    }
}

/// @ai:intent Fatal, positioned failure of one pipeline stage
/// @ai:invariant after the pipeline returns, position refers to the original input
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} at {position}: {detail}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: Position,
    pub detail: String,
}

impl SyntaxError {
    /// @ai:intent Build an error at a raw byte offset of the stage's input
    pub fn new(kind: SyntaxErrorKind, offset: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            position: Position::unresolved(offset),
            detail: detail.into(),
        }
    }

    pub fn malformed_escape(offset: usize, detail: impl Into<String>) -> Self {
        Self::new(SyntaxErrorKind::MalformedEscape, offset, detail)
    }

    pub fn unterminated(offset: usize, detail: impl Into<String>) -> Self {
        Self::new(SyntaxErrorKind::UnterminatedToken, offset, detail)
    }

    pub fn malformed_annotation(offset: usize, detail: impl Into<String>) -> Self {
        Self::new(SyntaxErrorKind::MalformedAnnotation, offset, detail)
    }

    /// @ai:intent Move a translated-text offset onto the original input and resolve line/column
    /// @ai:effects pure
    pub(crate) fn relocate(mut self, translated: &Translated, original: &str) -> Self {
        let offset = translated.original_offset(self.position.offset);
        self.position = Position::locate(original, offset);
        self
    }

    /// @ai:intent Resolve line/column of an offset that already refers to the original input
    pub(crate) fn locate_in(mut self, original: &str) -> Self {
        self.position = Position::locate(original, self.position.offset);
        self
    }
}

/// @ai:intent Unified error type for all annotation stripping operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No such file or directory: {path}")]
    MissingPath { path: PathBuf },

    #[error("{file_kind}: {source}")]
    Syntax {
        file_kind: FileKind,
        #[source]
        source: SyntaxError,
    },

    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No annotation names or patterns were given")]
    NoTargets,

    #[error("In-place rewriting needs at least one file or directory")]
    NoInput,
}

impl Error {
    /// @ai:intent Access the positioned syntax error, if this is one
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        self.syntax().map(|e| e.kind)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::unterminated(4, "block comment never closed").locate_in("ab\ncd/*");
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 2);
        assert_eq!(
            err.to_string(),
            "unterminated token at 2:2: block comment never closed"
        );
    }

    #[test]
    fn test_wrapped_error_exposes_kind() {
        let err = Error::Syntax {
            file_kind: FileKind::ModuleDeclaration,
            source: SyntaxError::malformed_annotation(0, "expected annotation name"),
        };
        assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::MalformedAnnotation));
        assert!(err.to_string().starts_with("module declaration: malformed annotation"));
    }
}
