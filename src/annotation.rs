//! @ai:module:intent Define data structures for recognized annotation usages and imports
//! @ai:module:layer domain
//! @ai:module:public_api AnnotationUsage, ImportDeclaration, Recognized, simple_name
//! @ai:module:stateless true

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// @ai:intent One marker-anchored annotation occurrence in the translated text
/// @ai:invariant span starts at the marker and ends after the name or the closing parenthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUsage {
    pub span: Span,
    /// Dotted name with whitespace and comments between segments dropped.
    pub name: String,
    pub name_span: Span,
    /// Parenthesised argument list, parentheses included.
    pub arguments: Option<Span>,
    /// Number of enclosing annotation argument lists.
    pub depth: usize,
    /// Index of the usage whose argument list contains this one.
    pub parent: Option<usize>,
}

/// @ai:intent One `import` declaration, terminated by its semicolon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub span: Span,
    /// Imported name without whitespace or comments, `.*` included for on-demand imports.
    pub name: String,
    pub is_static: bool,
}

impl ImportDeclaration {
    pub fn is_wildcard(&self) -> bool {
        self.name.ends_with(".*")
    }

    /// @ai:intent Type named by the import: the name itself, or its owner for static imports
    /// @ai:example ("static java.lang.Math.max") -> Some("java.lang.Math")
    pub fn type_name(&self) -> Option<&str> {
        if self.is_static {
            self.name.rfind('.').map(|pos| &self.name[..pos])
        } else if self.is_wildcard() {
            None
        } else {
            Some(&self.name)
        }
    }
}

/// @ai:intent Everything the recognizer found in one file, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recognized {
    pub usages: Vec<AnnotationUsage>,
    pub imports: Vec<ImportDeclaration>,
}

/// @ai:intent Last dot-separated segment of a name
/// @ai:effects pure
pub fn simple_name(name: &str) -> &str {
    name.rfind('.').map_or(name, |pos| &name[pos + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(name: &str, is_static: bool) -> ImportDeclaration {
        ImportDeclaration {
            span: Span::default(),
            name: name.to_string(),
            is_static,
        }
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("org.junit.Test"), "Test");
        assert_eq!(simple_name("Test"), "Test");
    }

    #[test]
    fn test_import_type_name() {
        assert_eq!(import("a.b.C", false).type_name(), Some("a.b.C"));
        assert_eq!(import("a.b.*", false).type_name(), None);
        assert_eq!(import("a.b.C.m", true).type_name(), Some("a.b.C"));
        assert_eq!(import("a.b.C.*", true).type_name(), Some("a.b.C"));
        assert!(import("a.b.C.*", true).is_wildcard());
    }
}
