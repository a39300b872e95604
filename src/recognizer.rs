//! @ai:module:intent Recognize annotation usages and import declarations in a token stream
//! @ai:module:layer application
//! @ai:module:public_api recognize
//! @ai:module:depends_on scanner, annotation, error
//! @ai:module:stateless true
//!
//! Argument lists are balanced with an explicit delimiter stack, so nesting
//! depth never turns into call depth. Delimiters are only tracked while inside
//! an annotation's argument list; the rest of the file is not parsed.

use crate::annotation::{AnnotationUsage, ImportDeclaration, Recognized};
use crate::error::SyntaxError;
use crate::scanner::{Token, TokenKind};
use crate::span::Span;

/// @ai:intent An open delimiter inside an annotation argument list
struct Frame {
    closer: &'static str,
    open: usize,
    /// Set when this parenthesis opened the argument list of that usage.
    usage: Option<usize>,
}

/// @ai:intent Walks significant tokens, stepping over whitespace and comments
struct Cursor<'t> {
    tokens: &'t [Token],
    next: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, next: 0 }
    }

    fn find_significant(&self) -> Option<usize> {
        (self.next..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_trivia())
    }

    fn peek(&self) -> Option<&'t Token> {
        self.find_significant().map(|i| &self.tokens[i])
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let index = self.find_significant()?;
        self.next = index + 1;
        Some(&self.tokens[index])
    }
}

/// @ai:intent Find every annotation usage and import declaration, in source order
/// @ai:pre tokens exhaustively cover text
/// @ai:post nested usages follow the usage whose argument list contains them
/// @ai:edge_cases `@interface` declares an annotation type and is not a usage
/// @ai:effects pure
pub fn recognize(text: &str, tokens: &[Token]) -> Result<Recognized, SyntaxError> {
    let mut cursor = Cursor::new(tokens);
    let mut frames: Vec<Frame> = Vec::new();
    let mut found = Recognized::default();

    while let Some(token) = cursor.bump() {
        match token.kind {
            TokenKind::AnnotationMarker => {
                let Some(usage) = annotation(text, &mut cursor, token, &frames)? else {
                    continue;
                };

                let index = found.usages.len();
                found.usages.push(usage);

                if cursor.peek().is_some_and(|t| t.is_punct(text, "(")) {
                    if let Some(open) = cursor.bump() {
                        frames.push(Frame {
                            closer: ")",
                            open: open.span.start,
                            usage: Some(index),
                        });
                    }
                }
            }
            TokenKind::Punctuation if !frames.is_empty() => {
                nest(text, token, &mut frames, &mut found.usages)?;
            }
            TokenKind::Keyword if frames.is_empty() && token.text(text) == "import" => {
                if let Some(import) = import_declaration(text, &mut cursor, token) {
                    found.imports.push(import);
                }
            }
            _ => {}
        }
    }

    if let Some(index) = frames.iter().find_map(|frame| frame.usage) {
        let usage = &found.usages[index];
        return Err(SyntaxError::malformed_annotation(
            usage.span.start,
            format!("argument list of `@{}` is never closed", usage.name),
        ));
    }

    tracing::trace!(
        usages = found.usages.len(),
        imports = found.imports.len(),
        "recognized annotations"
    );

    Ok(found)
}

/// @ai:intent Read the dotted name after a marker
/// @ai:post Ok(None) for an annotation type declaration
fn annotation(
    text: &str,
    cursor: &mut Cursor<'_>,
    marker: &Token,
    frames: &[Frame],
) -> Result<Option<AnnotationUsage>, SyntaxError> {
    let at = marker.span.start;

    let first = match cursor.peek() {
        Some(t) if t.is_keyword(text, "interface") => return Ok(None),
        Some(t) if t.kind == TokenKind::Identifier => t,
        Some(t) => {
            return Err(SyntaxError::malformed_annotation(
                at,
                format!("expected an annotation name after `@`, found `{}`", t.text(text)),
            ))
        }
        None => {
            return Err(SyntaxError::malformed_annotation(
                at,
                "expected an annotation name after `@`, found end of input",
            ))
        }
    };
    cursor.bump();

    let mut name = first.text(text).to_string();
    let mut name_end = first.span.end;

    while cursor.peek().is_some_and(|t| t.is_punct(text, ".")) {
        cursor.bump();

        match cursor.bump() {
            Some(t) if t.kind == TokenKind::Identifier => {
                name.push('.');
                name.push_str(t.text(text));
                name_end = t.span.end;
            }
            Some(t) => {
                return Err(SyntaxError::malformed_annotation(
                    at,
                    format!(
                        "expected an identifier after `@{}.`, found `{}`",
                        name,
                        t.text(text)
                    ),
                ))
            }
            None => {
                return Err(SyntaxError::malformed_annotation(
                    at,
                    format!("expected an identifier after `@{}.`, found end of input", name),
                ))
            }
        }
    }

    Ok(Some(AnnotationUsage {
        span: Span::new(at, name_end),
        name,
        name_span: Span::new(first.span.start, name_end),
        arguments: None,
        depth: frames.iter().filter(|frame| frame.usage.is_some()).count(),
        parent: frames.iter().rev().find_map(|frame| frame.usage),
    }))
}

/// @ai:intent Track one delimiter inside annotation arguments, closing usages as they balance
fn nest(
    text: &str,
    token: &Token,
    frames: &mut Vec<Frame>,
    usages: &mut [AnnotationUsage],
) -> Result<(), SyntaxError> {
    let punct = token.text(text);

    let closer = match punct {
        "(" => ")",
        "[" => "]",
        "{" => "}",
        ")" | "]" | "}" => {
            let Some(frame) = frames.pop() else {
                return Ok(());
            };

            if frame.closer != punct {
                return Err(SyntaxError::malformed_annotation(
                    token.span.start,
                    format!(
                        "expected `{}` inside annotation arguments, found `{}`",
                        frame.closer, punct
                    ),
                ));
            }

            if let Some(index) = frame.usage {
                let usage = &mut usages[index];
                usage.span.end = token.span.end;
                usage.arguments = Some(Span::new(frame.open, token.span.end));
            }

            return Ok(());
        }
        _ => return Ok(()),
    };

    frames.push(Frame {
        closer,
        open: token.span.start,
        usage: None,
    });

    Ok(())
}

/// @ai:intent Read `import [static] a.b.C[.*];`
/// @ai:post None leaves the offending token unconsumed
fn import_declaration(
    text: &str,
    cursor: &mut Cursor<'_>,
    keyword: &Token,
) -> Option<ImportDeclaration> {
    let mut is_static = false;
    let mut name = String::new();
    let mut expect_segment = true;

    if cursor.peek()?.is_keyword(text, "static") {
        cursor.bump();
        is_static = true;
    }

    loop {
        let token = cursor.peek()?;

        if expect_segment {
            let segment = token.kind == TokenKind::Identifier
                || (!name.is_empty() && token.is_punct(text, "*"));

            if !segment {
                return None;
            }

            name.push_str(token.text(text));
            expect_segment = false;
        } else if token.is_punct(text, ".") {
            name.push('.');
            expect_segment = true;
        } else if token.is_punct(text, ";") {
            cursor.bump();
            return Some(ImportDeclaration {
                span: Span::new(keyword.span.start, token.span.end),
                name,
                is_static,
            });
        } else {
            return None;
        }

        cursor.bump();
    }
}
