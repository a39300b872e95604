//! @ai:module:intent Split escape-translated Java source into contiguous classified tokens
//! @ai:module:layer domain
//! @ai:module:public_api tokenize, Scanner, Token, TokenKind
//! @ai:module:depends_on span, error
//! @ai:module:stateless true

use crate::error::SyntaxError;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Reserved words; contextual keywords such as `module` or `record` stay identifiers.
const KEYWORDS: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// Multi-character operators, longest first so the first hit is the maximal munch.
const OPERATORS: &[&str] = &[
    ">>>=", "<<=", ">>=", ">>>", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=",
    ">=", "+=", "-=", "*=", "/=", "&=", "|=", "^=", "%=", "<<", ">>",
];

/// @ai:intent Classification of one token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    StringLiteral,
    CharLiteral,
    NumericLiteral,
    Identifier,
    Keyword,
    Punctuation,
    AnnotationMarker,
}

impl TokenKind {
    /// @ai:intent Whitespace and comments, which never carry structure
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// @ai:intent A classified span of the translated text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// @ai:intent Check for a punctuation token with the given spelling
    pub fn is_punct(&self, source: &str, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text(source) == punct
    }

    /// @ai:intent Check for a reserved word with the given spelling
    pub fn is_keyword(&self, source: &str, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text(source) == keyword
    }
}

/// @ai:intent Tokenize the whole translated text
/// @ai:post concatenating all token spans yields text exactly
/// @ai:post an unterminated block comment or literal fails at its start offset
/// @ai:effects pure
pub fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let tokens = Scanner::new(text).collect::<Result<Vec<_>, _>>()?;
    tracing::trace!(tokens = tokens.len(), bytes = text.len(), "scanned source");
    Ok(tokens)
}

/// @ai:intent Single-pass scanner yielding one token per step
/// @ai:invariant every step advances by at least one char, so scanning always terminates
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            failed: false,
        }
    }

    fn byte_at(&self, at: usize) -> Option<u8> {
        self.text.as_bytes().get(at).copied()
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.text.get(at..).and_then(|rest| rest.chars().next())
    }

    /// @ai:intent Offset just past the char starting at `at`
    fn after_char(&self, at: usize) -> usize {
        at + self.char_at(at).map_or(1, char::len_utf8)
    }

    fn scan_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        let kind = match self.byte_at(start) {
            Some(b' ' | b'\t' | b'\x0C' | b'\r' | b'\n') => self.whitespace(start),
            Some(b'/') if self.byte_at(start + 1) == Some(b'/') => self.line_comment(start),
            Some(b'/') if self.byte_at(start + 1) == Some(b'*') => self.block_comment(start)?,
            Some(b'"') => self.string(start)?,
            Some(b'\'') => self.quoted(start, b'\'', "character literal")?,
            Some(b'@') => {
                self.pos = start + 1;
                TokenKind::AnnotationMarker
            }
            Some(b'0'..=b'9') => self.number(start),
            Some(b'.') if self.byte_at(start + 1).is_some_and(|b| b.is_ascii_digit()) => {
                self.number(start)
            }
            _ => match self.char_at(start) {
                Some(c) if is_identifier_start(c) => self.word(start),
                _ => self.punctuation(start),
            },
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.pos),
        })
    }

    fn whitespace(&mut self, start: usize) -> TokenKind {
        let mut end = start;
        while matches!(self.byte_at(end), Some(b' ' | b'\t' | b'\x0C' | b'\r' | b'\n')) {
            end += 1;
        }
        self.pos = end;
        TokenKind::Whitespace
    }

    /// @ai:intent Line comments stop before the terminator; EOF also ends them
    fn line_comment(&mut self, start: usize) -> TokenKind {
        let rest = &self.text[start..];
        self.pos = start + rest.find(['\n', '\r']).unwrap_or(rest.len());
        TokenKind::LineComment
    }

    fn block_comment(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        match self.text[start + 2..].find("*/") {
            Some(close) => {
                self.pos = start + 2 + close + 2;
                Ok(TokenKind::BlockComment)
            }
            None => Err(SyntaxError::unterminated(start, "block comment is never closed")),
        }
    }

    /// @ai:intent Dispatch between a text block and an ordinary string literal
    fn string(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        if self.text[start..].starts_with("\"\"\"") && self.opens_text_block(start + 3) {
            return self.text_block(start);
        }

        self.quoted(start, b'"', "string literal")
    }

    /// @ai:intent A text block opener must be followed by blanks and a line terminator
    fn opens_text_block(&self, mut at: usize) -> bool {
        while matches!(self.byte_at(at), Some(b' ' | b'\t' | b'\x0C')) {
            at += 1;
        }
        matches!(self.byte_at(at), Some(b'\n' | b'\r'))
    }

    fn text_block(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        let mut at = start + 3;

        loop {
            match self.byte_at(at) {
                None => return Err(SyntaxError::unterminated(start, "text block is never closed")),
                Some(b'\\') => match self.byte_at(at + 1) {
                    Some(_) => at = self.after_char(at + 1),
                    None => {
                        return Err(SyntaxError::unterminated(start, "text block is never closed"))
                    }
                },
                Some(b'"') if self.text[at..].starts_with("\"\"\"") => {
                    self.pos = at + 3;
                    return Ok(TokenKind::StringLiteral);
                }
                Some(_) => at = self.after_char(at),
            }
        }
    }

    /// @ai:intent Single-line quoted literal with backslash escapes
    /// @ai:edge_cases a line terminator before the closing quote is an error, as in the language
    fn quoted(&mut self, start: usize, quote: u8, what: &str) -> Result<TokenKind, SyntaxError> {
        let mut at = start + 1;

        loop {
            match self.byte_at(at) {
                Some(b) if b == quote => {
                    self.pos = at + 1;
                    return Ok(if quote == b'"' {
                        TokenKind::StringLiteral
                    } else {
                        TokenKind::CharLiteral
                    });
                }
                Some(b'\\') if !matches!(self.byte_at(at + 1), None | Some(b'\n' | b'\r')) => {
                    at = self.after_char(at + 1);
                }
                None | Some(b'\n' | b'\r') => {
                    return Err(SyntaxError::unterminated(
                        start,
                        format!("{} is not closed before the end of its line", what),
                    ));
                }
                Some(_) => at = self.after_char(at),
            }
        }
    }

    /// @ai:intent Numeric literal, including exponent signs, underscores and suffixes
    fn number(&mut self, start: usize) -> TokenKind {
        let hex = matches!(&self.text.as_bytes()[start..], [b'0', b'x' | b'X', ..]);
        let mut end = start;

        while let Some(b) = self.byte_at(end) {
            let exponent_sign = matches!(b, b'+' | b'-')
                && match self.byte_at(end - 1) {
                    Some(b'e' | b'E') => !hex,
                    Some(b'p' | b'P') => hex,
                    _ => false,
                };

            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
                if b == b'.' && self.byte_at(end + 1) == Some(b'.') {
                    break;
                }
                end += 1;
            } else {
                break;
            }
        }

        self.pos = end;
        TokenKind::NumericLiteral
    }

    fn word(&mut self, start: usize) -> TokenKind {
        let mut end = self.after_char(start);

        while let Some(c) = self.char_at(end) {
            if !is_identifier_part(c) {
                break;
            }
            end += c.len_utf8();
        }

        self.pos = end;

        if KEYWORDS.contains(&&self.text[start..end]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    fn punctuation(&mut self, start: usize) -> TokenKind {
        let rest = &self.text[start..];

        self.pos = match OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            Some(op) => start + op.len(),
            None => self.after_char(start),
        };

        TokenKind::Punctuation
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.text.len() {
            return None;
        }

        let token = self.scan_token();
        self.failed = token.is_err();
        Some(token)
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
