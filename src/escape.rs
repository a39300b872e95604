//! @ai:module:intent Translate Unicode escapes before any structural scanning
//! @ai:module:layer domain
//! @ai:module:public_api translate, Translated, EscapeOccurrence
//! @ai:module:stateless true
//!
//! A backslash starts an escape only when it is preceded by an even number of
//! contiguous raw backslashes. Any number of `u` may follow, then exactly four
//! hexadecimal digits. The produced character never starts another escape.

use crate::error::SyntaxError;
use crate::span::Span;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// @ai:intent One translated escape: where it was, where its character went, what it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeOccurrence {
    /// Byte range of the escape spelling in the original input.
    pub original: Span,
    /// Byte offset of the produced character in the translated text.
    pub translated: usize,
    pub ch: char,
    /// False for an unpaired UTF-16 surrogate, which is carried as U+FFFD.
    pub lossless: bool,
}

impl EscapeOccurrence {
    /// @ai:intent Byte range of the produced character in the translated text
    pub fn translated_span(&self) -> Span {
        Span::new(self.translated, self.translated + self.ch.len_utf8())
    }
}

/// @ai:intent Escape-translated view of a source buffer with a map back to the original
#[derive(Debug, Clone)]
pub struct Translated {
    text: String,
    escapes: Vec<EscapeOccurrence>,
    /// `shifts[k]` is how many bytes longer the original is than the translation
    /// once escapes `0..=k` have been passed.
    shifts: Vec<usize>,
}

impl Translated {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn escapes(&self) -> &[EscapeOccurrence] {
        &self.escapes
    }

    /// @ai:intent True when the input contained no escapes at all
    pub fn is_identity(&self) -> bool {
        self.escapes.is_empty()
    }

    /// @ai:intent Map a char-boundary offset of the translated text to the original input
    /// @ai:pre offset is a char boundary of text()
    /// @ai:post the start of an escape's character maps to the start of its spelling
    /// @ai:effects pure
    pub fn original_offset(&self, offset: usize) -> usize {
        let passed = self.escapes.partition_point(|e| e.translated < offset);

        match passed {
            0 => offset,
            k => offset + self.shifts[k - 1],
        }
    }

    /// @ai:intent Map a translated span onto the original input
    pub fn original_span(&self, span: Span) -> Span {
        Span::new(self.original_offset(span.start), self.original_offset(span.end))
    }

    /// @ai:intent Escapes whose produced character lies inside span
    pub fn escapes_within(&self, span: Span) -> &[EscapeOccurrence] {
        let from = self.escapes.partition_point(|e| e.translated < span.start);
        let to = self.escapes.partition_point(|e| e.translated < span.end);
        &self.escapes[from..to]
    }
}

/// @ai:intent Replace every eligible Unicode escape of source by the character it denotes
/// @ai:pre source is the raw file content
/// @ai:post result text contains no escape that was eligible in source
/// @ai:example ("\\u0040Deprecated") -> "@Deprecated"
/// @ai:example ("\\\\u0040") -> unchanged, the backslash is itself escaped
/// @ai:edge_cases `\uD83D\uDE00` pairs into one char; a lone surrogate becomes U+FFFD
/// @ai:effects pure
pub fn translate(source: &str) -> Result<Translated, SyntaxError> {
    let bytes = source.as_bytes();
    let mut text = String::with_capacity(source.len());
    let mut escapes = Vec::new();
    let mut shifts = Vec::new();
    let mut copied = 0;
    let mut backslashes = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            backslashes = 0;
            i += 1;
            continue;
        }

        if backslashes % 2 == 1 || bytes.get(i + 1) != Some(&b'u') {
            backslashes += 1;
            i += 1;
            continue;
        }

        let (unit, mut end) = read_escape(bytes, i)?;
        let (ch, lossless) = match unit {
            0xD800..=0xDBFF => match read_low_surrogate(bytes, end) {
                Some((low, low_end)) => {
                    end = low_end;
                    (combine_surrogates(unit, low), true)
                }
                None => (REPLACEMENT, false),
            },
            0xDC00..=0xDFFF => (REPLACEMENT, false),
            _ => (char::from_u32(unit).unwrap_or(REPLACEMENT), true),
        };

        text.push_str(&source[copied..i]);

        let shift = shifts.last().copied().unwrap_or(0) + (end - i) - ch.len_utf8();
        escapes.push(EscapeOccurrence {
            original: Span::new(i, end),
            translated: text.len(),
            ch,
            lossless,
        });
        shifts.push(shift);
        text.push(ch);

        i = end;
        copied = end;
        backslashes = 0;
    }

    text.push_str(&source[copied..]);

    tracing::trace!(escapes = escapes.len(), "translated unicode escapes");

    Ok(Translated {
        text,
        escapes,
        shifts,
    })
}

/// @ai:intent Read `\u+XXXX` at start, returning the code unit and the end offset
fn read_escape(bytes: &[u8], start: usize) -> Result<(u32, usize), SyntaxError> {
    let mut digits_at = start + 1;

    while bytes.get(digits_at) == Some(&b'u') {
        digits_at += 1;
    }

    let digits = bytes
        .get(digits_at..digits_at + 4)
        .filter(|digits| digits.iter().all(u8::is_ascii_hexdigit))
        .ok_or_else(|| {
            SyntaxError::malformed_escape(start, "expected four hexadecimal digits after `\\u`")
        })?;

    let unit = digits
        .iter()
        .filter_map(|&d| char::from(d).to_digit(16))
        .fold(0, |acc, d| acc * 16 + d);

    Ok((unit, digits_at + 4))
}

/// @ai:intent Read an escape at start if it exists and denotes a low surrogate
fn read_low_surrogate(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    if bytes.get(start) != Some(&b'\\') || bytes.get(start + 1) != Some(&b'u') {
        return None;
    }

    read_escape(bytes, start)
        .ok()
        .filter(|(unit, _)| (0xDC00..=0xDFFF).contains(unit))
}

fn combine_surrogates(high: u32, low: u32) -> char {
    let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    char::from_u32(scalar).unwrap_or(REPLACEMENT)
}
