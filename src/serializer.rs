//! @ai:module:intent Rebuild the output text from everything the edit plan keeps
//! @ai:module:layer application
//! @ai:module:public_api serialize, EscapeSpelling
//! @ai:module:depends_on escape, removal, span
//! @ai:module:stateless true

use crate::escape::Translated;
use crate::removal::EditPlan;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// @ai:intent How retained Unicode escapes are spelled in the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeSpelling {
    /// Retained text is copied from the original input, escapes included.
    #[default]
    Original,
    /// Retained text is copied from the translated view.
    Translated,
}

/// @ai:intent Emit every character not covered by a deletion, in order
/// @ai:pre translated was produced from original and plan from translated.text()
/// @ai:post with an empty plan and Original spelling the output equals original
/// @ai:edge_cases lone surrogate escapes keep their original spelling in both modes
/// @ai:effects pure
pub fn serialize(
    original: &str,
    translated: &Translated,
    plan: &EditPlan,
    spelling: EscapeSpelling,
) -> String {
    let text = translated.text();
    let mut out = String::with_capacity(text.len());
    let mut kept_from = 0;

    for deletion in plan.deletions() {
        let kept = Span::new(kept_from, deletion.start);
        emit(&mut out, original, translated, kept, spelling);
        kept_from = deletion.end;
    }

    emit(
        &mut out,
        original,
        translated,
        Span::new(kept_from, text.len()),
        spelling,
    );

    out
}

/// @ai:intent Append one retained range of the translated text
fn emit(out: &mut String, original: &str, translated: &Translated, kept: Span, spelling: EscapeSpelling) {
    if kept.is_empty() {
        return;
    }

    match spelling {
        EscapeSpelling::Original => {
            out.push_str(translated.original_span(kept).text(original));
        }
        EscapeSpelling::Translated => {
            let text = translated.text();
            let mut from = kept.start;

            for escape in translated.escapes_within(kept).iter().filter(|e| !e.lossless) {
                out.push_str(&text[from..escape.translated]);
                out.push_str(escape.original.text(original));
                from = escape.translated_span().end;
            }

            out.push_str(&text[from..kept.end]);
        }
    }
}
