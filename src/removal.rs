//! @ai:module:intent Select matching usages and imports and plan the byte ranges to delete
//! @ai:module:layer application
//! @ai:module:public_api plan, EditPlan, PlannedRemoval, RemovalKind, WhitespacePolicy
//! @ai:module:depends_on annotation, target, span
//! @ai:module:stateless true
//!
//! All offsets are in the escape-translated text. The plan is sorted and its
//! deletions never overlap or touch; touching ranges are merged.

use crate::annotation::Recognized;
use crate::span::Span;
use crate::target::{Resolver, TargetMatch, TargetSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// @ai:intent How much whitespace goes with a removed span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhitespacePolicy {
    /// Only the span itself.
    Exact,
    /// Trailing blanks, plus the whole line when nothing else is left on it.
    #[default]
    Line,
    /// All following whitespace, line terminators included.
    Greedy,
}

/// @ai:intent What kind of construct a planned removal deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalKind {
    Annotation,
    Import,
}

impl fmt::Display for RemovalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalKind::Annotation => f.write_str("annotation"),
            RemovalKind::Import => f.write_str("import"),
        }
    }
}

/// @ai:intent One matched construct and the entries that selected it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRemoval {
    pub kind: RemovalKind,
    pub name: String,
    /// Span of the construct alone, before any whitespace extension.
    pub span: Span,
    pub matched: Vec<TargetMatch>,
}

/// @ai:intent Sorted, disjoint deletions plus what caused them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    deletions: Vec<Span>,
    removals: Vec<PlannedRemoval>,
    matched: BTreeSet<TargetMatch>,
}

impl EditPlan {
    pub fn deletions(&self) -> &[Span] {
        &self.deletions
    }

    pub fn removals(&self) -> &[PlannedRemoval] {
        &self.removals
    }

    /// @ai:intent Entries that selected something, collapsed nested usages included
    pub fn matched(&self) -> &BTreeSet<TargetMatch> {
        &self.matched
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty()
    }

    /// @ai:intent Append a deletion, absorbing trailing deletions it overlaps or touches
    /// @ai:pre span ends after every existing deletion starts
    fn push_deletion(&mut self, mut span: Span) {
        if span.is_empty() {
            return;
        }

        while let Some(last) = self.deletions.last() {
            if !last.touches(&span) {
                break;
            }
            span = Span::new(last.start.min(span.start), last.end.max(span.end));
            self.deletions.pop();
        }

        self.deletions.push(span);
    }

    /// @ai:intent Find whether some deletion ends exactly at offset, returning its start
    fn deletion_ending_at(&self, offset: usize) -> Option<usize> {
        self.deletions
            .binary_search_by_key(&offset, |d| d.end)
            .ok()
            .map(|index| self.deletions[index].start)
    }
}

/// @ai:intent Build the edit plan for one file
/// @ai:pre recognized was produced from text
/// @ai:post usages nested inside a removed usage get no deletion of their own
/// @ai:post imports are only considered when strip_imports is set
/// @ai:effects pure
pub fn plan(
    text: &str,
    recognized: &Recognized,
    targets: &TargetSet,
    policy: WhitespacePolicy,
    strip_imports: bool,
) -> EditPlan {
    let mut plan = EditPlan::default();
    let resolver = Resolver::new(&recognized.imports);
    let mut candidates = Vec::new();
    let mut removed_until = 0;

    for usage in &recognized.usages {
        let matched = targets.match_usage(usage, &resolver);
        if matched.is_empty() {
            continue;
        }

        plan.matched.extend(matched.iter().cloned());

        if usage.span.start < removed_until {
            if usage.depth >= 2 {
                warn!(
                    name = %usage.name,
                    depth = usage.depth,
                    "matched annotation collapsed into an enclosing removal at depth 2 or more"
                );
            } else {
                debug!(name = %usage.name, "matched annotation collapsed into enclosing removal");
            }
            continue;
        }

        removed_until = usage.span.end;
        candidates.push(PlannedRemoval {
            kind: RemovalKind::Annotation,
            name: usage.name.clone(),
            span: usage.span,
            matched,
        });
    }

    if strip_imports {
        for import in &recognized.imports {
            let matched = targets.match_import(import);
            if matched.is_empty() {
                continue;
            }

            plan.matched.extend(matched.iter().cloned());
            candidates.push(PlannedRemoval {
                kind: RemovalKind::Import,
                name: import.name.clone(),
                span: import.span,
                matched,
            });
        }
    }

    candidates.sort_by_key(|c| c.span.start);

    for candidate in candidates {
        let deletion = extend(text, candidate.span, policy, &plan);
        debug!(
            kind = %candidate.kind,
            name = %candidate.name,
            span = %deletion,
            "planned removal"
        );
        plan.push_deletion(deletion);
        plan.removals.push(candidate);
    }

    plan
}

/// @ai:intent Grow a removed span by the whitespace the policy takes with it
fn extend(text: &str, span: Span, policy: WhitespacePolicy, plan: &EditPlan) -> Span {
    let bytes = text.as_bytes();

    match policy {
        WhitespacePolicy::Exact => span,
        WhitespacePolicy::Greedy => {
            let mut after = span.end;
            while bytes.get(after).is_some_and(|b| is_whitespace(*b)) {
                after += 1;
            }

            if after == bytes.len() {
                span
            } else {
                Span::new(span.start, after)
            }
        }
        WhitespacePolicy::Line => {
            let mut after = span.end;
            while bytes.get(after).is_some_and(|b| is_horizontal_space(*b)) {
                after += 1;
            }

            let Some(terminator) = terminator_len(bytes, after) else {
                return Span::new(span.start, after);
            };

            match blank_line_start(bytes, span.start, plan) {
                Some(line_start) => Span::new(line_start, after + terminator),
                None => Span::new(span.start, after),
            }
        }
    }
}

/// UTF-8 encoding of a leading U+FEFF byte order mark.
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// @ai:intent Start of the physical line when everything before offset on it is blank or deleted
/// @ai:post a byte order mark at the start of the input counts as blank and is kept
fn blank_line_start(bytes: &[u8], offset: usize, plan: &EditPlan) -> Option<usize> {
    let mut i = offset;

    loop {
        if i == 0 || matches!(bytes[i - 1], b'\n' | b'\r') {
            return Some(i);
        }
        if i == BOM.len() && bytes.starts_with(BOM) {
            return Some(i);
        }

        if let Some(start) = plan.deletion_ending_at(i) {
            i = start;
        } else if is_horizontal_space(bytes[i - 1]) {
            i -= 1;
        } else {
            return None;
        }
    }
}

/// @ai:intent Length of the line terminator at offset; 0 at end of input
fn terminator_len(bytes: &[u8], offset: usize) -> Option<usize> {
    match &bytes[offset..] {
        [] => Some(0),
        [b'\r', b'\n', ..] => Some(2),
        [b'\n' | b'\r', ..] => Some(1),
        _ => None,
    }
}

fn is_horizontal_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0C')
}

fn is_whitespace(b: u8) -> bool {
    is_horizontal_space(b) || matches!(b, b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::recognize;
    use crate::scanner::tokenize;
    use pretty_assertions::assert_eq;

    fn planned(text: &str, names: &[&str], policy: WhitespacePolicy, imports: bool) -> EditPlan {
        let recognized = recognize(text, &tokenize(text).unwrap()).unwrap();
        plan(text, &recognized, &TargetSet::from_names(names), policy, imports)
    }

    /// Text left over after applying the plan directly to the input.
    fn apply(text: &str, names: &[&str], policy: WhitespacePolicy) -> String {
        let plan = planned(text, names, policy, true);
        let mut out = String::new();
        let mut copied = 0;
        for deletion in plan.deletions() {
            out.push_str(&text[copied..deletion.start]);
            copied = deletion.end;
        }
        out.push_str(&text[copied..]);
        out
    }

    fn line(text: &str, names: &[&str]) -> String {
        apply(text, names, WhitespacePolicy::Line)
    }

    #[test]
    fn test_annotation_only_line_disappears() {
        assert_eq!(line("@Deprecated\nint foo;\n", &["Deprecated"]), "int foo;\n");
        assert_eq!(
            line("class A {\n    @Serial\n    int x;\n}", &["Serial"]),
            "class A {\n    int x;\n}"
        );
        assert_eq!(line("@A\r\nint x;", &["A"]), "int x;");
        assert_eq!(line("@A\rint x;", &["A"]), "int x;");
        assert_eq!(line("x;\n@A", &["A"]), "x;\n");
    }

    #[test]
    fn test_inline_annotation_keeps_line() {
        assert_eq!(
            line("@Deprecated module m { requires x; }", &["Deprecated"]),
            "module m { requires x; }"
        );
        assert_eq!(line("void m(@A Object o) {}", &["A"]), "void m(Object o) {}");
        assert_eq!(line("int x; @A\nint y;", &["A"]), "int x; \nint y;");
    }

    #[test]
    fn test_consecutive_annotations_on_one_line() {
        assert_eq!(line("    @A @B\nint x;", &["A", "B"]), "int x;");
        assert_eq!(line("@A @B int x;", &["A", "B"]), "int x;");
        assert_eq!(line("@A @C @B\nint x;", &["A", "B"]), "@C \nint x;");
    }

    #[test]
    fn test_byte_order_mark_is_blank_line_start() {
        assert_eq!(
            line("\u{FEFF}@A\nclass C {}", &["A"]),
            "\u{FEFF}class C {}"
        );
        assert_eq!(
            line("\u{FEFF}  @A @B\nclass C {}", &["A", "B"]),
            "\u{FEFF}class C {}"
        );
        assert_eq!(line("\u{FEFF}@A class C {}", &["A"]), "\u{FEFF}class C {}");
    }

    #[test]
    fn test_consecutive_annotation_lines() {
        assert_eq!(
            line("  @A\n  @B(x = 1)\n  int x;\n", &["A", "B"]),
            "  int x;\n"
        );
    }

    #[test]
    fn test_exact_and_greedy_policies() {
        assert_eq!(
            apply("  @A\n  int x;", &["A"], WhitespacePolicy::Exact),
            "  \n  int x;"
        );
        assert_eq!(
            apply("  @A\n  int x;", &["A"], WhitespacePolicy::Greedy),
            "  int x;"
        );
        assert_eq!(apply("x; @A \n", &["A"], WhitespacePolicy::Greedy), "x;  \n");
    }

    #[test]
    fn test_nested_matches_collapse() {
        let text = "@A(@A(1)) int x;";
        let plan = planned(text, &["A"], WhitespacePolicy::Exact, false);
        assert_eq!(plan.deletions(), &[Span::new(0, 9)]);
        assert_eq!(plan.removals().len(), 1);
        assert_eq!(plan.removals()[0].kind, RemovalKind::Annotation);
    }

    #[test]
    fn test_nested_only_inner_removed() {
        assert_eq!(line("@A(@B) int x;", &["B"]), "@A() int x;");
    }

    #[test]
    fn test_non_usage_is_kept() {
        let text = "class C { int foo; }";
        assert!(planned(text, &["foo"], WhitespacePolicy::Line, true).is_empty());
    }

    #[test]
    fn test_imports_only_when_requested() {
        let text = "import java.io.Serial;\nimport java.util.List;\n\nclass A {\n    @Serial\n    long x;\n}\n";
        let without = planned(text, &["Serial"], WhitespacePolicy::Line, false);
        assert_eq!(without.removals().len(), 1);

        assert_eq!(
            line(text, &["Serial"]),
            "import java.util.List;\n\nclass A {\n    long x;\n}\n"
        );
    }

    #[test]
    fn test_package_annotation_before_imports() {
        let text = "@Deprecated\npackage p;\nimport a.Deprecated;\n";
        let plan = planned(text, &["Deprecated"], WhitespacePolicy::Line, true);
        let kinds: Vec<_> = plan.removals().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RemovalKind::Annotation, RemovalKind::Import]);
        assert_eq!(line(text, &["Deprecated"]), "package p;\n");
    }

    #[test]
    fn test_matched_entries_are_recorded() {
        let plan = planned("@A(@B) @C", &["A", "B", "Z"], WhitespacePolicy::Line, false);
        let matched: Vec<_> = plan.matched().iter().map(|m| m.to_string()).collect();
        assert_eq!(matched, vec!["A", "B"]);
    }
}
