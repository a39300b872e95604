//! Property-based tests for the transformation pipeline
//!
//! Inputs are assembled from self-contained Java fragments, so every generated
//! file scans cleanly unless a test appends something broken on purpose.
//! Fragments are joined with a space so a usage never runs into the identifier
//! after it (`@A` followed by `class` would otherwise read as `@Aclass`).

use proptest::prelude::*;
use unannotate::{transform, SyntaxErrorKind, TargetSet};

/// Fragments that never mention the targeted annotation `A` as a usage.
const NEUTRAL: &[&str] = &[
    "@Keep",
    "@B(x = 1)",
    "@Keep(@B)",
    "int A = 1;",
    "A.call();",
    "// @A\n",
    "/* @A(x) */",
    "\"@A\"",
    "'@'",
    "class C {",
    "}",
    "void m(@B Object o) {}",
    "import a.A;\n",
    "char c = '\\u0041';",
    "String s = \"\\u0040A\";",
    " ",
    "\n",
    "\t",
    "\r\n",
];

/// Usages of `A` in plain spelling, paired with an escaped spelling of the same usage.
const USAGES: &[(&str, &str)] = &[
    ("@A", "\\u0040A"),
    ("@A(x = 1)", "\\u0040A(x \\u003d 1)"),
    ("@pkg.A", "\\u0040pkg\\u002eA"),
    ("@A(@B)", "@\\u0041(@B)"),
    ("@B(@A)", "@B(\\u0040A)"),
];

#[derive(Debug, Clone)]
enum Fragment {
    Neutral(&'static str),
    Usage(usize),
}

fn neutral_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(NEUTRAL), 0..24).prop_map(|parts| parts.join(" "))
}

fn fragments() -> impl Strategy<Value = Vec<Fragment>> {
    let fragment = prop_oneof![
        prop::sample::select(NEUTRAL).prop_map(Fragment::Neutral),
        (0..USAGES.len()).prop_map(Fragment::Usage),
    ];
    prop::collection::vec(fragment, 0..24)
}

/// Render fragments, choosing the escaped spelling of usages when asked.
fn render(fragments: &[Fragment], escaped: bool) -> String {
    fragments
        .iter()
        .map(|f| match f {
            Fragment::Neutral(text) => *text,
            Fragment::Usage(i) if escaped => USAGES[*i].1,
            Fragment::Usage(i) => USAGES[*i].0,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn targets() -> TargetSet {
    TargetSet::from_names(["A"])
}

#[test]
fn usage_next_to_a_keyword_is_separated() {
    let fragments = [Fragment::Usage(0), Fragment::Neutral("class C {")];
    let plain = transform(&render(&fragments, false), &targets()).unwrap();
    let escaped = transform(&render(&fragments, true), &targets()).unwrap();

    assert_eq!(plain, "class C {");
    assert_eq!(escaped, plain);
}

proptest! {
    #[test]
    fn no_matching_usage_means_no_change(text in neutral_text()) {
        let unused = TargetSet::from_names(["Z"]);
        let with_targets = transform(&text, &unused).unwrap();
        let without = transform(&text, &TargetSet::new()).unwrap();

        prop_assert_eq!(&with_targets, &text);
        prop_assert_eq!(&without, &text);
    }

    #[test]
    fn transform_is_idempotent(fragments in fragments()) {
        let text = render(&fragments, false);
        let once = transform(&text, &targets()).unwrap();
        let twice = transform(&once, &targets()).unwrap();

        prop_assert_eq!(twice, once);
    }

    #[test]
    fn escaped_usages_are_removed_identically(fragments in fragments()) {
        let plain = transform(&render(&fragments, false), &targets()).unwrap();
        let escaped = transform(&render(&fragments, true), &targets()).unwrap();

        prop_assert_eq!(escaped, plain);
    }

    #[test]
    fn fields_named_like_targets_survive(fragments in fragments()) {
        let text = render(&fragments, false);
        let out = transform(&text, &targets()).unwrap();

        prop_assert_eq!(out.matches("int A = 1;").count(), text.matches("int A = 1;").count());
        prop_assert_eq!(out.matches("import a.A;").count(), text.matches("import a.A;").count());
    }

    #[test]
    fn unterminated_comment_is_reported(
        prefix in neutral_text(),
        tail in "[a-z @(\n]{0,40}",
    ) {
        let text = format!("{}/*{}", prefix, tail);
        let err = transform(&text, &targets()).unwrap_err();
        let syntax = err.syntax().unwrap();

        prop_assert_eq!(syntax.kind, SyntaxErrorKind::UnterminatedToken);
        prop_assert_eq!(syntax.position.offset, prefix.len());
    }
}
