//! @ai:module:intent Run the five stages over one in-memory source buffer
//! @ai:module:layer application
//! @ai:module:public_api transform, transform_with, Options, Transformed, Removal
//! @ai:module:depends_on escape, scanner, recognizer, removal, serializer, target
//! @ai:module:stateless true
//!
//! Every stage is pure and sequential. The first error aborts the file and no
//! output is produced; the error is repositioned onto the original input.

use crate::error::{Error, Result, SyntaxError};
use crate::escape::translate;
use crate::language::FileKind;
use crate::recognizer::recognize;
use crate::removal::{plan, RemovalKind, WhitespacePolicy};
use crate::scanner::tokenize;
use crate::serializer::{serialize, EscapeSpelling};
use crate::span::Position;
use crate::target::{TargetMatch, TargetSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// @ai:intent Per-call rewrite settings, threaded explicitly through the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub whitespace: WhitespacePolicy,
    pub escapes: EscapeSpelling,
    /// Also delete import declarations of matching names.
    pub strip_imports: bool,
}

/// @ai:intent One removed construct, located in the original input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub kind: RemovalKind,
    pub name: String,
    pub position: Position,
}

/// @ai:intent Result of transforming one buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformed {
    pub text: String,
    pub removals: Vec<Removal>,
    /// Target entries that selected at least one construct.
    pub matched: BTreeSet<TargetMatch>,
    changed: bool,
}

impl Transformed {
    /// @ai:intent True when the output differs from the input
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn annotations_removed(&self) -> usize {
        self.count(RemovalKind::Annotation)
    }

    pub fn imports_removed(&self) -> usize {
        self.count(RemovalKind::Import)
    }

    fn count(&self, kind: RemovalKind) -> usize {
        self.removals.iter().filter(|r| r.kind == kind).count()
    }
}

/// @ai:intent Remove every usage of the target annotations from a compilation unit
/// @ai:pre targets is fixed for the duration of the call
/// @ai:post Ok text equals the input when nothing matches
/// @ai:example ("@Deprecated\nint foo;\n", {"Deprecated"}) -> "int foo;\n"
/// @ai:effects pure
pub fn transform(text: &str, targets: &TargetSet) -> Result<String> {
    transform_with(text, targets, FileKind::default(), &Options::default()).map(|t| t.text)
}

/// @ai:intent Full pipeline with explicit file kind and options
/// @ai:post Err carries the file kind and a position in the original input
/// @ai:effects pure
pub fn transform_with(
    original: &str,
    targets: &TargetSet,
    file_kind: FileKind,
    options: &Options,
) -> Result<Transformed> {
    let syntax = |source: SyntaxError| Error::Syntax { file_kind, source };

    let translated = translate(original).map_err(|e| syntax(e.locate_in(original)))?;
    let text = translated.text();

    let tokens = tokenize(text).map_err(|e| syntax(e.relocate(&translated, original)))?;
    let recognized =
        recognize(text, &tokens).map_err(|e| syntax(e.relocate(&translated, original)))?;

    let plan = plan(
        text,
        &recognized,
        targets,
        options.whitespace,
        options.strip_imports,
    );
    let output = serialize(original, &translated, &plan, options.escapes);

    let removals: Vec<Removal> = plan
        .removals()
        .iter()
        .map(|r| Removal {
            kind: r.kind,
            name: r.name.clone(),
            position: Position::locate(original, translated.original_offset(r.span.start)),
        })
        .collect();

    debug!(
        %file_kind,
        usages = recognized.usages.len(),
        removed = removals.len(),
        "transformed source"
    );

    Ok(Transformed {
        changed: output != original,
        text: output,
        removals,
        matched: plan.matched().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxErrorKind;
    use pretty_assertions::assert_eq;

    fn names(names: &[&str]) -> TargetSet {
        TargetSet::from_names(names)
    }

    fn pattern(pattern: &str) -> TargetSet {
        let mut set = TargetSet::new();
        set.add_pattern(pattern).unwrap();
        set
    }

    fn with_imports(text: &str, targets: &TargetSet) -> String {
        let options = Options {
            strip_imports: true,
            ..Options::default()
        };
        transform_with(text, targets, FileKind::CompilationUnit, &options)
            .unwrap()
            .text
    }

    #[test]
    fn test_removes_annotation_line() {
        assert_eq!(
            transform("@Deprecated\nint foo;\n", &names(&["Deprecated"])).unwrap(),
            "int foo;\n"
        );
    }

    #[test]
    fn test_escaped_marker_is_equivalent() {
        let targets = names(&["Serial"]);
        assert_eq!(transform("@Serial\nint foo;\n", &targets).unwrap(), "int foo;\n");
        assert_eq!(
            transform("\\u0040Serial\nint foo;\n", &targets).unwrap(),
            "int foo;\n"
        );
    }

    #[test]
    fn test_field_named_like_target_is_kept() {
        let text = "class C { int foo; }";
        assert_eq!(transform(text, &names(&["foo"])).unwrap(), text);
    }

    #[test]
    fn test_module_declaration_annotation() {
        let result = transform_with(
            "@Deprecated module m { requires x; }",
            &names(&["Deprecated"]),
            FileKind::ModuleDeclaration,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(result.text, "module m { requires x; }");
        assert_eq!(result.annotations_removed(), 1);
        assert!(result.is_changed());
    }

    #[test]
    fn test_unterminated_comment_reports_original_position() {
        let err = transform("int a;\n\\u002f* open", &names(&["A"])).unwrap_err();
        let syntax = err.syntax().unwrap();
        assert_eq!(syntax.kind, SyntaxErrorKind::UnterminatedToken);
        assert_eq!(syntax.position.offset, 7);
        assert_eq!((syntax.position.line, syntax.position.column), (2, 1));
    }

    #[test]
    fn test_malformed_escape_and_annotation() {
        let err = transform("int a = 1; \\uXYZW", &names(&["A"])).unwrap_err();
        assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::MalformedEscape));

        let err = transform("class C {\n  @A(\n}", &names(&["A"])).unwrap_err();
        assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::MalformedAnnotation));
        assert_eq!(err.syntax().unwrap().position.line, 3);
    }

    #[test]
    fn test_errors_carry_file_kind() {
        let err = transform_with(
            "/*",
            &names(&["A"]),
            FileKind::ModuleDeclaration,
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax {
                file_kind: FileKind::ModuleDeclaration,
                ..
            }
        ));
    }

    #[test]
    fn test_array_creation_type_annotation() {
        assert_eq!(
            transform("new @Nullable Object[initialCapacity];", &pattern("Nullable")).unwrap(),
            "new Object[initialCapacity];"
        );
    }

    #[test]
    fn test_pattern_removals() {
        assert_eq!(
            transform("@A(value = /* ) */ \")\")//)", &pattern("A")).unwrap(),
            "//)"
        );
        assert_eq!(transform("\n@A\nclass C {}", &pattern("A")).unwrap(), "\nclass C {}");
        assert_eq!(
            transform("\n\t@A\n\tclass C {}", &pattern("A")).unwrap(),
            "\n\tclass C {}"
        );
        assert_eq!(transform("@a/*A*/.B", &pattern("A")).unwrap(), "@a/*A*/.B");
        assert_eq!(transform("@a/*A*/.B", &pattern("B")).unwrap(), "");
        assert_eq!(transform("@ A", &pattern("A")).unwrap(), "");
        assert_eq!(transform("@//\nA", &pattern("A")).unwrap(), "");
        assert_eq!(transform("@A/*(B)*/", &pattern("B")).unwrap(), "@A/*(B)*/");
    }

    #[test]
    fn test_header_block() {
        let original = "
@SuppressWarnings
@SuppressFBWarnings(value = {\"EI_EXPOSE_REP\", \"EI_EXPOSE_REP2\"})
@org.junit.Test
@org.junit.jupiter.api.Test
";
        assert_eq!(
            transform(original, &pattern("Suppress")).unwrap(),
            "
@org.junit.Test
@org.junit.jupiter.api.Test
"
        );
        assert_eq!(
            transform(original, &pattern("org[.]junit[.]Test")).unwrap(),
            "
@SuppressWarnings
@SuppressFBWarnings(value = {\"EI_EXPOSE_REP\", \"EI_EXPOSE_REP2\"})
@org.junit.jupiter.api.Test
"
        );
        assert_eq!(
            transform(original, &names(&["org.junit.Test"])).unwrap(),
            transform(original, &pattern("org[.]junit[.]Test")).unwrap()
        );
        assert_eq!(
            transform(original, &pattern("Test")).unwrap(),
            "
@SuppressWarnings
@SuppressFBWarnings(value = {\"EI_EXPOSE_REP\", \"EI_EXPOSE_REP2\"})
"
        );
    }

    #[test]
    fn test_import_removal() {
        let original = "
import java.lang.Runnable;
import java.util.List;
import static java.util.*;
import static java.lang.String.valueOf;
import com.google.common.util.concurrent.Service;
";
        assert_eq!(
            with_imports(original, &pattern("Runnable")),
            "
import java.util.List;
import static java.util.*;
import static java.lang.String.valueOf;
import com.google.common.util.concurrent.Service;
"
        );
        assert_eq!(
            with_imports(original, &pattern("java[.]util")),
            "
import java.lang.Runnable;
import static java.lang.String.valueOf;
import com.google.common.util.concurrent.Service;
"
        );
        assert_eq!(with_imports(original, &pattern("static")), original);
        assert_eq!(with_imports("import/**/A/**/;/**/", &pattern("A")), "/**/");
        assert_eq!(with_imports("import A./*B;*/C;", &pattern("A[.]C")), "");
        assert_eq!(with_imports("import static a . b /**/ . A;", &pattern("A")), "");
        assert_eq!(with_imports("import/* A */B;", &pattern("A")), "import/* A */B;");
    }

    #[test]
    fn test_imports_kept_by_default() {
        let text = "import java.io.Serial;\nclass A {\n  @Serial long x;\n}\n";
        assert_eq!(
            transform(text, &names(&["Serial"])).unwrap(),
            "import java.io.Serial;\nclass A {\n  long x;\n}\n"
        );
    }

    #[test]
    fn test_qualified_target_resolves_through_import() {
        let text = "import org.junit.Test;\n\nclass T {\n    @Test\n    void t() {}\n}\n";
        let result = transform_with(
            text,
            &names(&["org.junit.Test"]),
            FileKind::CompilationUnit,
            &Options {
                strip_imports: true,
                ..Options::default()
            },
        )
        .unwrap();
        assert_eq!(result.text, "\nclass T {\n    void t() {}\n}\n");
        assert_eq!((result.annotations_removed(), result.imports_removed()), (1, 1));
        assert_eq!(
            result.matched.into_iter().collect::<Vec<_>>(),
            vec![TargetMatch::Name("org.junit.Test".to_string())]
        );
    }

    #[test]
    fn test_unrelated_simple_name_is_kept_for_qualified_target() {
        let text = "import org.testng.Test;\n@Test class T {}";
        assert_eq!(transform(text, &names(&["org.junit.Test"])).unwrap(), text);
    }

    #[test]
    fn test_leading_byte_order_mark_is_kept_without_blank_line() {
        let text = "\u{FEFF}@A\nclass C {}";
        assert_eq!(
            transform(text, &names(&["A"])).unwrap(),
            "\u{FEFF}class C {}"
        );
    }

    #[test]
    fn test_removal_positions_are_original() {
        let result = transform_with(
            "int a;\r\n  \\u0040A int b;",
            &names(&["A"]),
            FileKind::CompilationUnit,
            &Options::default(),
        )
        .unwrap();
        assert_eq!(result.text, "int a;\r\n  int b;");
        let position = result.removals[0].position;
        assert_eq!((position.offset, position.line, position.column), (10, 2, 3));
    }

    #[test]
    fn test_translated_spelling() {
        let options = Options {
            escapes: EscapeSpelling::Translated,
            ..Options::default()
        };
        let result = transform_with(
            "char c = '\\u0041';",
            &TargetSet::new(),
            FileKind::CompilationUnit,
            &options,
        )
        .unwrap();
        assert_eq!(result.text, "char c = 'A';");
        assert!(result.is_changed());
    }

    #[test]
    fn test_empty_targets_is_identity() {
        let text = "@A\nclass C { String s = \"\\u0040B\"; }\n";
        let result =
            transform_with(text, &TargetSet::new(), FileKind::default(), &Options::default())
                .unwrap();
        assert_eq!(result.text, text);
        assert!(!result.is_changed());
    }
}
