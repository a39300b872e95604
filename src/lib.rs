//! @ai:module:intent Annotation stripper library for Java-family sources
//! @ai:module:layer infrastructure
//! @ai:module:public_api pipeline, batch, config, target, output, error
//! @ai:module:stateless true
//!
//! # unannotate
//!
//! Removes selected annotation usages from Java compilation units and
//! `module-info.java` declarations while leaving every other byte untouched.
//! Unicode escapes are translated before scanning, comments and literals are
//! opaque, and removal follows a configurable whitespace policy.
//!
//! ## Example
//!
//! ```rust,no_run
//! use unannotate::{batch, output, transform, BatchOptions, TargetSet};
//! use std::path::PathBuf;
//!
//! // Transform a buffer
//! let targets = TargetSet::from_names(["Deprecated"]);
//! let text = transform("@Deprecated\nint foo;\n", &targets).unwrap();
//! assert_eq!(text, "int foo;\n");
//!
//! // Rewrite a source tree in place
//! let options = BatchOptions { in_place: true, ..BatchOptions::default() };
//! let report = batch::run(&[PathBuf::from("src")], &targets, &options).unwrap();
//! println!("{}", output::format_report(&report, output::OutputFormat::Text, false));
//! ```

pub mod annotation;
pub mod batch;
pub mod config;
pub mod error;
pub mod escape;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod recognizer;
pub mod removal;
pub mod scanner;
pub mod serializer;
pub mod span;
pub mod target;

pub use annotation::{AnnotationUsage, ImportDeclaration, Recognized};
pub use batch::{
    collect_sources, process_file, process_files, BatchOptions, BatchReport, FileOutcome,
    SourceFile,
};
pub use config::StripConfig;
pub use error::{Error, Result, SyntaxError, SyntaxErrorKind};
pub use escape::{translate, Translated};
pub use language::{detect_file_kind, is_supported_file, FileKind};
pub use output::{format_report, format_source, OutputFormat};
pub use pipeline::{transform, transform_with, Options, Removal, Transformed};
pub use recognizer::recognize;
pub use removal::{EditPlan, RemovalKind, WhitespacePolicy};
pub use scanner::{tokenize, Token, TokenKind};
pub use serializer::{serialize, EscapeSpelling};
pub use span::{Position, Span};
pub use target::{TargetMatch, TargetSet};
