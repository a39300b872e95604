//! @ai:module:intent Classify Java-family source files by kind
//! @ai:module:layer domain
//! @ai:module:public_api FileKind, detect_file_kind, is_supported_file
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const MODULE_DECLARATION_FILE: &str = "module-info.java";

/// @ai:intent Distinguishes ordinary compilation units from module declarations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    #[default]
    CompilationUnit,
    ModuleDeclaration,
}

impl FileKind {
    /// @ai:intent Get file extensions handled for this kind
    /// @ai:effects pure
    pub fn extensions(&self) -> &[&str] {
        &["java"]
    }

    /// @ai:intent Get kind name as string
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            FileKind::CompilationUnit => "compilation unit",
            FileKind::ModuleDeclaration => "module declaration",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// @ai:intent Detect the kind of Java source from a file path
/// @ai:post result is None unless the extension is `.java`
/// @ai:example ("src/Foo.java") -> Some(CompilationUnit)
/// @ai:example ("src/module-info.java") -> Some(ModuleDeclaration)
/// @ai:example ("README.md") -> None
/// @ai:effects pure
pub fn detect_file_kind(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?;

    if !FileKind::CompilationUnit.extensions().contains(&ext) {
        return None;
    }

    match path.file_name().and_then(|name| name.to_str()) {
        Some(MODULE_DECLARATION_FILE) => Some(FileKind::ModuleDeclaration),
        _ => Some(FileKind::CompilationUnit),
    }
}

/// @ai:intent Check if a file should be rewritten based on its name
/// @ai:effects pure
pub fn is_supported_file(path: &Path) -> bool {
    detect_file_kind(path).is_some()
}
