//! @ai:module:intent Load run settings from a TOML file and merge command-line values on top
//! @ai:module:layer infrastructure
//! @ai:module:public_api StripConfig, TargetsConfig, RewriteConfig
//! @ai:module:depends_on target, pipeline, removal, serializer, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::pipeline::Options;
use crate::removal::WhitespacePolicy;
use crate::serializer::EscapeSpelling;
use crate::target::TargetSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Complete configuration of one run
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StripConfig {
    /// Fail when a target or root turns out to be redundant.
    pub strict: bool,
    /// Worker threads; unset means one per available core.
    pub jobs: Option<usize>,
    pub targets: TargetsConfig,
    pub rewrite: RewriteConfig,
}

/// @ai:intent Which annotations to remove
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsConfig {
    pub names: Vec<String>,
    pub patterns: Vec<String>,
}

/// @ai:intent How the output text is produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    pub imports: bool,
    pub whitespace: WhitespacePolicy,
    pub escapes: EscapeSpelling,
}

impl StripConfig {
    /// @ai:intent Read and parse a configuration file
    /// @ai:effects reads path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// @ai:intent Parse configuration text that did not come from a file
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// @ai:intent Append names and patterns given elsewhere, e.g. on the command line
    pub fn extend_targets<N, P>(&mut self, names: N, patterns: P)
    where
        N: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        self.targets.names.extend(names);
        self.targets.patterns.extend(patterns);
    }

    /// @ai:intent Compile the configured names and patterns
    /// @ai:post Err(Error::Pattern) for the first invalid pattern
    pub fn targets(&self) -> Result<TargetSet> {
        let mut set = TargetSet::from_names(&self.targets.names);
        for pattern in &self.targets.patterns {
            set.add_pattern(pattern)?;
        }
        Ok(set)
    }

    pub fn options(&self) -> Options {
        Options {
            whitespace: self.rewrite.whitespace,
            escapes: self.rewrite.escapes,
            strip_imports: self.rewrite.imports,
        }
    }
}
