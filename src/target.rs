//! @ai:module:intent Removal Target Set: annotation names and name patterns to strip
//! @ai:module:layer domain
//! @ai:module:public_api TargetSet, TargetMatch, Resolver
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless true
//!
//! Simple entries match the last segment of the name as written. Qualified
//! entries match the resolved qualified name, which comes from the usage itself
//! when it is written qualified, or from a single-type import otherwise.
//! Patterns are unanchored and match either form.

use crate::annotation::{simple_name, AnnotationUsage, ImportDeclaration};
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// @ai:intent The target entry responsible for a match
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TargetMatch {
    Name(String),
    Pattern(String),
}

impl fmt::Display for TargetMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetMatch::Name(name) => f.write_str(name),
            TargetMatch::Pattern(pattern) => write!(f, "/{}/", pattern),
        }
    }
}

/// @ai:intent Immutable set of names and patterns selecting what to remove
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    simple: BTreeSet<String>,
    qualified: BTreeSet<String>,
    patterns: Vec<Regex>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Build a set from plain names
    /// @ai:example (["Deprecated", "org.junit.Test"]) -> one simple, one qualified entry
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    /// @ai:intent Add a name; a leading `@` and surrounding whitespace are ignored
    pub fn insert(&mut self, name: &str) {
        let name = name.trim();
        let name = name.strip_prefix('@').unwrap_or(name).trim();

        if name.is_empty() {
            return;
        }

        if name.contains('.') {
            self.qualified.insert(name.to_string());
        } else {
            self.simple.insert(name.to_string());
        }
    }

    /// @ai:intent Add a regular expression matched against annotation names
    /// @ai:post Err(Error::Pattern) leaves the set unchanged
    pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)?;
        if !self.patterns.iter().any(|p| p.as_str() == regex.as_str()) {
            self.patterns.push(regex);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.qualified.is_empty() && self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.simple.len() + self.qualified.len() + self.patterns.len()
    }

    /// @ai:intent Every entry of the set, names first
    pub fn entries(&self) -> Vec<TargetMatch> {
        self.simple
            .iter()
            .chain(&self.qualified)
            .map(|name| TargetMatch::Name(name.clone()))
            .chain(
                self.patterns
                    .iter()
                    .map(|p| TargetMatch::Pattern(p.as_str().to_string())),
            )
            .collect()
    }

    /// @ai:intent All entries selecting this usage; empty when it is kept
    /// @ai:example ({"Test"}, "@org.junit.Test") -> [Name("Test")]
    /// @ai:example ({"org.junit.Test"}, "@Test" without import) -> []
    /// @ai:effects pure
    pub fn match_usage(&self, usage: &AnnotationUsage, resolver: &Resolver<'_>) -> Vec<TargetMatch> {
        let resolved = resolver.resolve(&usage.name);
        self.match_name(&usage.name, resolved.as_deref())
    }

    /// @ai:intent Match a written name and its optional resolved qualified form
    pub fn match_name(&self, written: &str, resolved: Option<&str>) -> Vec<TargetMatch> {
        let mut matched = Vec::new();

        let simple = simple_name(written);
        if self.simple.contains(simple) {
            matched.push(TargetMatch::Name(simple.to_string()));
        }

        if let Some(qualified) = resolved.filter(|q| self.qualified.contains(*q)) {
            matched.push(TargetMatch::Name(qualified.to_string()));
        }

        for pattern in &self.patterns {
            let hit = pattern.is_match(written) || resolved.is_some_and(|q| pattern.is_match(q));
            if hit {
                matched.push(TargetMatch::Pattern(pattern.as_str().to_string()));
            }
        }

        matched
    }

    /// @ai:intent All entries selecting this import declaration
    /// @ai:edge_cases wildcard imports match only through patterns
    /// @ai:effects pure
    pub fn match_import(&self, import: &ImportDeclaration) -> Vec<TargetMatch> {
        let mut matched: Vec<TargetMatch> = self
            .patterns
            .iter()
            .filter(|p| p.is_match(&import.name))
            .map(|p| TargetMatch::Pattern(p.as_str().to_string()))
            .collect();

        if import.is_wildcard() && !import.is_static {
            return matched;
        }

        if let Some(type_name) = import.type_name() {
            let simple = simple_name(type_name);
            if self.simple.contains(simple) {
                matched.push(TargetMatch::Name(simple.to_string()));
            }
            if self.qualified.contains(type_name) {
                matched.push(TargetMatch::Name(type_name.to_string()));
            }
            if import.is_static {
                for pattern in self.patterns.iter().filter(|p| p.is_match(type_name)) {
                    let entry = TargetMatch::Pattern(pattern.as_str().to_string());
                    if !matched.contains(&entry) {
                        matched.push(entry);
                    }
                }
            }
        }

        matched
    }
}

/// @ai:intent Resolves written annotation names through single-type imports
pub struct Resolver<'a> {
    imported: HashMap<&'a str, &'a str>,
}

impl<'a> Resolver<'a> {
    /// @ai:intent Index the non-static, non-wildcard imports of one file
    /// @ai:edge_cases the first import of a simple name wins
    pub fn new(imports: &'a [ImportDeclaration]) -> Self {
        let mut imported = HashMap::new();

        for import in imports.iter().filter(|i| !i.is_static && !i.is_wildcard()) {
            imported
                .entry(simple_name(&import.name))
                .or_insert(import.name.as_str());
        }

        Self { imported }
    }

    /// @ai:intent Qualified form of a written name, if one can be determined
    /// @ai:example ("Test" with `import org.junit.Test;`) -> Some("org.junit.Test")
    /// @ai:example ("Outer.Inner" with `import a.Outer;`) -> Some("a.Outer.Inner")
    /// @ai:example ("a.b.C") -> Some("a.b.C")
    /// @ai:example ("Unknown") -> None
    pub fn resolve(&self, written: &str) -> Option<String> {
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };

        match (self.imported.get(head), rest) {
            (Some(qualified), Some(rest)) => Some(format!("{}.{}", qualified, rest)),
            (Some(qualified), None) => Some((*qualified).to_string()),
            (None, Some(_)) => Some(written.to_string()),
            (None, None) => None,
        }
    }
}
