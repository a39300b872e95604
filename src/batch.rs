//! @ai:module:intent Discover Java sources, transform them in parallel and summarize the run
//! @ai:module:layer infrastructure
//! @ai:module:public_api collect_sources, process_file, process_files, run, write_atomically, BatchOptions, BatchReport, FileOutcome, SourceFile
//! @ai:module:depends_on pipeline, language, target, error
//! @ai:module:stateless true
//!
//! Files share nothing while they are processed, so each one is a separate
//! rayon task. Outcomes come back in source order.

use crate::error::{Error, Result, SyntaxError};
use crate::language::{detect_file_kind, is_supported_file};
use crate::pipeline::{transform_with, Options, Removal, Transformed};
use crate::removal::RemovalKind;
use crate::target::{TargetMatch, TargetSet};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// @ai:intent A file to process and the command-line root it was found under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: PathBuf,
    pub root: PathBuf,
}

/// @ai:intent How a batch run treats its files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub options: Options,
    /// Rewrite changed files instead of keeping the output in memory.
    pub in_place: bool,
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            options: Options::default(),
            in_place: false,
            jobs: thread::available_parallelism().map_or(1, usize::from),
        }
    }
}

/// @ai:intent What happened to one file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(skip)]
    pub root: PathBuf,
    pub changed: bool,
    pub removals: Vec<Removal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<SyntaxError>,
    #[serde(skip)]
    pub matched: BTreeSet<TargetMatch>,
    /// Transformed text, kept only when files are not rewritten in place.
    #[serde(skip)]
    pub text: Option<String>,
}

impl FileOutcome {
    /// @ai:intent Record a transformation result for a file
    pub fn new(source: &SourceFile, result: Result<Transformed>, keep_text: bool) -> Self {
        let mut outcome = Self {
            path: source.path.clone(),
            root: source.root.clone(),
            changed: false,
            removals: Vec::new(),
            error: None,
            syntax: None,
            matched: BTreeSet::new(),
            text: None,
        };

        match result {
            Ok(transformed) => {
                outcome.changed = transformed.is_changed();
                outcome.removals = transformed.removals;
                outcome.matched = transformed.matched;
                if keep_text {
                    outcome.text = Some(transformed.text);
                }
            }
            Err(e) => {
                outcome.syntax = e.syntax().cloned();
                outcome.error = Some(e.to_string());
            }
        }

        outcome
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// @ai:intent Summary of a whole run, including strict-mode findings
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub files_changed: usize,
    pub annotations_removed: usize,
    pub imports_removed: usize,
    pub failures: usize,
    /// Target entries that selected nothing in any file.
    pub unmatched_targets: Vec<TargetMatch>,
    /// Roots under which no file changed.
    pub unchanged_roots: Vec<PathBuf>,
}

impl BatchReport {
    /// @ai:intent Aggregate per-file outcomes
    /// @ai:effects pure
    pub fn new(files: Vec<FileOutcome>, targets: &TargetSet, roots: &[PathBuf]) -> Self {
        let matched: BTreeSet<&TargetMatch> = files.iter().flat_map(|f| &f.matched).collect();

        let unmatched_targets = targets
            .entries()
            .into_iter()
            .filter(|entry| !matched.contains(entry))
            .collect();

        let unchanged_roots = roots
            .iter()
            .filter(|root| !files.iter().any(|f| f.changed && &f.root == *root))
            .cloned()
            .collect();

        let count = |kind: RemovalKind| {
            files
                .iter()
                .flat_map(|f| &f.removals)
                .filter(|r| r.kind == kind)
                .count()
        };

        Self {
            files_changed: files.iter().filter(|f| f.changed).count(),
            annotations_removed: count(RemovalKind::Annotation),
            imports_removed: count(RemovalKind::Import),
            failures: files.iter().filter(|f| f.is_failed()).count(),
            unmatched_targets,
            unchanged_roots,
            files,
        }
    }

    /// @ai:intent True when every file was processed
    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    /// @ai:intent True when some target or root turned out to be redundant
    pub fn has_strict_violations(&self) -> bool {
        !self.unmatched_targets.is_empty() || !self.unchanged_roots.is_empty()
    }
}

/// @ai:intent Expand command-line roots into the Java files to process
/// @ai:pre every root exists
/// @ai:post result is sorted by path without duplicates; symlinks are never followed
/// @ai:effects reads directory entries
pub fn collect_sources(roots: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for root in roots {
        let meta = fs::symlink_metadata(root).map_err(|_| Error::MissingPath { path: root.clone() })?;

        if meta.is_file() {
            sources.push(SourceFile {
                path: root.clone(),
                root: root.clone(),
            });
        } else if meta.is_dir() {
            for entry in WalkDir::new(root)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if is_supported_file(entry.path()) {
                    sources.push(SourceFile {
                        path: entry.into_path(),
                        root: root.clone(),
                    });
                }
            }
        } else {
            tracing::debug!("Skipping symlink {}", root.display());
        }
    }

    sources.sort();
    sources.dedup_by(|a, b| a.path == b.path);

    tracing::debug!("Collected {} source files from {} roots", sources.len(), roots.len());

    Ok(sources)
}

/// @ai:intent Transform one file, rewriting it atomically when asked and changed
/// @ai:post on error the file on disk is untouched
/// @ai:effects reads path; writes path when in_place
pub fn process_file(
    path: &Path,
    targets: &TargetSet,
    options: &Options,
    in_place: bool,
) -> Result<Transformed> {
    let content = fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let file_kind = detect_file_kind(path).unwrap_or_default();
    let transformed = transform_with(&content, targets, file_kind, options)?;

    if in_place && transformed.is_changed() {
        write_atomically(path, &transformed.text)?;
        tracing::info!(
            "Removed {} annotations and {} imports from {}",
            transformed.annotations_removed(),
            transformed.imports_removed(),
            path.display()
        );
    }

    Ok(transformed)
}

/// @ai:intent Replace a file's content through a temporary file in the same directory
/// @ai:post the file holds either its old or its new content, never a mix
/// @ai:effects writes the filesystem
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let write_error = |source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    if let Ok(meta) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_error)?;
    }

    temp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

/// @ai:intent Process files on a pool of up to `jobs` rayon workers
/// @ai:post outcomes are in the order of sources; one failure never stops the others
pub fn process_files(sources: &[SourceFile], targets: &TargetSet, batch: &BatchOptions) -> Vec<FileOutcome> {
    let process = || {
        sources
            .par_iter()
            .map(|source| {
                let result = process_file(&source.path, targets, &batch.options, batch.in_place);
                if let Err(e) = &result {
                    tracing::warn!("Failed to process {}: {}", source.path.display(), e);
                }
                FileOutcome::new(source, result, !batch.in_place)
            })
            .collect::<Vec<_>>()
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(batch.jobs.max(1))
        .build()
    {
        Ok(pool) => pool.install(process),
        Err(e) => {
            tracing::warn!("Falling back to the global thread pool: {}", e);
            process()
        }
    }
}

/// @ai:intent Collect, process and summarize everything under the given roots
/// @ai:post Err only when a root is missing; per-file failures land in the report
pub fn run(roots: &[PathBuf], targets: &TargetSet, batch: &BatchOptions) -> Result<BatchReport> {
    let sources = collect_sources(roots)?;
    let outcomes = process_files(&sources, targets, batch);
    Ok(BatchReport::new(outcomes, targets, roots))
}
