//! Run driver: resolves the current version once, then rewrites every target
//! file in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::constants::{DEFAULT_HELPER_MODULE, DEFAULT_MARKER};
use crate::error::Result;
use crate::rewrite::{process_file, FileOutcome, RewriteContext};
use crate::utils::collect_python_files_gitignore;
use crate::version::{CurrentVersion, VersionSettings};

/// Options for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Extra folder names to skip while walking directories.
    pub exclude: Vec<String>,
    /// Compute and report without writing.
    pub dry_run: bool,
    /// Report walk errors.
    pub verbose: bool,
    /// Marker decorator name.
    pub marker: String,
    /// Module the marker decorator comes from.
    pub helper_module: String,
    /// Progress bar advanced once per file (thread-safe).
    pub progress_bar: Option<Arc<indicatif::ProgressBar>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            dry_run: false,
            verbose: false,
            marker: DEFAULT_MARKER.to_owned(),
            helper_module: DEFAULT_HELPER_MODULE.to_owned(),
            progress_bar: None,
        }
    }
}

/// A file that could not be rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    /// File that failed.
    pub path: PathBuf,
    /// Error message.
    pub error: String,
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Version the run compared against.
    pub current: CurrentVersion,
    /// True when nothing was written on purpose.
    pub dry_run: bool,
    /// Number of files looked at.
    pub files_scanned: usize,
    /// Files with something to report, in path order.
    pub files: Vec<FileOutcome>,
    /// Files that failed, in path order.
    pub errors: Vec<FileError>,
}

impl RunReport {
    /// Files whose text changed (or would change, in a dry run).
    #[must_use]
    pub fn changed_files(&self) -> usize {
        self.files.iter().filter(|f| f.rewrite.changed).count()
    }

    /// Declarations removed across all files.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.files.iter().map(|f| f.rewrite.removed.len()).sum()
    }

    /// Declarations expiring at the current version across all files.
    #[must_use]
    pub fn expiring_count(&self) -> usize {
        self.files.iter().map(|f| f.rewrite.expiring.len()).sum()
    }

    /// True if any file failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Expands `paths` into the list of files to process.
///
/// Files are taken as given, whatever their extension; directories are
/// walked for `.py` files. A file reached twice is returned once.
#[must_use]
pub fn collect_targets(paths: &[PathBuf], exclude: &[String], verbose: bool) -> Vec<PathBuf> {
    let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
    let mut targets = Vec::new();

    let mut push = |path: PathBuf| {
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            targets.push(path);
        }
    };

    for path in paths {
        if path.is_dir() {
            let (files, _) = collect_python_files_gitignore(path, exclude, verbose);
            files.into_iter().for_each(&mut push);
        } else {
            push(path.clone());
        }
    }
    targets
}

/// Runs the rewriter over `paths`.
///
/// # Errors
///
/// Only run-scoped errors are returned: `Configuration` or
/// `VersionSourceUnresolvable`, before any file is touched. Per-file
/// failures land in [`RunReport::errors`].
pub fn run(paths: &[PathBuf], settings: &VersionSettings, options: &RunOptions) -> Result<RunReport> {
    let current = settings.resolve()?;
    let ctx = RewriteContext {
        current: current.version.clone(),
        marker: options.marker.clone(),
        helper_module: options.helper_module.clone(),
    };

    let targets = collect_targets(paths, &options.exclude, options.verbose);
    if let Some(pb) = &options.progress_bar {
        pb.set_length(targets.len() as u64);
    }

    let results: Vec<(&Path, Result<FileOutcome>)> = targets
        .par_iter()
        .map(|path| {
            let outcome = process_file(path, &ctx, options.dry_run);
            if let Some(pb) = &options.progress_bar {
                pb.inc(1);
            }
            (path.as_path(), outcome)
        })
        .collect();

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                let rewrite = &outcome.rewrite;
                if rewrite.changed || !rewrite.expiring.is_empty() {
                    files.push(outcome);
                }
            }
            Err(e) => errors.push(FileError {
                path: path.to_path_buf(),
                error: e.to_string(),
            }),
        }
    }

    Ok(RunReport {
        current,
        dry_run: options.dry_run,
        files_scanned: targets.len(),
        files,
        errors,
    })
}

/// Convenience wrapper for a single file with a literal version.
///
/// # Errors
///
/// Same as [`process_file`].
pub fn deprecate_file(path: &Path, current: &str, dry_run: bool) -> Result<FileOutcome> {
    let current = VersionSettings {
        literal: Some(current.to_owned()),
        ..VersionSettings::default()
    }
    .resolve()?;
    process_file(path, &RewriteContext::new(current.version), dry_run)
}
