//! Path utilities for auto-deprecator.
//!
//! This module consolidates all path-related logic for:
//! - Cross-platform path normalization
//! - Python file discovery with gitignore support

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use auto_deprecator::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\pkg\\api.py")), "pkg/api.py");
/// assert_eq!(normalize_display_path(Path::new("./src/main.py")), "src/main.py");
/// ```
#[must_use]
pub fn normalize_display_path(path: &std::path::Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    for exclude in excludes {
        if exclude.starts_with("*.") {
            if name.ends_with(&exclude[1..]) {
                return true;
            }
        } else if name == exclude {
            return true;
        }
    }
    false
}

/// Collects Python files from a directory with gitignore support.
///
/// Uses the `ignore` crate to respect .gitignore, .git/info/exclude, and global gitignore
/// IN ADDITION to the hardcoded default exclusions (venv, `node_modules`, build, etc.).
///
/// # Arguments
/// * `root` - Root directory to search
/// * `exclude` - Additional user-specified exclusion patterns
/// * `verbose` - Whether to print walk errors to stderr
///
/// # Returns
/// Tuple of (sorted `PathBuf`s of all Python files found, directory count)
#[must_use]
pub fn collect_python_files_gitignore(
    root: &std::path::Path,
    exclude: &[String],
    verbose: bool,
) -> (Vec<std::path::PathBuf>, usize) {
    use ignore::WalkBuilder;

    let excludes_for_filter: Vec<String> = exclude
        .iter()
        .cloned()
        .chain(DEFAULT_EXCLUDE_FOLDERS().iter().map(|&s| s.to_owned()))
        .collect();
    let root_for_filter = root.to_path_buf();

    // Skip excluded directories at traversal time instead of filtering afterwards
    let walker = WalkBuilder::new(root)
        .hidden(false) // Don't skip hidden files (we handle that with defaults)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            // Always allow the root directory
            if entry.path() == root_for_filter {
                return true;
            }

            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }

            if let Some(name) = entry.file_name().to_str() {
                if is_excluded(name, &excludes_for_filter) {
                    return false;
                }
            }

            true
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();

                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }

                if path.extension().is_some_and(|ext| ext == "py") {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => {
                if verbose {
                    eprintln!("Walk error: {e}");
                }
            }
        }
    }

    // Walk order depends on the filesystem; keep reports stable
    files.sort();
    (files, dir_count)
}
