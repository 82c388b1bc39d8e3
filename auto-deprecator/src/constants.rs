use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Project-local configuration file.
pub const CONFIG_FILENAME: &str = ".auto-deprecator.toml";

/// Python project file carrying a `[tool.auto-deprecator]` table.
pub const PYPROJECT_FILENAME: &str = "pyproject.toml";

/// Environment variable overriding the current version for a whole run.
pub const DEPRECATE_VERSION_ENV: &str = "DEPRECATE_VERSION";

/// Decorator name of the structured marker.
pub const DEFAULT_MARKER: &str = "deprecate";

/// Module providing the structured marker.
pub const DEFAULT_HELPER_MODULE: &str = "auto_deprecator";

/// Regex recognizing a comment marker, `# auto-deprecate: ...`.
///
/// Group 1 holds everything after the colon.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_comment_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^#\s*auto-deprecate:\s*(.*?)\s*$").expect("Invalid comment marker regex pattern")
    })
}

/// Regex for the payload of a comment marker, `expiry=<version>`.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_comment_expiry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^expiry=(\S+)$").expect("Invalid comment expiry regex pattern"))
}

/// Set of folders to exclude by default.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert("__pycache__");
        s.insert(".git");
        s.insert(".hg");
        s.insert(".pytest_cache");
        s.insert(".mypy_cache");
        s.insert(".ruff_cache");
        s.insert(".tox");
        s.insert(".nox");
        s.insert("build");
        s.insert("dist");
        s.insert("*.egg-info");
        s.insert("node_modules");
        s.insert("venv");
        s.insert(".venv");
        s
    })
}

pub use get_comment_expiry_re as COMMENT_EXPIRY_RE;
pub use get_comment_marker_re as COMMENT_MARKER_RE;
pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
