//! Version ordering, lifecycle stages and current-version resolution.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use ruff_python_ast::{Expr, Stmt};
use serde::Serialize;

use crate::error::{DeprecateError, Result};

/// A version string with a total order.
///
/// Dot-separated segments are compared pairwise: numerically when both are
/// integers, lexically otherwise. A version that runs out of segments first
/// sorts lower, so `2.1 < 2.1.0`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
}

impl Version {
    /// Wraps a version string. Surrounding whitespace is dropped.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self {
            raw: raw.as_ref().trim().to_owned(),
        }
    }

    /// The version as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.segments();
        let mut right = other.segments();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match compare_segment(a, b) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Lifecycle stage of an annotated declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Not due yet, or never expires.
    Active,
    /// Due in exactly this version: kept, but about to go.
    Expiring,
    /// Past due: deleted.
    Expired,
}

/// Evaluates the stage of a declaration expiring at `expiry`.
#[must_use]
pub fn evaluate(expiry: Option<&Version>, current: &Version) -> Stage {
    let Some(expiry) = expiry else {
        return Stage::Active;
    };
    match current.cmp(expiry) {
        Ordering::Less => Stage::Active,
        Ordering::Equal => Stage::Expiring,
        Ordering::Greater => Stage::Expired,
    }
}

/// A Python module whose `__version__` supplies the current version.
#[derive(Debug, Clone)]
pub struct VersionSource {
    /// Dotted module name, e.g. `mypkg` or `mypkg.version`.
    pub module: String,
    /// Directory the module path is resolved against.
    pub root: PathBuf,
}

impl VersionSource {
    /// Creates a version source resolved against `root`.
    pub fn new(module: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            root: root.into(),
        }
    }

    fn unresolvable(&self, reason: &str) -> DeprecateError {
        DeprecateError::VersionSourceUnresolvable {
            module: self.module.clone(),
            reason: reason.to_owned(),
        }
    }

    /// Candidate files for the module: `a/b.py`, then `a/b/__init__.py`.
    fn candidates(&self) -> [PathBuf; 2] {
        let relative: PathBuf = self.module.split('.').collect();
        let as_file = self.root.join(&relative).with_extension("py");
        let as_package = self.root.join(&relative).join("__init__.py");
        [as_file, as_package]
    }

    /// Reads `__version__` from the module source.
    pub fn read(&self) -> Result<Version> {
        let valid_name = !self.module.is_empty()
            && self
                .module
                .split('.')
                .all(|part| !part.is_empty() && !part.contains(['/', '\\']));
        if !valid_name {
            return Err(self.unresolvable("Cannot locate version module"));
        }

        let path = self
            .candidates()
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| self.unresolvable("Cannot locate version module"))?;

        let source = std::fs::read_to_string(&path).map_err(|e| DeprecateError::io(&path, e))?;
        find_dunder_version(&source)
            .map(Version::new)
            .ok_or_else(|| self.unresolvable("Cannot find version (__version__) from the version module"))
    }
}

/// Finds a top-level `__version__ = "..."` assignment.
fn find_dunder_version(source: &str) -> Option<String> {
    let parsed = ruff_python_parser::parse_module(source).ok()?;
    let module = parsed.into_syntax();

    module.body.iter().rev().find_map(|stmt| {
        let (target, value) = match stmt {
            Stmt::Assign(assign) if assign.targets.len() == 1 => (&assign.targets[0], &*assign.value),
            Stmt::AnnAssign(assign) => (&*assign.target, assign.value.as_deref()?),
            _ => return None,
        };
        match (target, value) {
            (Expr::Name(name), Expr::StringLiteral(lit)) if name.id.as_str() == "__version__" => {
                Some(lit.value.to_str().to_owned())
            }
            _ => None,
        }
    })
}

/// Where the current version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrigin {
    /// The `DEPRECATE_VERSION` override.
    Override,
    /// A version passed by the caller.
    Literal,
    /// `__version__` of the configured module.
    VersionSource,
}

/// The resolved current version of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentVersion {
    /// The version itself.
    pub version: Version,
    /// Which source supplied it.
    pub origin: VersionOrigin,
}

/// Inputs for current-version resolution.
///
/// Precedence is override, then literal, then version source. The override
/// is passed in explicitly rather than read from the environment here.
#[derive(Debug, Clone, Default)]
pub struct VersionSettings {
    /// Global override (the `DEPRECATE_VERSION` environment variable).
    pub override_version: Option<String>,
    /// Caller-supplied version.
    pub literal: Option<String>,
    /// Module to introspect for `__version__`.
    pub version_source: Option<VersionSource>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl VersionSettings {
    /// Resolves the current version.
    ///
    /// # Errors
    ///
    /// `Configuration` when no source yields a value,
    /// `VersionSourceUnresolvable` when the version module is unusable.
    pub fn resolve(&self) -> Result<CurrentVersion> {
        if let Some(v) = non_empty(self.override_version.as_ref()) {
            return Ok(CurrentVersion {
                version: Version::new(v),
                origin: VersionOrigin::Override,
            });
        }
        if let Some(v) = non_empty(self.literal.as_ref()) {
            return Ok(CurrentVersion {
                version: Version::new(v),
                origin: VersionOrigin::Literal,
            });
        }
        match &self.version_source {
            Some(source) => Ok(CurrentVersion {
                version: source.read()?,
                origin: VersionOrigin::VersionSource,
            }),
            None => Err(DeprecateError::Configuration),
        }
    }
}

/// Convenience for callers that only have a root and module name.
pub fn read_module_version(root: &Path, module: &str) -> Result<Version> {
    VersionSource::new(module, root).read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn v(s: &str) -> Version {
        Version::new(s)
    }

    #[test]
    fn test_numeric_segments_compare_numerically() {
        assert!(v("2.10.0") > v("2.9.0"));
        assert!(v("10.0") > v("9.9.9"));
        assert_eq!(v("2.1.0"), v("2.1.00"));
    }

    #[test]
    fn test_shorter_version_sorts_first() {
        assert!(v("2.1") < v("2.1.0"));
        assert!(v("2.1.0") > v("2.1"));
    }

    #[test]
    fn test_non_numeric_segments_compare_lexically() {
        assert!(v("2.1.0rc1") < v("2.1.0rc2"));
        assert!(v("1.0.b") > v("1.0.a"));
    }

    #[test]
    fn test_evaluate_stages() {
        let expiry = v("2.1.0");
        assert_eq!(evaluate(Some(&expiry), &v("2.0.9")), Stage::Active);
        assert_eq!(evaluate(Some(&expiry), &v("2.1.0")), Stage::Expiring);
        assert_eq!(evaluate(Some(&expiry), &v("2.1.1")), Stage::Expired);
        assert_eq!(evaluate(None, &v("99.0")), Stage::Active);
    }

    #[test]
    fn test_override_beats_literal() {
        let settings = VersionSettings {
            override_version: Some("3.0.0".to_owned()),
            literal: Some("2.0.0".to_owned()),
            version_source: None,
        };
        let current = settings.resolve().unwrap();
        assert_eq!(current.version, v("3.0.0"));
        assert_eq!(current.origin, VersionOrigin::Override);
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let settings = VersionSettings {
            override_version: Some(String::new()),
            literal: Some("2.0.0".to_owned()),
            version_source: None,
        };
        assert_eq!(settings.resolve().unwrap().origin, VersionOrigin::Literal);
    }

    #[test]
    fn test_nothing_configured_is_configuration_error() {
        let err = VersionSettings::default().resolve().unwrap_err();
        assert!(matches!(err, DeprecateError::Configuration));
    }

    #[test]
    fn test_version_source_module_file() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(
            dir.path().join("pkg").join("__init__.py"),
            "__author__ = 'x'\n__version__ = \"2.3.0\"\n",
        )
        .unwrap();

        let settings = VersionSettings {
            version_source: Some(VersionSource::new("pkg", dir.path())),
            ..VersionSettings::default()
        };
        let current = settings.resolve().unwrap();
        assert_eq!(current.version.as_str(), "2.3.0");
        assert_eq!(current.origin, VersionOrigin::VersionSource);
    }

    #[test]
    fn test_version_source_missing_module() {
        let dir = tempdir().unwrap();
        let err = read_module_version(dir.path(), "pkg.not_existing_module").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot locate version module \"pkg.not_existing_module\""
        );
    }

    #[test]
    fn test_version_source_without_dunder_version() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("conftest.py"), "VERSION = '1.0'\n").unwrap();
        let err = read_module_version(dir.path(), "conftest").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Cannot find version (__version__) from the version module"));
    }
}
