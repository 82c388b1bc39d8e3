//! Deprecation annotations attached to declarations.

use serde::Serialize;

use crate::version::Version;

/// A `@deprecate(...)` decorator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredMarker {
    /// Version after which the declaration is removed. `None` never expires.
    pub expiry: Option<Version>,
    /// Replacement to point users at (`relocate=`).
    pub relocate: Option<String>,
    /// Runtime current version pinned on the marker (`current=`).
    pub current: Option<String>,
    /// Runtime version module named on the marker (`version_module=`).
    pub version_module: Option<String>,
    /// 1-indexed line of the decorator.
    pub line: usize,
}

/// A `# auto-deprecate: expiry=<version>` comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentMarker {
    /// Version after which the declaration is removed.
    pub expiry: Version,
    /// 1-indexed line of the comment.
    pub line: usize,
}

/// Which syntax an annotation was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceForm {
    /// Decorator marker.
    Structured,
    /// Comment marker.
    CommentBased,
}

/// The deprecation annotation of one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Annotation {
    /// Found as a decorator.
    Structured(StructuredMarker),
    /// Found as a comment in the body.
    CommentBased(CommentMarker),
}

impl Annotation {
    /// Expiry version, if any.
    #[must_use]
    pub fn expiry(&self) -> Option<&Version> {
        match self {
            Self::Structured(marker) => marker.expiry.as_ref(),
            Self::CommentBased(marker) => Some(&marker.expiry),
        }
    }

    /// Replacement hint, if any.
    #[must_use]
    pub fn relocation_hint(&self) -> Option<&str> {
        match self {
            Self::Structured(marker) => marker.relocate.as_deref(),
            Self::CommentBased(_) => None,
        }
    }

    /// Syntax the annotation was written in.
    #[must_use]
    pub fn source_form(&self) -> SourceForm {
        match self {
            Self::Structured(_) => SourceForm::Structured,
            Self::CommentBased(_) => SourceForm::CommentBased,
        }
    }

    /// Line of the marker itself.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Structured(marker) => marker.line,
            Self::CommentBased(marker) => marker.line,
        }
    }

    /// True for decorator markers, which need the helper import.
    #[must_use]
    pub fn needs_import(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}
