//! Error types for the rewriting pipeline.
//!
//! Run-scoped failures (`Configuration`, `VersionSourceUnresolvable`) abort a
//! run before any file is written. Everything else is scoped to one file: the
//! file is left untouched and the run moves on.

use std::path::PathBuf;

use crate::remover::RemoveError;

/// Errors produced while resolving versions or rewriting a file.
#[derive(Debug, thiserror::Error)]
pub enum DeprecateError {
    /// No current version could be resolved from any source.
    #[error(
        "No current version found: set DEPRECATE_VERSION, pass --deprecate-version, \
         or configure a version source"
    )]
    Configuration,

    /// The named version-source module could not be used.
    #[error("{reason} \"{module}\"")]
    VersionSourceUnresolvable {
        /// Dotted module name as configured.
        module: String,
        /// Human-readable failure description.
        reason: String,
    },

    /// More than one structured marker decorates the same declaration.
    #[error("More than one deprecate decorator is found in \"{name}\" (line {line})")]
    AnnotationConflict {
        /// Declaration name.
        name: String,
        /// 1-indexed line of the declaration.
        line: usize,
    },

    /// A marker was recognized but its arguments are unusable.
    #[error("Malformed deprecation marker on \"{name}\" (line {line}): {reason}")]
    MalformedAnnotation {
        /// Declaration name.
        name: String,
        /// 1-indexed line of the marker.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The file is not valid Python.
    #[error("Parse error: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// Comment extraction failed.
    #[error("CST error: {0}")]
    Cst(#[from] crate::cst::CstError),

    /// The computed deletion set could not be applied.
    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RemoveError),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl DeprecateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T, E = DeprecateError> = std::result::Result<T, E>;
