//! Core library for the auto-deprecate source rewriter.
//!
//! Python declarations carry a deprecation marker, either a decorator
//! (`@deprecate(expiry="2.1.0")`) or a comment in their body
//! (`# auto-deprecate: expiry=2.1.0`). Once the project's current version is
//! past the expiry, the rewriter deletes the declaration from the source,
//! leaving every other line byte-for-byte intact.
//!
//! The pipeline for one file lives in [`rewrite`]; [`runner`] drives it over
//! many files and [`entry_point`] is the command line on top.

// Allow common complexity warnings - these are intentional design choices
#![allow(
    clippy::similar_names,
    clippy::format_push_string,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Deprecation annotations and their two source forms.
pub mod annotation;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Tree-sitter parse used to find comments.
pub mod cst;

/// Module defining the entry point logic.
/// Parses arguments, merges configuration and maps the run to an exit code.
pub mod entry_point;

/// Error types shared by the library.
pub mod error;

/// Finds the annotation of each declaration.
pub mod locator;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;

/// Line-span deletion on a source buffer.
pub mod remover;

/// Rewriting of a single file.
pub mod rewrite;

/// Runs the rewriter over many files.
pub mod runner;

/// Declaration tree over the Ruff AST.
pub mod tree;

/// Module containing utility functions.
/// This includes helper functions used across the application.
pub mod utils;

/// Versions, lifecycle stages and current-version resolution.
pub mod version;

pub use error::{DeprecateError, Result};
pub use rewrite::{process_file, rewrite_source, Rewrite, RewriteContext};
pub use runner::{run, RunOptions, RunReport};
pub use version::{Stage, Version, VersionSettings, VersionSource};
