//! CST (Concrete Syntax Tree) module for comment discovery.
//!
//! The Ruff AST drops comments, so comment markers are read from a
//! Tree-sitter parse of the same text.
//!
//! # Design Principles
//!
//! - **AST decides, CST reads trivia**: declarations, decorators and spans
//!   come from Ruff; the CST only contributes comments
//! - **Line anchored**: comments are matched to declarations by line and
//!   column, never by structural matching

mod comments;
mod parser;

pub use comments::{extract_comments, Comment};
pub use parser::{CstError, CstParser, CstTree, Point};

/// Parses `source` and returns its comments in source order.
///
/// # Errors
///
/// Returns an error if the Tree-sitter parser cannot be created or fails.
pub fn comments_of(source: &str) -> Result<Vec<Comment>, CstError> {
    let mut parser = CstParser::new()?;
    let tree = parser.parse(source)?;
    Ok(extract_comments(&tree))
}
