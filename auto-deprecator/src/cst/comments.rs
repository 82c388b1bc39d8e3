//! Comment extraction from Python source using CST.
//!
//! Tree-sitter captures comments as explicit nodes, so a `#` inside a string
//! literal is never reported.

use super::parser::{CstTree, Point};

/// A comment extracted from source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment text (including `#` prefix)
    pub text: String,
    /// Line number (1-indexed for consistency with Ruff)
    pub line: usize,
    /// Zero-indexed column of the `#`
    pub column: usize,
}

/// Extract all comments from a CST tree, in source order
#[must_use]
pub fn extract_comments(tree: &CstTree) -> Vec<Comment> {
    let source = tree.source.as_str();
    let mut comments = Vec::new();

    tree.for_each_node(|node| {
        if node.kind() != "comment" {
            return;
        }
        let start: Point = node.start_position().into();
        comments.push(Comment {
            text: source[node.start_byte()..node.end_byte()].to_owned(),
            line: start.row + 1,
            column: start.column,
        });
    });

    comments
}
