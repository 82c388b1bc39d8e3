//! Tree-sitter based CST parser for Python source code.
//!
//! Provides exact positions for trivia (comments) that the Ruff AST drops.

use tree_sitter::{Node, Parser, Tree};

/// A point in source code (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Zero-indexed row number
    pub row: usize,
    /// Zero-indexed column (byte offset within line)
    pub column: usize,
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self {
            row: p.row,
            column: p.column,
        }
    }
}

/// A parsed CST tree
pub struct CstTree {
    tree: Tree,
    /// Original source code
    pub source: String,
}

impl CstTree {
    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Visits every node in document order.
    pub fn for_each_node<'t>(&'t self, mut f: impl FnMut(Node<'t>)) {
        fn visit<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
            f(node);
            for child in (0..node.child_count()).filter_map(|i| node.child(i)) {
                visit(child, f);
            }
        }
        visit(self.root(), &mut f);
    }
}

/// Error during CST parsing
#[derive(Debug)]
pub enum CstError {
    /// Failed to create parser
    ParserCreation(String),
    /// Failed to parse source
    ParseFailed,
}

impl std::fmt::Display for CstError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParserCreation(msg) => write!(f, "Failed to create CST parser: {msg}"),
            Self::ParseFailed => write!(f, "Failed to parse source as Python"),
        }
    }
}

impl std::error::Error for CstError {}

/// Tree-sitter based CST parser
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a new CST parser for Python
    ///
    /// # Errors
    /// Returns error if parser creation fails
    pub fn new() -> Result<Self, CstError> {
        let mut parser = Parser::new();

        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| CstError::ParserCreation(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse source code into a CST
    ///
    /// # Errors
    /// Returns error if parsing fails
    pub fn parse(&mut self, source: &str) -> Result<CstTree, CstError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(CstError::ParseFailed)?;

        Ok(CstTree {
            tree,
            source: source.to_owned(),
        })
    }
}
