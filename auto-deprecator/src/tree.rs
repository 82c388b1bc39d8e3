//! Declaration tree built from the Ruff AST.
//!
//! Every statement of a scope becomes a node, stored in an arena and
//! addressed by [`NodeId`]. A node owns the lines from its own first line
//! (decorators included) up to the first line of its next sibling, or up to
//! the end of its parent for the last sibling. Deleting that span removes the
//! node and the blank lines that follow it, leaving every other line alone.
//!
//! Functions and classes are scopes and are walked recursively. Imports of
//! the helper module are tagged so they can be retracted later.

use ruff_python_ast::{Decorator, ModModule, Stmt};
use ruff_text_size::Ranged;
use serde::Serialize;

use crate::annotation::Annotation;
use crate::remover::LineSpan;
use crate::utils::LineIndex;

/// Index of a node in a [`DeclarationTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Root pseudo-declaration covering the whole file.
    Module,
    /// `def` or `async def`.
    Function,
    /// `class`.
    Class,
    /// Import of the helper module.
    Import,
    /// Any other statement.
    Statement,
}

impl NodeKind {
    /// Functions and classes, the kinds that can carry an annotation.
    #[must_use]
    pub fn is_declaration(self) -> bool {
        matches!(self, Self::Function | Self::Class)
    }

    /// Lowercase label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Function => "function",
            Self::Class => "class",
            Self::Import => "import",
            Self::Statement => "statement",
        }
    }

    /// Kinds whose children are tracked.
    #[must_use]
    pub fn is_scope(self) -> bool {
        matches!(self, Self::Module | Self::Function | Self::Class)
    }
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    /// Node kind.
    pub kind: NodeKind,
    /// Declared name (empty for plain statements).
    pub name: String,
    /// Owned lines.
    pub span: LineSpan,
    /// Line of the `def`/`class` keyword (or of the statement).
    pub keyword_line: usize,
    /// Indentation column of the statement.
    pub column: usize,
    /// Last line of the signature; the body starts after it.
    pub header_end: usize,
    /// Decorators as parsed.
    pub decorators: &'a [Decorator],
    /// Enclosing scope, `None` for the module.
    pub parent: Option<NodeId>,
    /// Statements of the body, in source order.
    pub children: Vec<NodeId>,
    /// Deprecation annotation, filled in by the locator.
    pub annotation: Option<Annotation>,
}

/// Arena of nodes for one file.
#[derive(Debug, Clone)]
pub struct DeclarationTree<'a> {
    nodes: Vec<Node<'a>>,
}

/// First line of the statement's own syntax.
///
/// Ruff starts a decorated definition's range at its first decorator, but
/// other parsers report the `def` line; taking the minimum keeps the
/// decorator inside the span either way.
fn first_line(stmt: &Stmt, decorators: &[Decorator], index: &LineIndex) -> usize {
    let stmt_line = index.line_index(stmt.start());
    decorators
        .iter()
        .map(|d| index.line_index(d.start()))
        .chain(std::iter::once(stmt_line))
        .min()
        .unwrap_or(stmt_line)
}

/// Returns true if `stmt` imports `helper_module` (or a submodule of it).
///
/// An `import` statement qualifies only when every alias is the helper, so
/// retracting it never drops an unrelated module.
fn imports_helper(stmt: &Stmt, helper_module: &str) -> bool {
    let is_helper = |name: &str| {
        name == helper_module
            || name
                .strip_prefix(helper_module)
                .is_some_and(|rest| rest.starts_with('.'))
    };
    match stmt {
        Stmt::ImportFrom(node) => {
            node.level == 0 && node.module.as_ref().is_some_and(|m| is_helper(m.as_str()))
        }
        Stmt::Import(node) => node.names.iter().all(|alias| is_helper(alias.name.as_str())),
        _ => false,
    }
}

impl<'a> DeclarationTree<'a> {
    /// Builds the tree for a parsed module.
    #[must_use]
    pub fn build(module: &'a ModModule, source: &str, helper_module: &str) -> Self {
        let index = LineIndex::new(source);
        let line_count = source.split_inclusive('\n').count();
        let mut tree = Self { nodes: Vec::new() };

        let root = tree.push(Node {
            kind: NodeKind::Module,
            name: String::new(),
            span: LineSpan::new(1, line_count + 1),
            keyword_line: 1,
            column: 0,
            header_end: 0,
            decorators: &[],
            parent: None,
            children: Vec::new(),
            annotation: None,
        });
        tree.build_scope(root, &module.body, &index, helper_module);
        tree
    }

    fn push(&mut self, node: Node<'a>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn build_scope(
        &mut self,
        parent: NodeId,
        body: &'a [Stmt],
        index: &LineIndex,
        helper_module: &str,
    ) {
        let scope_end = self.nodes[parent.0].span.end;

        let starts: Vec<usize> = body
            .iter()
            .map(|stmt| first_line(stmt, decorators_of(stmt), index))
            .collect();

        for (i, stmt) in body.iter().enumerate() {
            let start = starts[i];
            let end = starts.get(i + 1).copied().unwrap_or(scope_end);
            let statement_line = index.line_index(stmt.start());
            let no_body: &'a [Stmt] = &[];

            let (kind, name, keyword_line, header_end, nested) = match stmt {
                Stmt::FunctionDef(f) => {
                    let signature_end = f.returns.as_ref().map_or(f.parameters.end(), |r| r.end());
                    (
                        NodeKind::Function,
                        f.name.to_string(),
                        index.line_index(f.name.start()),
                        index.line_index(signature_end),
                        f.body.as_slice(),
                    )
                }
                Stmt::ClassDef(c) => {
                    let signature_end = c.arguments.as_ref().map_or(c.name.end(), |a| a.end());
                    (
                        NodeKind::Class,
                        c.name.to_string(),
                        index.line_index(c.name.start()),
                        index.line_index(signature_end),
                        c.body.as_slice(),
                    )
                }
                _ if imports_helper(stmt, helper_module) => (
                    NodeKind::Import,
                    "import".to_owned(),
                    statement_line,
                    statement_line,
                    no_body,
                ),
                _ => (
                    NodeKind::Statement,
                    String::new(),
                    statement_line,
                    statement_line,
                    no_body,
                ),
            };

            // Decorators sit on the def line's column, so the statement start works for both
            let column = index.column_of_byte(stmt.start().to_usize());

            let id = self.push(Node {
                kind,
                name,
                span: LineSpan::new(start, end),
                keyword_line,
                column,
                header_end,
                decorators: decorators_of(stmt),
                parent: Some(parent),
                children: Vec::new(),
                annotation: None,
            });
            self.nodes[parent.0].children.push(id);

            if kind.is_scope() {
                self.build_scope(id, nested, index, helper_module);
            }
        }
    }

    /// The module node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        &mut self.nodes[id.0]
    }

    /// Children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// First function or class directly inside `id`.
    #[must_use]
    pub fn first_nested_declaration(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.node(c).kind.is_declaration())
    }

    /// All nodes, parents before children, siblings in source order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// All nodes, children before parents.
    #[must_use]
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = self.preorder();
        order.reverse();
        order
    }

    /// Dotted path of a declaration, e.g. `Outer.method`.
    #[must_use]
    pub fn qualified_name(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = self.node(cid);
            if node.kind != NodeKind::Module {
                parts.push(node.name.as_str());
            }
            current = node.parent;
        }
        parts.reverse();
        parts.join(".")
    }
}

fn decorators_of(stmt: &Stmt) -> &[Decorator] {
    match stmt {
        Stmt::FunctionDef(f) => &f.decorator_list,
        Stmt::ClassDef(c) => &c.decorator_list,
        _ => &[],
    }
}
