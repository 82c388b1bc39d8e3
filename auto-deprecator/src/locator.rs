//! Annotation discovery.
//!
//! A declaration can be annotated in two ways:
//!
//! - a decorator naming the marker function, `@deprecate("2.0.0")` or
//!   `@deprecate(expiry="2.0.0", relocate="new_func")`;
//! - a `# auto-deprecate: expiry=2.0.0` comment inside its body, before any
//!   nested function or class.
//!
//! The decorator wins when both are present; the comment is then not even
//! inspected.

use ruff_python_ast::{Decorator, Expr, ExprCall};
use ruff_text_size::Ranged;

use crate::annotation::{Annotation, CommentMarker, StructuredMarker};
use crate::constants::{COMMENT_EXPIRY_RE, COMMENT_MARKER_RE};
use crate::cst::Comment;
use crate::error::{DeprecateError, Result};
use crate::tree::{DeclarationTree, Node, NodeId};
use crate::utils::LineIndex;
use crate::version::Version;

/// Finds annotations for the declarations of one file.
pub struct Locator<'s> {
    index: LineIndex,
    comments: &'s [Comment],
    marker: &'s str,
}

impl<'s> Locator<'s> {
    /// Creates a locator over `source` and its comments.
    #[must_use]
    pub fn new(source: &str, comments: &'s [Comment], marker: &'s str) -> Self {
        Self {
            index: LineIndex::new(source),
            comments,
            marker,
        }
    }

    /// Stores the annotation of every declaration on its node.
    ///
    /// # Errors
    ///
    /// Fails on the first conflicting or malformed marker, in source order.
    pub fn annotate(&self, tree: &mut DeclarationTree<'_>) -> Result<()> {
        for id in tree.preorder() {
            let annotation = self.locate(tree, id)?;
            tree.node_mut(id).annotation = annotation;
        }
        Ok(())
    }

    /// Returns the annotation of one node, if it has one.
    ///
    /// # Errors
    ///
    /// `AnnotationConflict` for several decorator markers,
    /// `MalformedAnnotation` for unusable marker arguments.
    pub fn locate(&self, tree: &DeclarationTree<'_>, id: NodeId) -> Result<Option<Annotation>> {
        let node = tree.node(id);
        if !node.kind.is_declaration() {
            return Ok(None);
        }

        if let Some(marker) = self.structured_marker(node)? {
            return Ok(Some(Annotation::Structured(marker)));
        }

        Ok(self
            .comment_marker(tree, id)?
            .map(Annotation::CommentBased))
    }

    fn structured_marker(&self, node: &Node<'_>) -> Result<Option<StructuredMarker>> {
        let markers: Vec<&Decorator> = node
            .decorators
            .iter()
            .filter(|d| names_marker(callee(&d.expression), self.marker))
            .collect();

        let decorator = match markers.as_slice() {
            [] => return Ok(None),
            [single] => *single,
            _ => {
                return Err(DeprecateError::AnnotationConflict {
                    name: node.name.clone(),
                    line: node.keyword_line,
                })
            }
        };

        let line = self.index.line_index(decorator.start());
        let mut marker = StructuredMarker {
            expiry: None,
            relocate: None,
            current: None,
            version_module: None,
            line,
        };

        // A bare `@deprecate` carries no arguments and never expires
        let Expr::Call(call) = &decorator.expression else {
            return Ok(Some(marker));
        };

        let malformed = |reason: &str| DeprecateError::MalformedAnnotation {
            name: node.name.clone(),
            line,
            reason: reason.to_owned(),
        };

        if let Some(first) = call.arguments.args.first() {
            let expiry = string_literal(first)
                .ok_or_else(|| malformed("expiry must be a string literal"))?;
            marker.expiry = Some(Version::new(expiry));
        }

        for keyword in &call.arguments.keywords {
            let Some(arg) = keyword.arg.as_ref() else {
                continue;
            };
            match arg.as_str() {
                // `version=` is the keyword used by the first releases of the decorator
                "expiry" | "version" => {
                    if marker.expiry.is_some() {
                        return Err(malformed("expiry given more than once"));
                    }
                    let expiry = string_literal(&keyword.value)
                        .ok_or_else(|| malformed("expiry must be a string literal"))?;
                    marker.expiry = Some(Version::new(expiry));
                }
                "relocate" => marker.relocate = string_literal(&keyword.value).map(str::to_owned),
                "current" => marker.current = string_literal(&keyword.value).map(str::to_owned),
                "version_module" => {
                    marker.version_module = string_literal(&keyword.value).map(str::to_owned);
                }
                _ => {}
            }
        }

        Ok(Some(marker))
    }

    fn comment_marker(&self, tree: &DeclarationTree<'_>, id: NodeId) -> Result<Option<CommentMarker>> {
        let node = tree.node(id);
        let limit = tree
            .first_nested_declaration(id)
            .map_or(node.span.end, |child| tree.node(child).span.start);

        let in_body = |c: &&Comment| {
            c.line > node.header_end && c.line < limit && c.column > node.column
        };

        for comment in self.comments.iter().filter(in_body) {
            let Some(caps) = COMMENT_MARKER_RE().captures(&comment.text) else {
                continue;
            };
            let payload = caps.get(1).map_or("", |m| m.as_str());
            return match COMMENT_EXPIRY_RE().captures(payload) {
                Some(expiry) => Ok(Some(CommentMarker {
                    expiry: Version::new(&expiry[1]),
                    line: comment.line,
                })),
                None => Err(DeprecateError::MalformedAnnotation {
                    name: node.name.clone(),
                    line: comment.line,
                    reason: format!("expected `expiry=<version>`, found `{payload}`"),
                }),
            };
        }
        Ok(None)
    }
}

/// The called expression of a decorator, or the decorator itself if bare.
fn callee(expr: &Expr) -> &Expr {
    match expr {
        Expr::Call(ExprCall { func, .. }) => func.as_ref(),
        other => other,
    }
}

/// `deprecate` or `<module>.deprecate`.
fn names_marker(expr: &Expr, marker: &str) -> bool {
    match expr {
        Expr::Name(name) => name.id.as_str() == marker,
        Expr::Attribute(attr) => attr.attr.as_str() == marker,
        _ => false,
    }
}

fn string_literal(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::StringLiteral(lit) => Some(lit.value.to_str()),
        _ => None,
    }
}
