//! Rewriting of a single file.
//!
//! [`rewrite_source`] is pure: it takes the text of a module and returns the
//! text with every expired declaration removed. [`process_file`] adds the
//! I/O around it and writes the result back only when it differs.
//!
//! The deletion set is built in this order:
//!
//! 1. expired declarations (an expired parent supersedes its children);
//! 2. scopes left without any statement by step 1, bottom-up;
//! 3. helper imports, once no decorator marker survives.
//!
//! All spans are then removed in one pass.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::annotation::{Annotation, SourceForm};
use crate::constants::{DEFAULT_HELPER_MODULE, DEFAULT_MARKER};
use crate::cst::comments_of;
use crate::error::{DeprecateError, Result};
use crate::locator::Locator;
use crate::remover::{LineSpan, SpanRemover};
use crate::tree::{DeclarationTree, NodeId, NodeKind};
use crate::version::{evaluate, Stage, Version};

/// Per-run settings shared by every file.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Resolved current version.
    pub current: Version,
    /// Name of the marker decorator.
    pub marker: String,
    /// Module the marker decorator is imported from.
    pub helper_module: String,
}

impl RewriteContext {
    /// Context with the default marker and helper module.
    #[must_use]
    pub fn new(current: Version) -> Self {
        Self {
            current,
            marker: DEFAULT_MARKER.to_owned(),
            helper_module: DEFAULT_HELPER_MODULE.to_owned(),
        }
    }
}

/// An annotated declaration, as reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationReport {
    /// Dotted name, e.g. `Client.fetch`.
    pub name: String,
    /// Function or class.
    pub kind: NodeKind,
    /// Line of the `def`/`class` keyword.
    pub line: usize,
    /// Lines the declaration owns.
    pub span: LineSpan,
    /// Expiry version.
    pub expiry: Option<Version>,
    /// Replacement hint from `relocate=`.
    pub relocate: Option<String>,
    /// Marker syntax.
    pub form: SourceForm,
}

impl DeclarationReport {
    fn new(tree: &DeclarationTree<'_>, id: NodeId, annotation: &Annotation) -> Self {
        let node = tree.node(id);
        Self {
            name: tree.qualified_name(id),
            kind: node.kind,
            line: node.keyword_line,
            span: node.span,
            expiry: annotation.expiry().cloned(),
            relocate: annotation.relocation_hint().map(str::to_owned),
            form: annotation.source_form(),
        }
    }

    /// Warning for a declaration that goes away in the next version.
    #[must_use]
    pub fn expiring_message(&self) -> String {
        let what = match self.kind {
            NodeKind::Class => "Class",
            _ => "Function",
        };
        let mut message = format!("{what} \"{}\" will be deprecated", self.name);
        if let Some(expiry) = &self.expiry {
            message.push_str(&format!(" on version {expiry}"));
        }
        if let Some(relocate) = &self.relocate {
            message.push_str(&format!(". Please use function / method \"{relocate}\""));
        }
        message
    }
}

/// Result of rewriting one module.
#[derive(Debug, Clone, Serialize)]
pub struct Rewrite {
    /// New text of the module.
    #[serde(skip)]
    pub text: String,
    /// True when `text` differs from the input.
    pub changed: bool,
    /// Expired declarations that were removed.
    pub removed: Vec<DeclarationReport>,
    /// Scopes removed because nothing was left in them.
    pub collapsed: Vec<String>,
    /// Declarations that expire at the current version and were kept.
    pub expiring: Vec<DeclarationReport>,
    /// True when the helper import was removed.
    pub import_retracted: bool,
}

/// True if `id` or one of its ancestors is in `deleted`.
fn is_removed(tree: &DeclarationTree<'_>, id: NodeId, deleted: &FxHashSet<NodeId>) -> bool {
    let mut current = Some(id);
    while let Some(cid) = current {
        if deleted.contains(&cid) {
            return true;
        }
        current = tree.node(cid).parent;
    }
    false
}

/// Whether the helper import is no longer needed.
///
/// True when no surviving node carries a decorator marker. Comment markers
/// need no import and are not considered.
#[must_use]
pub fn should_retract_import(tree: &DeclarationTree<'_>, deleted: &FxHashSet<NodeId>) -> bool {
    !tree.preorder().into_iter().any(|id| {
        tree.node(id)
            .annotation
            .as_ref()
            .is_some_and(Annotation::needs_import)
            && !is_removed(tree, id, deleted)
    })
}

/// Marks scopes emptied by earlier deletions, children first.
///
/// Returns the collapsed scopes in the order they were found.
fn collapse_scopes(tree: &DeclarationTree<'_>, deleted: &mut FxHashSet<NodeId>) -> Vec<NodeId> {
    let mut collapsed = Vec::new();
    for id in tree.postorder() {
        if !tree.node(id).kind.is_scope() || is_removed(tree, id, deleted) {
            continue;
        }
        let children = tree.children(id);
        let lost = children.iter().filter(|c| deleted.contains(c)).count();
        if lost > 0 && lost == children.len() {
            deleted.insert(id);
            collapsed.push(id);
        }
    }
    collapsed
}

/// Rewrites one module.
///
/// # Errors
///
/// `Parse` for invalid Python, `AnnotationConflict` or `MalformedAnnotation`
/// for unusable markers, `Rewrite` if the deletion set is inconsistent.
pub fn rewrite_source(source: &str, ctx: &RewriteContext) -> Result<Rewrite> {
    let parsed = ruff_python_parser::parse_module(source).map_err(|e| DeprecateError::Parse {
        message: format!("{e}"),
    })?;
    let module = parsed.into_syntax();
    let mut tree = DeclarationTree::build(&module, source, &ctx.helper_module);

    let comments = comments_of(source)?;
    Locator::new(source, &comments, &ctx.marker).annotate(&mut tree)?;

    let mut deleted: FxHashSet<NodeId> = FxHashSet::default();
    let mut removed = Vec::new();
    let mut expiring = Vec::new();

    for id in tree.preorder() {
        let Some(annotation) = tree.node(id).annotation.as_ref() else {
            continue;
        };
        if is_removed(&tree, id, &deleted) {
            continue;
        }
        match evaluate(annotation.expiry(), &ctx.current) {
            Stage::Expired => {
                removed.push(DeclarationReport::new(&tree, id, annotation));
                deleted.insert(id);
            }
            Stage::Expiring => expiring.push(DeclarationReport::new(&tree, id, annotation)),
            Stage::Active => {}
        }
    }

    if removed.is_empty() {
        return Ok(Rewrite {
            text: source.to_owned(),
            changed: false,
            removed,
            collapsed: Vec::new(),
            expiring,
            import_retracted: false,
        });
    }

    let mut collapsed_ids = collapse_scopes(&tree, &mut deleted);

    let mut import_retracted = false;
    if should_retract_import(&tree, &deleted) {
        let imports: Vec<NodeId> = tree
            .preorder()
            .into_iter()
            .filter(|&id| tree.node(id).kind == NodeKind::Import && !is_removed(&tree, id, &deleted))
            .collect();
        import_retracted = !imports.is_empty();
        deleted.extend(imports);
        // A retracted import can be the last statement of its scope
        collapsed_ids.extend(collapse_scopes(&tree, &mut deleted));
    }

    let collapsed: Vec<String> = collapsed_ids
        .into_iter()
        .map(|id| match tree.node(id).kind {
            NodeKind::Module => "<module>".to_owned(),
            _ => tree.qualified_name(id),
        })
        .collect();

    let mut remover = SpanRemover::new(source);
    remover.add_spans(deleted.iter().map(|&id| tree.node(id).span));
    let text = remover.apply()?;

    Ok(Rewrite {
        changed: text != source,
        text,
        removed,
        collapsed,
        expiring,
        import_retracted,
    })
}

/// Outcome of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// File that was processed.
    pub path: PathBuf,
    /// True when the file was written back.
    pub written: bool,
    /// What the rewrite found.
    #[serde(flatten)]
    pub rewrite: Rewrite,
}

/// Rewrites the file at `path` in place.
///
/// With `dry_run`, or when nothing changes, the file is not touched.
///
/// # Errors
///
/// `Io` when the file cannot be read or replaced, plus every error of
/// [`rewrite_source`].
pub fn process_file(path: &Path, ctx: &RewriteContext, dry_run: bool) -> Result<FileOutcome> {
    let source = fs::read_to_string(path).map_err(|e| DeprecateError::io(path, e))?;
    let rewrite = rewrite_source(&source, ctx)?;

    let written = rewrite.changed && !dry_run;
    if written {
        write_atomic(path, &rewrite.text)?;
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        written,
        rewrite,
    })
}

/// Writes through a temporary file in the same directory, then renames it
/// over `path`. The temporary file is removed if anything fails.
///
/// A symlinked `path` is resolved first so the link keeps pointing at the
/// rewritten file.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| DeprecateError::io(path, e))?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| DeprecateError::io(path, e))?;
    temp.write_all(text.as_bytes())
        .map_err(|e| DeprecateError::io(path, e))?;

    let metadata = fs::metadata(&target).map_err(|e| DeprecateError::io(path, e))?;
    fs::set_permissions(temp.path(), metadata.permissions())
        .map_err(|e| DeprecateError::io(path, e))?;

    temp.persist(&target)
        .map_err(|e| DeprecateError::io(path, e.error))?;
    Ok(())
}
