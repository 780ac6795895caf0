//! The source graph loader (C1) and annotation reader (C2).
//!
//! `SourceProject` is deliberately *not* a full TypeScript type checker:
//! per §4.1, the "queryable AST with symbol resolution" it provides is
//! declaration-level structural lookup — enough to resolve imports to their
//! original identifier, find a named declaration's syntax node, and read
//! decorator arguments — without control-flow or data-flow analysis. That
//! scope is what every literal scenario in §8 actually exercises.

pub mod annotations;
pub mod loader;

use std::collections::HashMap;

pub use annotations::{read_annotations, read_child_annotations, Annotation};
pub use loader::{load, LoadOptions};

/// A parsed source file: its concrete syntax tree plus the raw text it was
/// parsed from (tree-sitter nodes borrow byte ranges, not owned strings).
pub struct SourceFile {
    /// Path relative to the project root.
    pub path: String,
    /// Original source text.
    pub text: String,
    /// Parsed concrete syntax tree.
    pub tree: tree_sitter::Tree,
    /// Every name this file can reference — its own top-level declarations
    /// plus its named imports resolved to a project file — mapped to the
    /// `{file}#{Name}` `ClassId` (see `oastatic_core::decl::ClassId`) it names. A name
    /// absent from this map is either unresolvable (a third-party/ambient
    /// type) or, for fixtures built outside [`loader::load`], simply never
    /// populated.
    pub imports: HashMap<String, String>,
}

impl SourceFile {
    /// The text of `node` within this file.
    #[must_use]
    pub fn node_text<'a>(&'a self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.text[node.byte_range()]
    }

    /// Reads every decorator attached to `node` in this file. Thin
    /// convenience wrapper over [`read_annotations`].
    #[must_use]
    pub fn annotations_of<'a>(&'a self, node: tree_sitter::Node<'a>) -> Vec<Annotation<'a>> {
        read_annotations(node, self)
    }
}

/// The kind of a top-level declaration tracked in the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `class X { ... }`
    Class,
    /// `interface X { ... }`
    Interface,
    /// `enum X { ... }`
    Enum,
    /// `type X = ...`
    TypeAlias,
}

/// A resolved top-level declaration: which file it lives in, and the byte
/// range of its syntax node within that file.
#[derive(Debug, Clone, Copy)]
pub struct DeclRef {
    /// Index into [`SourceProject::files`].
    pub file_index: usize,
    /// Start byte of the declaration node (class/interface/enum/type-alias),
    /// decorators included.
    pub start_byte: usize,
    /// End byte of the declaration node.
    pub end_byte: usize,
    /// Declaration kind.
    pub kind: DeclKind,
}

/// A parsed, declaration-resolved source graph (§3 `SourceProject`).
///
/// Owned by C1 for the duration of a generation run; every other component
/// only reads from it.
pub struct SourceProject {
    /// Every parsed file, in the order they were added.
    pub files: Vec<SourceFile>,
    /// Declarations keyed by their `{file}#{Name}` `ClassId` — collision-free,
    /// since two files can each declare their own same-named class. This is
    /// what every reference resolved through a file's [`SourceFile::imports`]
    /// map (so every reference [`loader::load`] itself produces) looks up.
    by_qualified_id: HashMap<String, DeclRef>,
    /// Declarations keyed by bare declared name, last-declaration-wins.
    /// Exists only as a convenience for callers with a name but no file
    /// context — direct unit-test fixtures, mainly — and is collision-prone
    /// exactly like a flat symbol table keyed by name alone would be; real
    /// pipeline code never needs it because every name it resolves already
    /// came from a file's `imports` map.
    by_bare_name: HashMap<String, DeclRef>,
}

impl SourceProject {
    pub(crate) fn new(
        files: Vec<SourceFile>,
        by_qualified_id: HashMap<String, DeclRef>,
        by_bare_name: HashMap<String, DeclRef>,
    ) -> Self {
        Self { files, by_qualified_id, by_bare_name }
    }

    /// Looks up a declaration by `ClassId` (a `{file}#{Name}` qualified
    /// id, as produced by [`loader::load`]) or, failing that, by bare name
    /// (for fixtures constructed without a qualified id).
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<(&SourceFile, DeclRef)> {
        let decl_ref = self
            .by_qualified_id
            .get(name)
            .or_else(|| self.by_bare_name.get(name))
            .copied()?;
        self.files.get(decl_ref.file_index).map(|f| (f, decl_ref))
    }

    /// The syntax node for a resolved declaration, re-parsed against its
    /// owning file's tree by byte range.
    #[must_use]
    pub fn declaration_node<'a>(&'a self, decl_ref: DeclRef) -> Option<tree_sitter::Node<'a>> {
        let file = self.files.get(decl_ref.file_index)?;
        find_node_at_range(file.tree.root_node(), decl_ref.start_byte, decl_ref.end_byte)
    }

    /// Every declaration `ClassId` known to the project.
    pub fn declaration_names(&self) -> impl Iterator<Item = &str> {
        self.by_qualified_id.keys().map(String::as_str)
    }
}

/// The declared name at the end of a `{file}#{Name}` `ClassId`, for
/// display purposes (tags, default `operationId` composition, ...) where
/// the file qualifier would just be noise. Returns `name` unchanged if it
/// isn't in qualified form.
#[must_use]
pub fn class_display_name(name: &str) -> &str {
    name.rsplit('#').next().unwrap_or(name)
}

/// `file.imports`, the same map [`loader::load`] already resolved — kept as
/// a function for callers that used to build this lazily from the AST.
#[must_use]
pub fn local_import_aliases(file: &SourceFile) -> HashMap<String, String> {
    file.imports.clone()
}

/// Resolves a local identifier to the `ClassId` it names in `aliases`
/// (`file.imports`), falling back to the identifier itself when it names
/// neither an import nor a local declaration — a third-party/ambient type
/// this pipeline doesn't track.
#[must_use]
pub fn resolve_alias<'a>(name: &'a str, aliases: &'a HashMap<String, String>) -> &'a str {
    aliases.get(name).map_or(name, String::as_str)
}

fn find_node_at_range(
    node: tree_sitter::Node<'_>,
    start: usize,
    end: usize,
) -> Option<tree_sitter::Node<'_>> {
    if node.start_byte() == start && node.end_byte() == end {
        return Some(node);
    }
    if !(node.start_byte() <= start && end <= node.end_byte()) {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_node_at_range(child, start, end) {
            return Some(found);
        }
    }
    None
}

/// Parses `source` as TypeScript and returns its concrete syntax tree.
///
/// # Panics
///
/// Panics if the `tree-sitter-typescript` grammar cannot be loaded into a
/// fresh [`tree_sitter::Parser`] — this indicates a version mismatch
/// between `tree-sitter` and `tree-sitter-typescript` and is a programming
/// error, not a data error.
#[must_use]
pub fn parse_typescript(source: &str) -> tree_sitter::Tree {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .expect("loading the TypeScript grammar must succeed");
    parser
        .parse(source, None)
        .expect("parsing a string source always produces a tree")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_class_declaration() {
        let tree = parse_typescript("export class Foo {}");
        assert_eq!(tree.root_node().kind(), "program");
        assert!(!tree.root_node().has_error());
    }
}
