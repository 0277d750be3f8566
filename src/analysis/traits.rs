//! Core traits for language front-ends.

use std::path::Path;

use super::syntax::SourceFile;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from [`SourceFile`] so the concrete tree can be inspected
/// (error nodes, positions) before it is lowered.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Position of the first syntax error, if any.
    pub fn first_error(&self) -> Option<(usize, usize)> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }
        let mut cursor = root.walk();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let pos = node.start_position();
                return Some((pos.row + 1, pos.column + 1));
            }
            // Push in reverse so the earliest child is examined first.
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev().filter(|c| c.has_error()));
        }
        None
    }
}

/// Language front-end trait.
///
/// A front-end turns raw source bytes into the engine's closed syntax tree.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations create a
/// parser per call instead of sharing one.
pub trait LanguageFrontend: Send + Sync {
    /// Returns the language identifier (e.g., "go").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this front-end handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Build a parser for this language.
    ///
    /// Fails only when the grammar cannot be loaded (ABI mismatch).
    fn create_parser(&self) -> anyhow::Result<tree_sitter::Parser>;

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Partial parse errors are still returned as a valid tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Lower a parsed tree into the engine's syntax types.
    fn lower(&self, parsed: &ParsedFile) -> anyhow::Result<SourceFile>;

    /// Whether `path` is a test source that scans skip by default.
    fn is_test_file(&self, _path: &Path) -> bool {
        false
    }

    /// Check if this front-end handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
