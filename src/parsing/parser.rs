//! Declaration Extractor trait (§4.4) and shared AST-traversal helpers.
//!
//! This module defines the common interface every per-language extractor
//! must implement, plus depth-guarding and UTF-8-safe string helpers kept
//! close to the teacher's own `parsing/parser.rs`.

use crate::declaration::Declaration;
use crate::parsing::Language;
use crate::parsing::import::Import;
use crate::parsing::method_call::MethodCall;
use crate::types::FileId;
use std::any::Any;
use std::collections::HashSet;
use tree_sitter::{Node, Tree};

/// Common interface for all per-language Declaration Extractors (§4.4).
///
/// A `LanguageParser` is instantiated once per worker thread (tree-sitter
/// trees are produced per file by the Parser Facade, §4.1) and is handed
/// the already-parsed `Tree` and source text for a single file.
pub trait LanguageParser: Send + Sync {
    /// Walk the tree and produce a declaration record for every top-level
    /// and nested declaration, in source order.
    fn extract_declarations(
        &mut self,
        tree: &Tree,
        source: &str,
        file_id: FileId,
        module_qn: &crate::types::Qn,
    ) -> Vec<Declaration>;

    /// Collect `(receiver?, name, arg_count)` call sites (§4.7).
    fn extract_calls(&mut self, tree: &Tree, source: &str) -> Vec<MethodCall>;

    /// Collect this file's imports (§4.3).
    fn extract_imports(&mut self, tree: &Tree, source: &str, file_id: FileId) -> Vec<Import>;

    fn language(&self) -> Language;

    fn as_any(&self) -> &dyn Any;
}

/// Constructs a fresh `LanguageParser` instance. One factory per worker
/// thread, since a `tree_sitter::Parser` is not `Sync`.
pub trait ParserFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn LanguageParser>, String>;
}

/// Information about a handled AST node, used for audit/coverage tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandledNode {
    pub name: String,
    pub id: u16,
}

/// Extension trait for tracking which AST node kinds an extractor has
/// explicitly handled, so coverage gaps can be audited without maintaining
/// a hand-written list of implemented node kinds.
pub trait NodeTracker {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode>;
    fn register_handled_node(&mut self, node_kind: &str, node_id: u16);
}

#[derive(Debug, Default)]
pub struct NodeTrackingState {
    handled_nodes: HashSet<HandledNode>,
}

impl NodeTrackingState {
    pub fn new() -> Self {
        Self {
            handled_nodes: HashSet::new(),
        }
    }
}

impl NodeTracker for NodeTrackingState {
    fn get_handled_nodes(&self) -> &HashSet<HandledNode> {
        &self.handled_nodes
    }

    #[inline]
    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.handled_nodes.insert(HandledNode {
            name: node_kind.to_string(),
            id: node_id,
        });
    }
}

/// Safely truncate a UTF-8 string at a character boundary.
#[inline]
pub fn safe_truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    &s[..boundary]
}

/// Maximum recursion depth for AST traversal to prevent stack overflow on
/// pathologically nested source (e.g. deeply nested collection literals).
pub const MAX_AST_DEPTH: usize = 500;

/// Centralized depth check; every extractor's recursive walk should call
/// this at the top of its recursive function.
#[inline]
pub fn check_recursion_depth(depth: usize, node: Node) -> bool {
    if depth > MAX_AST_DEPTH {
        tracing::warn!(
            line = node.start_position().row + 1,
            column = node.start_position().column + 1,
            "maximum AST depth ({MAX_AST_DEPTH}) exceeded, skipping subtree"
        );
        return false;
    }
    true
}

/// Safely extract a substring window from source code, respecting UTF-8
/// boundaries, ending at `end_byte` and spanning at most `window_size`
/// bytes before it.
pub fn safe_substring_window(code: &str, end_byte: usize, window_size: usize) -> &str {
    let end = end_byte.min(code.len());
    let start_raw = end.saturating_sub(window_size);
    let start = if start_raw > 0 && !code.is_char_boundary(start_raw) {
        (start_raw..=start_raw.saturating_add(3).min(end))
            .find(|&i| code.is_char_boundary(i))
            .unwrap_or(end)
    } else {
        start_raw
    };
    &code[start..end]
}

#[inline]
pub fn truncate_for_display(s: &str, max_bytes: usize) -> String {
    let truncated = safe_truncate_str(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{truncated}...")
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_with_emoji() {
        let text = "Status: \u{1F50D} Active";
        let result = safe_truncate_str(text, 10);
        assert_eq!(result, "Status: ");
        assert!(result.len() <= 10);
    }

    #[test]
    fn test_safe_truncate_exact_boundary() {
        let text = "Hello, World!";
        let result = safe_truncate_str(text, 7);
        assert_eq!(result, "Hello, ");
    }

    #[test]
    fn test_safe_truncate_multi_byte_chars() {
        let text = "Caf\u{e9} is nice";
        let result = safe_truncate_str(text, 4);
        assert_eq!(result, "Caf");
    }

    #[test]
    fn test_truncate_for_display() {
        let text = "This is a very long string that needs truncation";
        let result = truncate_for_display(text, 10);
        assert_eq!(result, "This is a ...");

        let short_text = "Short";
        let result = truncate_for_display(short_text, 10);
        assert_eq!(result, "Short");
    }

    #[test]
    fn test_node_tracker_dedups() {
        let mut state = NodeTrackingState::new();
        state.register_handled_node("class_declaration", 1);
        state.register_handled_node("class_declaration", 1);
        state.register_handled_node("function_declaration", 2);
        assert_eq!(state.get_handled_nodes().len(), 2);
    }
}
