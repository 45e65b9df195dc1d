//! AST Cache: each file is parsed exactly once (§4.1, §5), and the parsed
//! `Tree` plus its source text is retained for the lifetime of the run so
//! Phase 2 never re-parses.

use crate::parsing::Language;
use crate::types::FileId;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tree_sitter::Tree;

/// One parsed file: an immutable `Tree`/source pair plus its detected
/// language, shared across threads via `Arc` once inserted.
pub struct CachedFile {
    pub path: PathBuf,
    pub language: Language,
    pub source: String,
    pub tree: Tree,
}

/// Insert-once, read-many cache keyed by `FileId` (§5: "a file's tree is
/// parsed once in Phase 1 and read without synchronization in Phase 2").
#[derive(Default)]
pub struct AstCache {
    files: DashMap<FileId, Arc<CachedFile>>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly parsed file. Overwriting an existing entry would
    /// indicate the same `FileId` was parsed twice, which never happens in
    /// the normal Phase-1 fan-out; callers should treat a pre-existing
    /// entry as a bug rather than silently ignore it.
    pub fn insert(&self, file_id: FileId, file: CachedFile) -> Arc<CachedFile> {
        let arc = Arc::new(file);
        self.files.insert(file_id, arc.clone());
        arc
    }

    pub fn get(&self, file_id: FileId) -> Option<Arc<CachedFile>> {
        self.files.get(&file_id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_ids(&self) -> Vec<FileId> {
        self.files.iter().map(|entry| *entry.key()).collect()
    }
}
