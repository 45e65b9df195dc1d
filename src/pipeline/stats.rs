//! Run statistics reported by the Pipeline (§8).

use std::time::Duration;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IndexingStats {
    pub files_parsed: usize,
    pub files_failed: usize,
    pub declarations: usize,
    pub relationships: usize,
    pub unresolved_calls: usize,
    /// Delegation-specifier names excluded from both `superclass` and
    /// `interfaces` because their Registry kind was unknown (§9 Open
    /// Question decision: excluded, never guessed at).
    pub excluded_unknown_specifiers: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl IndexingStats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for IndexingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files parsed ({} failed), {} declarations, {} relationships, {} unresolved calls, {} specifiers excluded (unknown kind), {:.2}s",
            self.files_parsed,
            self.files_failed,
            self.declarations,
            self.relationships,
            self.unresolved_calls,
            self.excluded_unknown_specifiers,
            self.elapsed.as_secs_f64()
        )
    }
}
