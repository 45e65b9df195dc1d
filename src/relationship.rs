//! Typed relationship (edge) kinds emitted by the pipeline (§6).

use crate::types::Qn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelKind {
    /// module→declaration, class→member
    Contains,
    /// class→class
    Inherits,
    /// class→interface
    Implements,
    /// module→module or module→declaration
    Imports,
    /// callable→callable
    Calls,
    /// module→type-alias
    DefinesType,
}

impl std::fmt::Display for RelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelKind::Contains => "CONTAINS",
            RelKind::Inherits => "INHERITS",
            RelKind::Implements => "IMPLEMENTS",
            RelKind::Imports => "IMPORTS",
            RelKind::Calls => "CALLS",
            RelKind::DefinesType => "DEFINES_TYPE",
        };
        write!(f, "{s}")
    }
}

/// A typed edge between two QNs. `unresolved` is meaningful only for
/// `Calls` edges (§6: "CALLS ... with property unresolved: bool") but is
/// carried uniformly so the Graph Emitter has a single edge shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: Qn,
    pub kind: RelKind,
    pub to: Qn,
    pub unresolved: bool,
}

impl Relationship {
    pub fn new(from: Qn, kind: RelKind, to: Qn) -> Self {
        Self {
            from,
            kind,
            to,
            unresolved: false,
        }
    }

    pub fn unresolved(from: Qn, kind: RelKind, to: Qn) -> Self {
        Self {
            from,
            kind,
            to,
            unresolved: true,
        }
    }

    /// Identity used for dedup by the Graph Emitter: same kind + same
    /// endpoints collapse regardless of `unresolved` (§4.8).
    pub fn identity(&self) -> (Qn, RelKind, Qn) {
        (self.from.clone(), self.kind, self.to.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_unresolved_flag() {
        let a = Relationship::new(Qn::new("x"), RelKind::Calls, Qn::new("y"));
        let b = Relationship::unresolved(Qn::new("x"), RelKind::Calls, Qn::new("y"));
        assert_eq!(a.identity(), b.identity());
    }
}
