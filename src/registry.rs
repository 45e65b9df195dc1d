//! The Symbol Registry (§4.2): a QN → NodeKind mapping supporting exact
//! lookup and prefix enumeration, built concurrently in Phase 1 and frozen
//! for lock-free reads in Phase 2 (§5, Design Notes §9).

use crate::error::{PipelineError, Result};
use crate::types::{NodeKind, Qn};
use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// Registry read operations required of any implementation. `items` is the
/// only method a minimal implementation must provide; `entries_with_prefix`
/// has a default linear-scan-over-`items()` fallback so a trie-backed or
/// sorted-array-backed registry can override it for the hot path without
/// forcing every implementer to hand-roll prefix logic (Design Notes §9:
/// "replacing duck-typed registry access" — the source's `find_with_prefix`
/// was an optionally-present attribute; here it is one required trait with
/// a provided default).
pub trait SymbolRegistry {
    fn get(&self, qn: &Qn) -> Option<NodeKind>;

    /// All `(Qn, NodeKind)` pairs in the registry, in registry order.
    fn items(&self) -> Box<dyn Iterator<Item = (&Qn, NodeKind)> + '_>;

    /// All entries equal to `prefix` or starting with `prefix + "."`.
    fn entries_with_prefix(&self, prefix: &str) -> Vec<(Qn, NodeKind)> {
        self.items()
            .filter(|(qn, _)| qn.starts_with_prefix(prefix))
            .map(|(qn, kind)| (qn.clone(), kind))
            .collect()
    }
}

/// Phase-1, insert-only, concurrent-safe registry under construction.
///
/// A second insert for a QN with a kind different from the first is a
/// fatal invariant violation (§7: "Internal invariant violation ... the
/// run aborts with a structured diagnostic identifying the QN and both
/// sites"). A second insert with the *same* kind (e.g. a companion object
/// and its enclosing class both registering under CLASS) is accepted
/// silently since it is not a conflict.
pub struct RegistryBuilder {
    entries: DashMap<Qn, (NodeKind, PathBuf)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn insert(&self, qn: Qn, kind: NodeKind, source_path: &Path) -> Result<()> {
        let kind = kind.registry_kind();
        match self.entries.entry(qn.clone()) {
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert((kind, source_path.to_path_buf()));
                Ok(())
            }
            dashmap::mapref::entry::Entry::Occupied(o) => {
                let (existing_kind, existing_path) = o.get().clone();
                if existing_kind == kind {
                    Ok(())
                } else {
                    Err(PipelineError::ConflictingKind {
                        qn,
                        first: existing_kind,
                        first_path: existing_path,
                        second: kind,
                        second_path: source_path.to_path_buf(),
                    })
                }
            }
        }
    }

    /// Consume the builder, producing a lock-free-read `Registry` sorted by
    /// QN (§4.2, §5: "all reads in Phase 2 are of a frozen registry and
    /// need no synchronization").
    pub fn freeze(self) -> Registry {
        let mut entries: Vec<(Qn, NodeKind)> = self
            .entries
            .into_iter()
            .map(|(qn, (kind, _path))| (qn, kind))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Registry { entries }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable, sorted snapshot of the registry, read lock-free by every
/// Phase-2 worker.
pub struct Registry {
    entries: Vec<(Qn, NodeKind)>,
}

impl Registry {
    /// An empty frozen registry, useful for tests of components that take
    /// a `&Registry` but don't exercise lookups.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn lower_bound(&self, key: &str) -> usize {
        self.entries
            .partition_point(|(qn, _)| qn.as_str() < key)
    }
}

impl SymbolRegistry for Registry {
    fn get(&self, qn: &Qn) -> Option<NodeKind> {
        let idx = self.lower_bound(qn.as_str());
        self.entries
            .get(idx)
            .filter(|(candidate, _)| candidate == qn)
            .map(|(_, kind)| *kind)
    }

    fn items(&self) -> Box<dyn Iterator<Item = (&Qn, NodeKind)> + '_> {
        Box::new(self.entries.iter().map(|(qn, kind)| (qn, *kind)))
    }

    /// Overridden for the hot path (§4.2: "prefix enumeration is the hot
    /// path during candidate ranking"): a binary-search lower bound
    /// followed by a linear scan while the prefix still matches, instead
    /// of the trait default's full linear scan.
    fn entries_with_prefix(&self, prefix: &str) -> Vec<(Qn, NodeKind)> {
        let start = self.lower_bound(prefix);
        self.entries[start..]
            .iter()
            .take_while(|(qn, _)| qn.starts_with_prefix(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p() -> PathBuf {
        PathBuf::from("test.kt")
    }

    #[test]
    fn test_insert_and_get() {
        let builder = RegistryBuilder::new();
        builder
            .insert(Qn::new("app.Foo"), NodeKind::Class, &p())
            .unwrap();
        let registry = builder.freeze();
        assert_eq!(registry.get(&Qn::new("app.Foo")), Some(NodeKind::Class));
        assert_eq!(registry.get(&Qn::new("app.Bar")), None);
    }

    #[test]
    fn test_conflicting_kind_is_fatal() {
        let builder = RegistryBuilder::new();
        builder
            .insert(Qn::new("app.Foo"), NodeKind::Class, &p())
            .unwrap();
        let err = builder.insert(Qn::new("app.Foo"), NodeKind::Interface, &p());
        assert!(matches!(err, Err(PipelineError::ConflictingKind { .. })));
    }

    #[test]
    fn test_object_registers_as_class() {
        let builder = RegistryBuilder::new();
        builder
            .insert(Qn::new("app.Logger"), NodeKind::Object, &p())
            .unwrap();
        let registry = builder.freeze();
        assert_eq!(registry.get(&Qn::new("app.Logger")), Some(NodeKind::Class));
    }

    #[test]
    fn test_same_kind_reinsert_is_not_conflict() {
        let builder = RegistryBuilder::new();
        builder
            .insert(Qn::new("app.Foo"), NodeKind::Class, &p())
            .unwrap();
        builder
            .insert(Qn::new("app.Foo"), NodeKind::Class, &p())
            .unwrap();
    }

    #[test]
    fn test_entries_with_prefix() {
        let builder = RegistryBuilder::new();
        builder
            .insert(Qn::new("app.util.Helper"), NodeKind::Class, &p())
            .unwrap();
        builder
            .insert(Qn::new("app.util.Helper.run"), NodeKind::Method, &p())
            .unwrap();
        builder
            .insert(Qn::new("app.util.HelperFactory"), NodeKind::Class, &p())
            .unwrap();
        builder
            .insert(Qn::new("app.other.Thing"), NodeKind::Class, &p())
            .unwrap();
        let registry = builder.freeze();

        let hits = registry.entries_with_prefix("app.util.Helper");
        let qns: Vec<&str> = hits.iter().map(|(qn, _)| qn.as_str()).collect();
        assert!(qns.contains(&"app.util.Helper"));
        assert!(qns.contains(&"app.util.Helper.run"));
        assert!(!qns.contains(&"app.util.HelperFactory"));
        assert!(!qns.contains(&"app.other.Thing"));
    }

    #[test]
    fn test_default_prefix_fallback_matches_override() {
        struct LinearOnly(Vec<(Qn, NodeKind)>);
        impl SymbolRegistry for LinearOnly {
            fn get(&self, qn: &Qn) -> Option<NodeKind> {
                self.0.iter().find(|(k, _)| k == qn).map(|(_, v)| *v)
            }
            fn items(&self) -> Box<dyn Iterator<Item = (&Qn, NodeKind)> + '_> {
                Box::new(self.0.iter().map(|(qn, kind)| (qn, *kind)))
            }
        }

        let linear = LinearOnly(vec![
            (Qn::new("app.util.Helper"), NodeKind::Class),
            (Qn::new("app.util.Helper.run"), NodeKind::Method),
            (Qn::new("app.util.HelperFactory"), NodeKind::Class),
        ]);
        let hits = linear.entries_with_prefix("app.util.Helper");
        assert_eq!(hits.len(), 2);
    }
}
