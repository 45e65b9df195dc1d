//! Kotlin Type Resolver (§4.5): the Phase-2 7-step resolution cascade,
//! superclass/interfaces splitting from `raw_delegations`, and candidate
//! module ranking, grounded on
//! `original_source/codebase_rag/parsers/kotlin/type_resolver.py`.

use crate::parsing::ImportMap;
use crate::registry::SymbolRegistry;
use crate::types::{NodeKind, Qn};

/// Kotlin primitive type names that map to themselves (§4.5 step 4).
const KOTLIN_PRIMITIVES: &[&str] = &[
    "Int", "Long", "Double", "Float", "Boolean", "Char", "Byte", "Short",
];

const JAVA_WRAPPERS: &[&str] = &["String", "Integer", "Long", "Double", "Boolean"];

/// Resolve a Kotlin type name written in source to a fully qualified name,
/// implementing the 7-step cascade of §4.5:
///   1. already-dotted names pass through unchanged
///   2. nullable `?` suffix stripped, resolved, then reattached
///   3. `Array<T>` recurses into `T` and rewraps
///   4. primitive/wrapper canonical forms
///   5. the module's import map
///   6. a `<module>.<name>` Registry probe, restricted to CLASS/INTERFACE
///   7. otherwise returned unchanged, implying an external/unresolved type
pub fn resolve_type_name(
    type_name: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
) -> String {
    if type_name.is_empty() {
        return "Any".to_string();
    }

    if type_name.contains('.') {
        return type_name.to_string();
    }

    if let Some(base) = type_name.strip_suffix('?') {
        let resolved = resolve_type_name(base, module_qn, import_map, registry);
        return format!("{resolved}?");
    }

    if let Some(inner) = type_name
        .strip_prefix("Array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        let resolved_inner = resolve_type_name(inner, module_qn, import_map, registry);
        return format!("Array<{resolved_inner}>");
    }

    if KOTLIN_PRIMITIVES.contains(&type_name) {
        return type_name.to_string();
    }
    if JAVA_WRAPPERS.contains(&type_name) {
        return format!("java.lang.{type_name}");
    }

    if let Some(angle) = type_name.find('<') {
        if type_name.ends_with('>') {
            let (base, rest) = type_name.split_at(angle);
            let resolved_base = resolve_type_name(base, module_qn, import_map, registry);
            return format!("{resolved_base}{rest}");
        }
    }

    if let Some(mapped) = import_map.get(type_name) {
        return mapped.to_string();
    }

    let same_package_qn = module_qn.child(type_name);
    if let Some(kind) = registry.get(&same_package_qn) {
        if matches!(kind, NodeKind::Class | NodeKind::Interface) {
            return same_package_qn.into_string();
        }
    }

    type_name.to_string()
}

/// Splits `raw_delegations` into `(superclass, interfaces)` using the
/// frozen Registry (Phase 2 only — §9 Open Question decision: a
/// delegation specifier whose Registry kind is unknown is excluded from
/// both, never guessed at).
///
/// Grounded on `_find_superclass_using_ast`/`_find_interfaces_using_ast`:
/// the source's more permissive AST-fallback search for un-registered
/// types is intentionally NOT reproduced here.
pub fn split_delegations(
    raw_delegations: &[String],
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
) -> (Option<Qn>, Vec<Qn>) {
    let mut superclass = None;
    let mut interfaces = Vec::new();

    for raw in raw_delegations {
        let resolved = resolve_type_name(raw, module_qn, import_map, registry);
        let qn = Qn::new(resolved);
        match registry.get(&qn) {
            Some(NodeKind::Class) if superclass.is_none() => superclass = Some(qn),
            Some(NodeKind::Interface) => interfaces.push(qn),
            Some(NodeKind::Class) => {
                // A second CLASS-kind delegation specifier is invalid Kotlin
                // (at most one superclass); ignore it rather than overwrite.
            }
            _ => {
                // Unregistered or non-class/interface kind: excluded per
                // the conservative policy, not guessed at.
            }
        }
    }

    (superclass, interfaces)
}

/// `_calculate_module_distance`: a measure of how "close" a candidate
/// module is to the calling module, used to rank ambiguous candidates.
pub fn calculate_module_distance(candidate_qn: &str, caller_module_qn: &str) -> usize {
    let caller_parts: Vec<&str> = caller_module_qn.split('.').collect();
    let candidate_parts: Vec<&str> = candidate_qn.split('.').collect();

    let common_prefix = caller_parts
        .iter()
        .zip(candidate_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let base_distance =
        caller_parts.len().max(candidate_parts.len()).saturating_sub(common_prefix);

    let one_step_sibling = caller_parts.len() > 1
        && candidate_parts.len() >= caller_parts.len() - 1
        && candidate_parts[..caller_parts.len() - 1] == caller_parts[..caller_parts.len() - 1];

    if one_step_sibling {
        base_distance.saturating_sub(1)
    } else {
        base_distance
    }
}

/// Ranks ambiguous module candidates by `(match_penalty, distance,
/// original_index)`, a total order that prefers an exact FQN match, then a
/// suffix match, then proximity to the calling module, then stability
/// (original retrieval order) as the final tie-break.
pub fn rank_module_candidates(
    candidates: &[String],
    class_qn: &str,
    current_module_qn: &str,
) -> Vec<String> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<((u8, usize, usize), &String)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| {
            let match_penalty = if candidate == class_qn {
                0
            } else if class_qn.ends_with(candidate.as_str()) {
                1
            } else {
                2
            };
            let distance = calculate_module_distance(candidate, current_module_qn);
            ((match_penalty, distance, idx), candidate)
        })
        .collect();

    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    ranked.into_iter().map(|(_, candidate)| candidate.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use std::path::PathBuf;

    fn registry_with(entries: &[(&str, NodeKind)]) -> crate::registry::Registry {
        let builder = RegistryBuilder::new();
        for (qn, kind) in entries {
            builder
                .insert(Qn::new(*qn), *kind, &PathBuf::from("test.kt"))
                .unwrap();
        }
        builder.freeze()
    }

    #[test]
    fn test_dot_passthrough() {
        let registry = registry_with(&[]);
        let map = ImportMap::new();
        let resolved = resolve_type_name("a.b.C", &Qn::new("app"), &map, &registry);
        assert_eq!(resolved, "a.b.C");
    }

    #[test]
    fn test_nullable_preserved() {
        let registry = registry_with(&[]);
        let map = ImportMap::new();
        let resolved = resolve_type_name("Int?", &Qn::new("app"), &map, &registry);
        assert_eq!(resolved, "Int?");
    }

    #[test]
    fn test_array_recursion() {
        let registry = registry_with(&[]);
        let map = ImportMap::new();
        let resolved = resolve_type_name("Array<Int>", &Qn::new("app"), &map, &registry);
        assert_eq!(resolved, "Array<Int>");
    }

    #[test]
    fn test_wrapper_canonical_form() {
        let registry = registry_with(&[]);
        let map = ImportMap::new();
        let resolved = resolve_type_name("String", &Qn::new("app"), &map, &registry);
        assert_eq!(resolved, "java.lang.String");
    }

    #[test]
    fn test_import_map_lookup() {
        let registry = registry_with(&[]);
        let mut map = ImportMap::new();
        map.insert("Helper", "app.util.Helper");
        let resolved = resolve_type_name("Helper", &Qn::new("app"), &map, &registry);
        assert_eq!(resolved, "app.util.Helper");
    }

    #[test]
    fn test_same_package_registry_probe_restricted_to_class_interface() {
        let registry = registry_with(&[("app.Foo", NodeKind::Class), ("app.bar", NodeKind::Field)]);
        let map = ImportMap::new();
        assert_eq!(
            resolve_type_name("Foo", &Qn::new("app"), &map, &registry),
            "app.Foo"
        );
        // FIELD kind is not CLASS/INTERFACE, so "bar" is left unresolved.
        assert_eq!(
            resolve_type_name("bar", &Qn::new("app"), &map, &registry),
            "bar"
        );
    }

    #[test]
    fn test_split_delegations_excludes_unknown() {
        let registry = registry_with(&[
            ("app.Animal", NodeKind::Class),
            ("app.Runnable", NodeKind::Interface),
        ]);
        let map = ImportMap::new();
        let raws = vec!["Animal".to_string(), "Runnable".to_string(), "Ghost".to_string()];
        let (superclass, interfaces) = split_delegations(&raws, &Qn::new("app"), &map, &registry);
        assert_eq!(superclass.unwrap().as_str(), "app.Animal");
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].as_str(), "app.Runnable");
    }

    #[test]
    fn test_split_delegations_all_interfaces_when_first_is_interface() {
        let registry = registry_with(&[("app.Runnable", NodeKind::Interface)]);
        let map = ImportMap::new();
        let raws = vec!["Runnable".to_string()];
        let (superclass, interfaces) = split_delegations(&raws, &Qn::new("app"), &map, &registry);
        assert!(superclass.is_none());
        assert_eq!(interfaces.len(), 1);
    }

    #[test]
    fn test_rank_exact_match_wins() {
        let candidates = vec!["app.util".to_string(), "app.model".to_string()];
        let ranked = rank_module_candidates(&candidates, "app.model.Foo", "app.model");
        assert_eq!(ranked[0], "app.model");
    }

    #[test]
    fn test_module_distance_sibling_discount() {
        let distance = calculate_module_distance("app.util", "app.model");
        let unrelated = calculate_module_distance("other.thing", "app.model");
        assert!(distance < unrelated);
    }
}
