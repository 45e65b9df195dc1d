//! Call Resolver (§4.7): resolves a call site's `(receiver?, name)` to a
//! callee QN using the variable type map, the `this`-receiver superclass
//! chain, and the enclosing-module/wildcard-import cascade.

use crate::kotlin::resolver::rank_module_candidates;
use crate::parsing::{ImportMap, MethodCall};
use crate::registry::SymbolRegistry;
use crate::types::{NodeKind, Qn};
use std::collections::HashMap;

/// Resolves a receiver that names a type/object rather than a variable —
/// `Logger.log(...)` on an `object Logger`, or a class imported by name —
/// by the same module-then-wildcard cascade step 3 uses for bare callee
/// names, restricted to CLASS/INTERFACE (Kotlin `object`s register as
/// CLASS, see `NodeKind::registry_kind`).
fn resolve_static_receiver(
    receiver: &str,
    enclosing_module: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
) -> Option<Qn> {
    if let Some(mapped) = import_map.get(receiver) {
        let qn = Qn::new(mapped.to_string());
        if matches!(registry.get(&qn), Some(NodeKind::Class | NodeKind::Interface)) {
            return Some(qn);
        }
    }
    let same_module = enclosing_module.child(receiver);
    if matches!(registry.get(&same_module), Some(NodeKind::Class | NodeKind::Interface)) {
        return Some(same_module);
    }
    for prefix in import_map.wildcard_prefixes() {
        let candidate = Qn::new(prefix.to_string()).child(receiver);
        if matches!(registry.get(&candidate), Some(NodeKind::Class | NodeKind::Interface)) {
            return Some(candidate);
        }
    }
    None
}

/// The outcome of resolving one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCall {
    /// `target` is a Registry-known callable QN.
    Resolved { target: Qn },
    /// No Registry entry could be found; `raw_text` is retained verbatim
    /// for the unresolved `CALLS` edge (§4.7 step 5).
    Unresolved { raw_text: String },
}

/// Per-class `QN -> superclass QN` lookup, used to walk the inheritance
/// chain for `this`-receiver calls (§4.7 step 2). Callers build this once
/// per run from the frozen Registry's resolved `superclass` links.
pub trait SuperclassChain {
    fn superclass_of(&self, class_qn: &Qn) -> Option<Qn>;
}

impl SuperclassChain for HashMap<Qn, Qn> {
    fn superclass_of(&self, class_qn: &Qn) -> Option<Qn> {
        self.get(class_qn).cloned()
    }
}

/// Resolves one call site. `enclosing_class`, when the call occurs inside
/// a method, supplies the `this`-receiver's class QN; `enclosing_module`
/// is always the call's containing module QN.
pub fn resolve_call(
    call: &MethodCall,
    variable_types: &HashMap<String, String>,
    enclosing_class: Option<&Qn>,
    enclosing_module: &Qn,
    import_map: &ImportMap,
    superclasses: &dyn SuperclassChain,
    registry: &dyn SymbolRegistry,
) -> ResolvedCall {
    if let Some(receiver) = &call.receiver {
        if call.is_this_call() {
            if let Some(class_qn) = enclosing_class {
                if let Some(target) = probe_superclass_chain(class_qn, &call.method_name, superclasses, registry) {
                    return ResolvedCall::Resolved { target };
                }
            }
        } else if let Some(type_name) = variable_types.get(receiver) {
            let receiver_qn = Qn::new(type_name.trim_end_matches('?').to_string());
            if let Some(target) = probe_method(&receiver_qn, &call.method_name, registry) {
                return ResolvedCall::Resolved { target };
            }
        } else if let Some(receiver_qn) =
            resolve_static_receiver(receiver, enclosing_module, import_map, registry)
        {
            if let Some(target) = probe_method(&receiver_qn, &call.method_name, registry) {
                return ResolvedCall::Resolved { target };
            }
        }
        return ResolvedCall::Unresolved {
            raw_text: format!("{receiver}.{}", call.method_name),
        };
    }

    let mut candidates = Vec::new();
    if probe_method(enclosing_module, &call.method_name, registry).is_some() {
        candidates.push(enclosing_module.as_str().to_string());
    }
    for prefix in import_map.wildcard_prefixes() {
        let wildcard_module = Qn::new(prefix.to_string());
        if probe_method(&wildcard_module, &call.method_name, registry).is_some() {
            candidates.push(wildcard_module.into_string());
        }
    }

    if candidates.is_empty() {
        return ResolvedCall::Unresolved {
            raw_text: call.method_name.clone(),
        };
    }

    let ranked = rank_module_candidates(&candidates, enclosing_module.as_str(), enclosing_module.as_str());
    let winner = Qn::new(ranked[0].clone());
    match probe_method(&winner, &call.method_name, registry) {
        Some(target) => ResolvedCall::Resolved { target },
        None => ResolvedCall::Unresolved {
            raw_text: call.method_name.clone(),
        },
    }
}

fn probe_method(owner_qn: &Qn, method_name: &str, registry: &dyn SymbolRegistry) -> Option<Qn> {
    let candidate = owner_qn.child(method_name);
    registry
        .get(&candidate)
        .filter(|kind| matches!(kind, NodeKind::Method | NodeKind::Function))
        .map(|_| candidate)
}

fn probe_superclass_chain(
    class_qn: &Qn,
    method_name: &str,
    superclasses: &dyn SuperclassChain,
    registry: &dyn SymbolRegistry,
) -> Option<Qn> {
    let mut current = class_qn.clone();
    let mut visited = std::collections::HashSet::new();
    loop {
        if let Some(target) = probe_method(&current, method_name, registry) {
            return Some(target);
        }
        if !visited.insert(current.clone()) {
            return None;
        }
        current = superclasses.superclass_of(&current)?;
    }
}
