//! Graph Emitter (§4.8): a `GraphSink` trait accepting batched node and
//! relationship creations, with in-memory and logging implementations.

use crate::declaration::Declaration;
use crate::relationship::{RelKind, Relationship};
use crate::types::{NodeKind, Qn};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A node's property mapping (§6: "create-or-update node ... taking a
/// typed kind, a QN-keyed identity, and a property mapping").
pub type NodeProps = Map<String, Value>;

/// Accepts batched node/relationship creations. Implementations may
/// buffer freely; ordering between a node and its adjacent edges must be
/// preserved once flushed (§4.8).
pub trait GraphSink: Send {
    fn ensure_node_batch(&mut self, nodes: &[(&Qn, NodeKind, NodeProps)]);
    fn ensure_relationship_batch(&mut self, relationships: &[Relationship]);

    /// Called once Phase 2 completes; implementations that buffer should
    /// flush here. The default is a no-op for sinks that write eagerly.
    fn flush(&mut self) {}
}

/// Dedups by `(NodeKind, Qn)` for nodes and by `Relationship::identity()`
/// for edges, retaining the first-seen properties/`unresolved` flag (§4.8:
/// "Duplicates ... collapse").
#[derive(Default)]
pub struct InMemorySink {
    nodes: HashMap<(NodeKind, Qn), NodeProps>,
    node_order: Vec<(Qn, NodeKind)>,
    relationships: HashMap<(Qn, RelKind, Qn), Relationship>,
    relationship_order: Vec<(Qn, RelKind, Qn)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &(Qn, NodeKind)> {
        self.node_order.iter()
    }

    /// The property mapping recorded for a node, if any was ever batched
    /// for this `(qn, kind)` identity.
    pub fn properties(&self, qn: &Qn, kind: NodeKind) -> Option<&NodeProps> {
        self.nodes.get(&(kind, qn.clone()))
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationship_order
            .iter()
            .map(move |key| &self.relationships[key])
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationship_order.len()
    }
}

impl GraphSink for InMemorySink {
    fn ensure_node_batch(&mut self, nodes: &[(&Qn, NodeKind, NodeProps)]) {
        for (qn, kind, props) in nodes {
            let key = (*kind, (*qn).clone());
            if !self.nodes.contains_key(&key) {
                self.node_order.push(((*qn).clone(), *kind));
                self.nodes.insert(key, props.clone());
            }
        }
    }

    fn ensure_relationship_batch(&mut self, relationships: &[Relationship]) {
        for rel in relationships {
            let key = rel.identity();
            if !self.relationships.contains_key(&key) {
                self.relationship_order.push(key.clone());
                self.relationships.insert(key, rel.clone());
            }
        }
    }
}

/// Logs every batch at `debug` level instead of retaining state; useful
/// for dry runs and the `index --dry-run` CLI flag.
#[derive(Default)]
pub struct LoggingSink {
    node_count: usize,
    relationship_count: usize,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn relationship_count(&self) -> usize {
        self.relationship_count
    }
}

impl GraphSink for LoggingSink {
    fn ensure_node_batch(&mut self, nodes: &[(&Qn, NodeKind, NodeProps)]) {
        for (qn, kind, props) in nodes {
            tracing::debug!(qn = qn.as_str(), kind = %kind, properties = props.len(), "node");
        }
        self.node_count += nodes.len();
    }

    fn ensure_relationship_batch(&mut self, relationships: &[Relationship]) {
        for rel in relationships {
            tracing::debug!(
                from = rel.from.as_str(),
                to = rel.to.as_str(),
                kind = %rel.kind,
                unresolved = rel.unresolved,
                "relationship"
            );
        }
        self.relationship_count += relationships.len();
    }
}

/// Builds the `CONTAINS` edges implied by a declaration's QN nesting: the
/// declaration's immediate parent QN (module or enclosing class) contains
/// it.
pub fn contains_edge(decl: &Declaration, parent_qn: &Qn) -> Relationship {
    Relationship::new(parent_qn.clone(), RelKind::Contains, decl.qn.clone())
}

/// Emits the node for a declaration plus its `INHERITS`/`IMPLEMENTS` edges
/// once the Type Resolver has populated `superclass`/`interfaces`.
pub fn declaration_relationships(decl: &Declaration) -> Vec<Relationship> {
    let mut out = Vec::new();
    if let Some(superclass) = &decl.superclass {
        out.push(Relationship::new(decl.qn.clone(), RelKind::Inherits, superclass.clone()));
    }
    for interface in &decl.interfaces {
        out.push(Relationship::new(decl.qn.clone(), RelKind::Implements, interface.clone()));
    }
    out
}

/// Builds the property mapping batched alongside a declaration's node
/// (§6; §8 scenario 3 relies on `declared_type` surviving here for
/// nullable field types).
pub fn declaration_props(decl: &Declaration) -> NodeProps {
    let mut props = NodeProps::new();
    props.insert("language".to_string(), Value::String(decl.language.name().to_string()));
    if !decl.modifiers.is_empty() {
        let modifiers: Vec<Value> = decl.modifiers.iter().map(|m| Value::String(m.to_string())).collect();
        props.insert("modifiers".to_string(), Value::Array(modifiers));
    }
    if !decl.annotations.is_empty() {
        let annotations: Vec<Value> = decl.annotations.iter().map(|a| Value::String(a.to_string())).collect();
        props.insert("annotations".to_string(), Value::Array(annotations));
    }
    if let Some(declared_type) = &decl.declared_type {
        props.insert("declared_type".to_string(), Value::String(declared_type.to_string()));
    }
    if let Some(return_type) = &decl.return_type {
        props.insert("return_type".to_string(), Value::String(return_type.to_string()));
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileId, Range};

    #[test]
    fn test_in_memory_sink_dedups_nodes() {
        let mut sink = InMemorySink::new();
        let qn = Qn::new("app.Foo");
        sink.ensure_node_batch(&[(&qn, NodeKind::Class, NodeProps::new())]);
        sink.ensure_node_batch(&[(&qn, NodeKind::Class, NodeProps::new())]);
        assert_eq!(sink.node_count(), 1);
    }

    #[test]
    fn test_in_memory_sink_retains_first_seen_properties() {
        let mut sink = InMemorySink::new();
        let qn = Qn::new("app.x");
        let mut first = NodeProps::new();
        first.insert("declared_type".to_string(), Value::String("Int?".to_string()));
        let second = NodeProps::new();
        sink.ensure_node_batch(&[(&qn, NodeKind::Field, first)]);
        sink.ensure_node_batch(&[(&qn, NodeKind::Field, second)]);
        let props = sink.properties(&qn, NodeKind::Field).unwrap();
        assert_eq!(props.get("declared_type").unwrap(), "Int?");
    }

    #[test]
    fn test_declaration_props_captures_declared_type() {
        let mut decl = Declaration::new(
            Qn::new("app.x"),
            "x",
            NodeKind::Field,
            crate::parsing::Language::Kotlin,
            FileId::new(1).unwrap(),
            Range::new(1, 0, 1, 1),
        );
        decl.declared_type = Some(crate::types::compact_string("Int?"));
        let props = declaration_props(&decl);
        assert_eq!(props.get("declared_type").unwrap(), "Int?");
    }

    #[test]
    fn test_in_memory_sink_dedups_relationships_ignoring_unresolved() {
        let mut sink = InMemorySink::new();
        let a = Relationship::new(Qn::new("x"), RelKind::Calls, Qn::new("y"));
        let b = Relationship::unresolved(Qn::new("x"), RelKind::Calls, Qn::new("y"));
        sink.ensure_relationship_batch(&[a]);
        sink.ensure_relationship_batch(&[b]);
        assert_eq!(sink.relationship_count(), 1);
    }

    #[test]
    fn test_declaration_relationships_from_resolved_delegations() {
        let mut decl = Declaration::new(
            Qn::new("app.Dog"),
            "Dog",
            NodeKind::Class,
            crate::parsing::Language::Kotlin,
            FileId::new(1).unwrap(),
            Range::new(1, 0, 1, 1),
        );
        decl.superclass = Some(Qn::new("app.Animal"));
        decl.interfaces = vec![Qn::new("app.Runnable")];
        let rels = declaration_relationships(&decl);
        assert_eq!(rels.len(), 2);
        assert!(rels.iter().any(|r| r.kind == RelKind::Inherits));
        assert!(rels.iter().any(|r| r.kind == RelKind::Implements));
    }
}
