//! Java Declaration Extractor (§4.4a): a thinner sibling to the Kotlin
//! extractor. Java's grammar does not alias node kinds the way Kotlin's
//! does, so no children-based disambiguation is needed — `class_declaration`,
//! `interface_declaration`, and `enum_declaration` map directly to their
//! NodeKind. Superclass/interfaces are still captured only as
//! `raw_delegations` and left for the Type Resolver to split (§9), keeping
//! the same extractor invariant Kotlin observes.

use crate::declaration::{CallableType, Declaration, Parameter, TokenList};
use crate::parsing::{
    check_recursion_depth, Import, Language, LanguageParser, MethodCall, NodeTracker,
    NodeTrackingState, ParserFactory,
};
use crate::types::{CompactString, FileId, NodeKind, Qn, Range};
use std::any::Any;
use tree_sitter::{Node, Tree};

pub struct JavaExtractor {
    tracking: NodeTrackingState,
}

impl JavaExtractor {
    pub fn new() -> Self {
        Self {
            tracking: NodeTrackingState::new(),
        }
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTracker for JavaExtractor {
    fn get_handled_nodes(&self) -> &std::collections::HashSet<crate::parsing::HandledNode> {
        self.tracking.get_handled_nodes()
    }

    fn register_handled_node(&mut self, node_kind: &str, node_id: u16) {
        self.tracking.register_handled_node(node_kind, node_id);
    }
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn to_range(node: Node) -> Range {
    let start = node.start_position();
    let end = node.end_position();
    Range::new(
        start.row as u32,
        start.column as u16,
        end.row as u32,
        end.column as u16,
    )
}

fn class_kind(node_kind: &str) -> Option<NodeKind> {
    match node_kind {
        "class_declaration" => Some(NodeKind::Class),
        "interface_declaration" => Some(NodeKind::Interface),
        "enum_declaration" => Some(NodeKind::Enum),
        _ => None,
    }
}

fn simple_name(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
}

fn extract_modifiers_and_annotations(node: Node, source: &str) -> (TokenList, TokenList) {
    let mut modifiers = TokenList::default();
    let mut annotations = TokenList::default();
    let Some(mods_node) = node.child_by_field_name("modifiers") else {
        return (modifiers, annotations);
    };
    let mut cursor = mods_node.walk();
    for child in mods_node.children(&mut cursor) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                if let Some(name) = child.child_by_field_name("name") {
                    annotations.push_unique(node_text(name, source));
                }
            }
            kind => modifiers.push_unique(kind),
        }
    }
    (modifiers, annotations)
}

/// The `extends`/`implements` clauses, kept verbatim and unresolved
/// (superclass first, then each interface), mirroring Kotlin's
/// `raw_delegations` so `split_delegations` works identically across
/// languages.
fn extract_raw_delegations(node: Node, source: &str) -> Vec<CompactString> {
    let mut out = Vec::new();
    if let Some(superclass) = node.child_by_field_name("superclass") {
        if let Some(name) = extract_type_name(superclass, source) {
            out.push(crate::types::compact_string(&name));
        }
    }
    if let Some(interfaces) = node
        .child_by_field_name("interfaces")
        .or_else(|| node.child_by_field_name("super_interfaces"))
    {
        let mut cursor = interfaces.walk();
        for child in interfaces.children(&mut cursor) {
            if let Some(name) = extract_type_name(child, source) {
                out.push(crate::types::compact_string(&name));
            }
        }
    }
    out
}

fn extract_type_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(node_text(node, source).to_string()),
        "generic_type" => node
            .child_by_field_name("name")
            .and_then(|n| extract_type_name(n, source)),
        "scoped_type_identifier" => Some(node_text(node, source).to_string()),
        "superclass" | "interfaces" | "super_interfaces" | "type_list" => {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter_map(|c| extract_type_name(c, source))
                .next()
        }
        _ => None,
    }
}

fn extract_parameters(method_node: Node, source: &str) -> Vec<Parameter> {
    let Some(params_node) = method_node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params_node.walk();
    params_node
        .children(&mut cursor)
        .filter(|child| child.kind() == "formal_parameter")
        .map(|param| {
            let name = param
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string())
                .unwrap_or_default();
            let type_name = param
                .child_by_field_name("type")
                .and_then(|n| extract_type_name(n, source).or_else(|| Some(node_text(n, source).to_string())))
                .unwrap_or_else(|| "Object".to_string());
            Parameter {
                name: crate::types::compact_string(&name),
                type_name: crate::types::compact_string(&type_name),
            }
        })
        .collect()
}

impl JavaExtractor {
    fn walk_declarations(
        &mut self,
        node: Node,
        source: &str,
        file_id: FileId,
        enclosing_qn: &Qn,
        in_class: bool,
        depth: usize,
        out: &mut Vec<Declaration>,
    ) {
        if !check_recursion_depth(depth, node) {
            return;
        }

        let mut next_enclosing = enclosing_qn.clone();
        let mut next_in_class = in_class;

        if let Some(kind) = class_kind(node.kind()) {
            if let Some(name) = simple_name(node, source) {
                let raw_delegations = extract_raw_delegations(node, source);
                let (modifiers, annotations) = extract_modifiers_and_annotations(node, source);
                let qn = enclosing_qn.child(&name);

                self.register_handled_node(node.kind(), node.kind_id());
                out.push(Declaration {
                    modifiers,
                    annotations,
                    raw_delegations,
                    ..Declaration::new(qn.clone(), name, kind, Language::Java, file_id, to_range(node))
                });
                next_enclosing = qn;
                next_in_class = true;
            }
        } else if matches!(node.kind(), "method_declaration" | "constructor_declaration") {
            if let Some(name) = simple_name(node, source)
                .or_else(|| (node.kind() == "constructor_declaration").then(|| "<init>".to_string()))
            {
                let (modifiers, annotations) = extract_modifiers_and_annotations(node, source);
                let qn = enclosing_qn.child(&name);
                let callable_type = if node.kind() == "constructor_declaration" {
                    CallableType::Constructor
                } else {
                    CallableType::Plain
                };
                let return_type = node
                    .child_by_field_name("type")
                    .and_then(|n| extract_type_name(n, source).or_else(|| Some(node_text(n, source).to_string())))
                    .map(|t| crate::types::compact_string(&t));
                let parameters = extract_parameters(node, source);

                self.register_handled_node(node.kind(), node.kind_id());
                out.push(Declaration {
                    return_type,
                    callable_type: Some(callable_type),
                    parameters,
                    modifiers,
                    annotations,
                    ..Declaration::new(qn, name, NodeKind::Method, Language::Java, file_id, to_range(node))
                });
            }
        } else if node.kind() == "field_declaration" {
            let declarator = node.child_by_field_name("declarator");
            let field_type = node
                .child_by_field_name("type")
                .and_then(|n| extract_type_name(n, source).or_else(|| Some(node_text(n, source).to_string())));
            if let Some(declarator) = declarator {
                if let Some(name_node) = declarator.child_by_field_name("name") {
                    let name = node_text(name_node, source).to_string();
                    let (modifiers, annotations) = extract_modifiers_and_annotations(node, source);
                    let qn = enclosing_qn.child(&name);

                    self.register_handled_node(node.kind(), node.kind_id());
                    out.push(Declaration {
                        declared_type: field_type.map(|t| crate::types::compact_string(&t)),
                        modifiers,
                        annotations,
                        ..Declaration::new(qn, name, NodeKind::Field, Language::Java, file_id, to_range(node))
                    });
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_declarations(
                child,
                source,
                file_id,
                &next_enclosing,
                next_in_class,
                depth + 1,
                out,
            );
        }
    }
}

impl LanguageParser for JavaExtractor {
    fn extract_declarations(
        &mut self,
        tree: &Tree,
        source: &str,
        file_id: FileId,
        module_qn: &Qn,
    ) -> Vec<Declaration> {
        let mut out = Vec::new();
        self.walk_declarations(tree.root_node(), source, file_id, module_qn, false, 0, &mut out);
        out
    }

    fn extract_calls(&mut self, tree: &Tree, source: &str) -> Vec<MethodCall> {
        let mut out = Vec::new();
        walk_calls(tree.root_node(), source, "<module>", 0, &mut out);
        out
    }

    fn extract_imports(&mut self, tree: &Tree, source: &str, _file_id: FileId) -> Vec<Import> {
        let mut out = Vec::new();
        let mut cursor = tree.root_node().walk();
        for child in tree.root_node().children(&mut cursor) {
            if child.kind() == "import_declaration" {
                let text = node_text(child, source)
                    .trim_start_matches("import")
                    .trim()
                    .trim_end_matches(';')
                    .trim();
                if let Some(prefix) = text.strip_suffix(".*") {
                    out.push(Import::wildcard(prefix));
                } else if !text.is_empty() {
                    out.push(Import::new(text));
                }
            }
        }
        out
    }

    fn language(&self) -> Language {
        Language::Java
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn walk_calls(node: Node, source: &str, caller: &str, depth: usize, out: &mut Vec<MethodCall>) {
    if !check_recursion_depth(depth, node) {
        return;
    }

    let mut next_caller = caller;
    let owned;
    if matches!(node.kind(), "method_declaration" | "constructor_declaration") {
        if let Some(name) = simple_name(node, source) {
            owned = name;
            next_caller = &owned;
        }
    }

    if node.kind() == "method_invocation" {
        let name = node.child_by_field_name("name").map(|n| node_text(n, source).to_string());
        if let Some(name) = name {
            let receiver = node
                .child_by_field_name("object")
                .map(|n| node_text(n, source).to_string());
            let arg_count = node
                .child_by_field_name("arguments")
                .map(|args| args.named_child_count())
                .unwrap_or(0);
            let mut call = MethodCall::new(next_caller, name, to_range(node)).with_arg_count(arg_count);
            if let Some(receiver) = receiver {
                call = call.with_receiver(receiver);
            }
            out.push(call);
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls(child, source, next_caller, depth + 1, out);
    }
}

pub struct JavaParserFactory;

impl ParserFactory for JavaParserFactory {
    fn create(&self) -> Result<Box<dyn LanguageParser>, String> {
        Ok(Box::new(JavaExtractor::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ParserFacade;

    fn extract(source: &str) -> Vec<Declaration> {
        let tree = ParserFacade::parse_str(source, Language::Java, std::path::Path::new("Test.java")).unwrap();
        let mut extractor = JavaExtractor::new();
        extractor.extract_declarations(&tree, source, FileId::new(1).unwrap(), &Qn::new("app"))
    }

    #[test]
    fn test_class_declaration() {
        let decls = extract("class Foo {}");
        let foo = decls.iter().find(|d| d.simple_name.as_ref() == "Foo").unwrap();
        assert_eq!(foo.kind, NodeKind::Class);
    }

    #[test]
    fn test_interface_declaration() {
        let decls = extract("interface Foo {}");
        let foo = decls.iter().find(|d| d.simple_name.as_ref() == "Foo").unwrap();
        assert_eq!(foo.kind, NodeKind::Interface);
    }

    #[test]
    fn test_extends_and_implements_captured_as_raw_delegations() {
        let decls = extract("class Dog extends Animal implements Runnable {}");
        let dog = decls.iter().find(|d| d.simple_name.as_ref() == "Dog").unwrap();
        assert_eq!(dog.raw_delegations.len(), 2);
        assert!(dog.superclass.is_none());
    }

    #[test]
    fn test_method_inside_class() {
        let decls = extract("class Foo { void bar() {} }");
        let bar = decls.iter().find(|d| d.simple_name.as_ref() == "bar").unwrap();
        assert_eq!(bar.kind, NodeKind::Method);
        assert_eq!(bar.qn.as_str(), "app.Foo.bar");
    }
}
