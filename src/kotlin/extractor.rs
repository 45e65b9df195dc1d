//! Kotlin Declaration Extractor (§4.4): walks a Kotlin `Tree` and produces
//! one [`Declaration`] per class/interface/enum/object/function/method/
//! property, classifying the aliased `class_declaration` node kind by
//! inspecting its direct children.

use crate::declaration::{CallableType, Declaration, Parameter, TokenList};
use crate::parsing::{
    check_recursion_depth, Import, Language, LanguageParser, MethodCall, NodeTracker,
    NodeTrackingState, ParserFactory,
};
use crate::types::{CompactString, FileId, NodeKind, Qn, Range};
use std::any::Any;
use tree_sitter::{Node, Tree};

pub struct KotlinExtractor {
    tracking: NodeTrackingState,
}

impl KotlinExtractor {
    pub fn new() -> Self {
        Self {
            tracking: NodeTrackingState::new(),
        }
    }
}

impl Default for KotlinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTracker for KotlinExtractor {
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

/// The kind implied by a declaration node's shape, grounded on
/// `class_ingest/node_type.py`'s `determine_node_type` plus
/// `kotlin/utils.py`'s `_determine_class_type` (object/companion_object
/// handled separately from the aliased `class_declaration`).
fn classify_class_like(node: Node, source: &str) -> NodeKind {
    match node.kind() {
        "object_declaration" | "companion_object" => return NodeKind::Object,
        "interface_declaration" => return NodeKind::Interface,
        "enum_class" | "enum_declaration" => return NodeKind::Enum,
        _ => {}
    }
    if node.kind() != "class_declaration" {
        return NodeKind::Class;
    }

    let mut is_interface = false;
    let mut is_enum = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "interface" {
            is_interface = true;
            break;
        }
        if child.kind() == "modifiers" {
            let mut mod_cursor = child.walk();
            for modifier_child in child.children(&mut mod_cursor) {
                if modifier_child.kind() == "class_modifier"
                    && node_text(modifier_child, source) == "enum"
                {
                    is_enum = true;
                }
            }
        }
        if child.kind() == "class_body" {
            break;
        }
    }

    if is_interface {
        NodeKind::Interface
    } else if is_enum {
        NodeKind::Enum
    } else {
        NodeKind::Class
    }
}

/// Extracts the simple type name from a `type_identifier`, `user_type`, or
/// `delegation_specifier` node, grounded on `utils.py`'s
/// `_extract_type_from_node`.
fn extract_type_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => {
            let text = node_text(node, source);
            (!text.is_empty()).then(|| text.to_string())
        }
        "user_type" => {
            let mut cursor = node.walk();
            let mut parts = Vec::new();
            for child in node.children(&mut cursor) {
                if let Some(name) = extract_type_name(child, source) {
                    parts.push(name);
                }
            }
            parts.last().cloned()
        }
        "delegation_specifier" | "constructor_invocation" | "user_type_with_args" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if let Some(name) = extract_type_name(child, source) {
                    return Some(name);
                }
            }
            None
        }
        _ => None,
    }
}

/// Raw delegation-specifier texts, in source order (§3 `raw_delegations`).
/// Phase 1 only; the superclass/interfaces split happens in Phase 2 once
/// the Registry is frozen.
fn extract_raw_delegations(node: Node, source: &str) -> Vec<CompactString> {
    let Some(delegation_node) = node.child_by_field_name("delegation_specifiers") else {
        return Vec::new();
    };
    let mut cursor = delegation_node.walk();
    delegation_node
        .children(&mut cursor)
        .filter(|child| child.kind() == "delegation_specifier")
        .filter_map(|child| extract_type_name(child, source))
        .map(|name| crate::types::compact_string(&name))
        .collect()
}

struct ModifiersAndAnnotations {
    modifiers: TokenList,
    annotations: TokenList,
}

/// Grounded on `utils.py`'s `extract_from_modifiers_node`: scans the
/// node's `modifiers` child for `modifier`/`annotation` children, then
/// also scans the node's own direct children for stray `annotation` nodes.
fn extract_modifiers_and_annotations(node: Node, source: &str) -> ModifiersAndAnnotations {
    let mut modifiers = TokenList::default();
    let mut annotations = TokenList::default();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifiers" {
            let mut mod_cursor = child.walk();
            for modifier_child in child.children(&mut mod_cursor) {
                match modifier_child.kind() {
                    "modifier" => modifiers.push_unique(node_text(modifier_child, source)),
                    "annotation" => {
                        if let Some(name) = extract_annotation_name(modifier_child, source) {
                            annotations.push_unique(&name);
                        }
                    }
                    _ => {}
                }
            }
        }
        if child.kind() == "annotation" {
            if let Some(name) = extract_annotation_name(child, source) {
                annotations.push_unique(&name);
            }
        }
    }

    ModifiersAndAnnotations {
        modifiers,
        annotations,
    }
}

fn extract_annotation_name(annotation_node: Node, source: &str) -> Option<String> {
    let mut cursor = annotation_node.walk();
    for child in annotation_node.children(&mut cursor) {
        match child.kind() {
            "user_type" => return extract_type_name(child, source),
            "type_identifier" => return Some(node_text(child, source).to_string()),
            _ => {}
        }
    }
    None
}

fn extract_declared_type(type_node: Node, source: &str) -> String {
    match type_node.kind() {
        "type_identifier" => node_text(type_node, source).to_string(),
        "user_type" => extract_type_name(type_node, source).unwrap_or_default(),
        _ => node_text(type_node, source).to_string(),
    }
}

fn simple_name_of(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .or_else(|| node.child_by_field_name("simple_identifier"))
        .or_else(|| node.child_by_field_name("type_identifier"))
        .map(|n| node_text(n, source).to_string())
}

impl KotlinExtractor {
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

        let is_class_like = matches!(
            node.kind(),
            "class_declaration" | "object_declaration" | "companion_object"
        );
        let is_function_like = matches!(
            node.kind(),
            "function_declaration" | "secondary_constructor" | "primary_constructor"
        );
        let is_property = node.kind() == "property_declaration";

        let mut next_enclosing = enclosing_qn.clone();
        let mut next_in_class = in_class;

        if is_class_like {
            if let Some(simple_name) = simple_name_of(node, source) {
                let kind = classify_class_like(node, source);
                let raw_delegations = extract_raw_delegations(node, source);
                let mods = extract_modifiers_and_annotations(node, source);
                let qn = enclosing_qn.child(&simple_name);

                self.register_handled_node(node.kind(), node.kind_id());
                out.push(Declaration {
                    modifiers: mods.modifiers,
                    annotations: mods.annotations,
                    raw_delegations,
                    ..Declaration::new(qn.clone(), simple_name, kind, Language::Kotlin, file_id, to_range(node))
                });
                next_enclosing = qn;
                next_in_class = true;
            }
        } else if is_function_like {
            if let Some(name) = simple_name_of(node, source).or_else(|| {
                (node.kind() != "function_declaration").then(|| "<init>".to_string())
            }) {
                let mods = extract_modifiers_and_annotations(node, source);
                let qn = enclosing_qn.child(&name);
                let callable_type = if node.kind() == "function_declaration" {
                    CallableType::Plain
                } else {
                    CallableType::Constructor
                };
                let kind = if in_class { NodeKind::Method } else { NodeKind::Function };
                let return_type = node
                    .child_by_field_name("type")
                    .or_else(|| node.child_by_field_name("return_type"))
                    .map(|n| crate::types::compact_string(&extract_declared_type(n, source)));
                let parameters = extract_parameters(node, source);

                self.register_handled_node(node.kind(), node.kind_id());
                out.push(Declaration {
                    return_type,
                    callable_type: Some(callable_type),
                    parameters,
                    modifiers: mods.modifiers,
                    annotations: mods.annotations,
                    ..Declaration::new(qn, name, kind, Language::Kotlin, file_id, to_range(node))
                });
            }
        } else if is_property {
            if let Some(name) = extract_property_name(node, source) {
                let mods = extract_modifiers_and_annotations(node, source);
                let declared_type = node
                    .child_by_field_name("type")
                    .map(|n| crate::types::compact_string(&extract_declared_type(n, source)));
                let qn = enclosing_qn.child(&name);

                self.register_handled_node(node.kind(), node.kind_id());
                out.push(Declaration {
                    declared_type,
                    modifiers: mods.modifiers,
                    annotations: mods.annotations,
                    ..Declaration::new(qn, name, NodeKind::Field, Language::Kotlin, file_id, to_range(node))
                });
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

fn extract_property_name(field_node: Node, source: &str) -> Option<String> {
    if let Some(variable_decl) = field_node.child_by_field_name("variable_declaration") {
        return simple_name_of(variable_decl, source);
    }
    simple_name_of(field_node, source)
}

fn extract_parameters(method_node: Node, source: &str) -> Vec<Parameter> {
    let Some(params_node) = method_node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params_node.walk();
    params_node
        .children(&mut cursor)
        .filter(|child| child.kind() == "parameter")
        .map(|param| {
            let name = param
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string())
                .unwrap_or_default();
            let type_name = param
                .child_by_field_name("type")
                .map(|n| extract_declared_type(n, source))
                .unwrap_or_else(|| "Any".to_string());
            Parameter {
                name: crate::types::compact_string(&name),
                type_name: crate::types::compact_string(&type_name),
            }
        })
        .collect()
}

impl LanguageParser for KotlinExtractor {
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
            if child.kind() == "import_header" || child.kind() == "import_list" {
                collect_import(child, source, &mut out);
            }
        }
        out
    }

    fn language(&self) -> Language {
        Language::Kotlin
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn collect_import(node: Node, source: &str, out: &mut Vec<Import>) {
    if node.kind() == "import_header" {
        let text = node_text(node, source)
            .trim_start_matches("import")
            .trim();
        if let Some(alias_idx) = text.find(" as ") {
            let (path, alias) = text.split_at(alias_idx);
            let alias = alias.trim_start_matches(" as ").trim();
            out.push(Import::aliased(path.trim(), alias));
        } else if let Some(prefix) = text.strip_suffix(".*") {
            out.push(Import::wildcard(prefix));
        } else if !text.is_empty() {
            out.push(Import::new(text));
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_import(child, source, out);
    }
}

fn walk_calls(node: Node, source: &str, caller: &str, depth: usize, out: &mut Vec<MethodCall>) {
    if !check_recursion_depth(depth, node) {
        return;
    }

    let mut next_caller = caller;
    let owned;
    if matches!(node.kind(), "function_declaration" | "secondary_constructor") {
        if let Some(name) = simple_name_of(node, source) {
            owned = name;
            next_caller = &owned;
        }
    }

    if node.kind() == "call_expression" {
        if let Some((receiver, name)) = extract_call_name_and_receiver(node, source) {
            let arg_count = node
                .child_by_field_name("value_arguments")
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

fn extract_call_name_and_receiver(call_node: Node, source: &str) -> Option<(Option<String>, String)> {
    let callee = call_node.child_by_field_name("value")?;
    match callee.kind() {
        "navigation_expression" => {
            let receiver = callee.child_by_field_name("value")?;
            let suffix = callee.child_by_field_name("suffix")?;
            let name = node_text(suffix, source).trim_start_matches('.').to_string();
            Some((Some(node_text(receiver, source).to_string()), name))
        }
        "simple_identifier" => Some((None, node_text(callee, source).to_string())),
        _ => None,
    }
}

pub struct KotlinParserFactory;

impl ParserFactory for KotlinParserFactory {
    fn create(&self) -> Result<Box<dyn LanguageParser>, String> {
        Ok(Box::new(KotlinExtractor::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ParserFacade;

    fn extract(source: &str) -> Vec<Declaration> {
        let tree = ParserFacade::parse_str(source, Language::Kotlin, std::path::Path::new("Test.kt")).unwrap();
        let mut extractor = KotlinExtractor::new();
        extractor.extract_declarations(&tree, source, FileId::new(1).unwrap(), &Qn::new("app"))
    }

    #[test]
    fn test_class_classified_as_class() {
        let decls = extract("class Foo {}");
        let foo = decls.iter().find(|d| d.simple_name.as_ref() == "Foo").unwrap();
        assert_eq!(foo.kind, NodeKind::Class);
    }

    #[test]
    fn test_interface_classified_as_interface() {
        let decls = extract("interface Foo {}");
        let foo = decls.iter().find(|d| d.simple_name.as_ref() == "Foo").unwrap();
        assert_eq!(foo.kind, NodeKind::Interface);
    }

    #[test]
    fn test_enum_classified_as_enum() {
        let decls = extract("enum class Color { RED, BLUE }");
        let color = decls.iter().find(|d| d.simple_name.as_ref() == "Color").unwrap();
        assert_eq!(color.kind, NodeKind::Enum);
    }

    #[test]
    fn test_object_classified_as_object_surface_class_registry() {
        let decls = extract("object Logger {}");
        let logger = decls.iter().find(|d| d.simple_name.as_ref() == "Logger").unwrap();
        assert_eq!(logger.kind, NodeKind::Object);
        assert_eq!(logger.kind.registry_kind(), NodeKind::Class);
    }

    #[test]
    fn test_raw_delegations_captured_without_split() {
        let decls = extract("class Dog : Animal(), Runnable {}");
        let dog = decls.iter().find(|d| d.simple_name.as_ref() == "Dog").unwrap();
        assert_eq!(dog.raw_delegations.len(), 2);
        assert!(dog.superclass.is_none());
        assert!(dog.interfaces.is_empty());
    }

    #[test]
    fn test_function_declaration() {
        let decls = extract("fun greet(name: String): String { return name }");
        let greet = decls.iter().find(|d| d.simple_name.as_ref() == "greet").unwrap();
        assert_eq!(greet.kind, NodeKind::Function);
        assert_eq!(greet.return_type.as_deref(), Some("String"));
        assert_eq!(greet.parameters.len(), 1);
        assert_eq!(greet.parameters[0].name, "name");
    }

    #[test]
    fn test_method_inside_class() {
        let decls = extract("class Foo { fun bar() {} }");
        let bar = decls.iter().find(|d| d.simple_name.as_ref() == "bar").unwrap();
        assert_eq!(bar.kind, NodeKind::Method);
        assert_eq!(bar.qn.as_str(), "app.Foo.bar");
    }
}
