//! Kotlin Variable Analyzer (§4.6): builds a per-scope `name -> type`
//! map through five passes (parameters, local declarations, enclosing
//! class fields, constructor-assignment inference, for-loop variables),
//! grounded on
//! `original_source/codebase_rag/parsers/kotlin/variable_analyzer.py`.

use crate::kotlin::resolver::resolve_type_name;
use crate::parsing::ImportMap;
use crate::registry::SymbolRegistry;
use crate::types::Qn;
use std::collections::HashMap;
use tree_sitter::Node;

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn extract_type_text(type_node: Node, source: &str) -> Option<String> {
    match type_node.kind() {
        "type_identifier" => Some(node_text(type_node, source).to_string()),
        "user_type" => {
            let mut cursor = type_node.walk();
            type_node
                .children(&mut cursor)
                .filter_map(|child| extract_type_text(child, source))
                .last()
        }
        _ => Some(node_text(type_node, source).to_string()),
    }
}

/// Builds the scope's `name -> resolved type` map. `scope_node` is the
/// function/method body (or the whole class, for field-only lookups);
/// `class_node`, if present, supplies the enclosing class's fields under
/// both the bare name and `this.<name>` keys.
pub fn build_variable_type_map(
    scope_node: Node,
    class_node: Option<Node>,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
) -> HashMap<String, String> {
    let mut types = HashMap::new();
    analyze_parameters(scope_node, source, module_qn, import_map, registry, &mut types);
    analyze_local_variables(scope_node, source, module_qn, import_map, registry, &mut types);
    if let Some(class_node) = class_node {
        analyze_class_fields(class_node, source, module_qn, import_map, registry, &mut types);
    }
    analyze_assignments(scope_node, source, module_qn, import_map, registry, &mut types);
    analyze_for_loops(scope_node, source, module_qn, import_map, registry, &mut types);
    types
}

fn resolve(type_name: &str, module_qn: &Qn, import_map: &ImportMap, registry: &dyn SymbolRegistry) -> String {
    resolve_type_name(type_name, module_qn, import_map, registry)
}

/// Pass 1: formal parameters, including vararg (`Array<T>`-wrapped).
fn analyze_parameters(
    scope_node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    let Some(params_node) = scope_node.child_by_field_name("parameters") else {
        return;
    };
    let mut cursor = params_node.walk();
    for child in params_node.children(&mut cursor) {
        match child.kind() {
            "parameter" => {
                let name_node = child
                    .child_by_field_name("name")
                    .or_else(|| child.child_by_field_name("simple_identifier"));
                let Some(name_node) = name_node else { continue };
                let name = node_text(name_node, source).to_string();
                let type_name = child
                    .child_by_field_name("type")
                    .and_then(|t| extract_type_text(t, source))
                    .unwrap_or_else(|| "Any".to_string());
                out.insert(name, resolve(&type_name, module_qn, import_map, registry));
            }
            "spread_parameter" => {
                let mut param_name = None;
                let mut param_type = None;
                let mut sub_cursor = child.walk();
                for sub in child.children(&mut sub_cursor) {
                    match sub.kind() {
                        "type_identifier" | "user_type" => {
                            if let Some(t) = extract_type_text(sub, source) {
                                param_type = Some(format!("Array<{t}>"));
                            }
                        }
                        "simple_identifier" => param_name = Some(node_text(sub, source).to_string()),
                        _ => {}
                    }
                }
                if let (Some(name), Some(ty)) = (param_name, param_type) {
                    out.insert(name, resolve(&ty, module_qn, import_map, registry));
                }
            }
            _ => {}
        }
    }
}

/// Pass 2: local `val`/`var` declarations anywhere under the scope.
fn analyze_local_variables(
    node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    if matches!(node.kind(), "property_declaration" | "variable_declaration") {
        process_variable_declaration(node, source, module_qn, import_map, registry, out);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        analyze_local_variables(child, source, module_qn, import_map, registry, out);
    }
}

fn process_variable_declaration(
    decl_node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    let var_decl = decl_node
        .child_by_field_name("variable_declaration")
        .unwrap_or(decl_node);
    let name_node = var_decl
        .child_by_field_name("name")
        .or_else(|| var_decl.child_by_field_name("simple_identifier"));
    let Some(name_node) = name_node else { return };
    let name = node_text(name_node, source).to_string();

    let declared_type = var_decl
        .child_by_field_name("type")
        .and_then(|t| extract_type_text(t, source));

    let inferred_type = declared_type.or_else(|| {
        decl_node
            .child_by_field_name("value")
            .and_then(|v| infer_type_from_expression(v, source, module_qn, import_map, registry))
    });

    if let Some(type_name) = inferred_type {
        out.insert(name, resolve(&type_name, module_qn, import_map, registry));
    }
}

/// Pass 3: the enclosing class's own fields, registered under both the
/// bare name and `this.<name>` (§4.6).
fn analyze_class_fields(
    class_node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    let Some(body_node) = class_node.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body_node.walk();
    for child in body_node.children(&mut cursor) {
        if child.kind() != "property_declaration" {
            continue;
        }
        let var_decl = child.child_by_field_name("variable_declaration").unwrap_or(child);
        let name_node = var_decl
            .child_by_field_name("name")
            .or_else(|| var_decl.child_by_field_name("simple_identifier"));
        let Some(name_node) = name_node else { continue };
        let field_name = node_text(name_node, source).to_string();
        let field_type = var_decl
            .child_by_field_name("type")
            .and_then(|t| extract_type_text(t, source))
            .unwrap_or_else(|| "Any".to_string());
        let resolved = resolve(&field_type, module_qn, import_map, registry);

        out.insert(format!("this.{field_name}"), resolved.clone());
        out.entry(field_name).or_insert(resolved);
    }
}

/// Pass 4: constructor-body assignments (`x = expr`), which may refine a
/// type beyond its declared/inferred parameter type.
fn analyze_assignments(
    node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    if node.kind() == "assignment" {
        process_assignment(node, source, module_qn, import_map, registry, out);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        analyze_assignments(child, source, module_qn, import_map, registry, out);
    }
}

fn process_assignment(
    assignment_node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    let Some(left) = assignment_node.child_by_field_name("left") else { return };
    let Some(right) = assignment_node.child_by_field_name("right") else { return };
    let Some(var_name) = extract_variable_reference(left, source) else { return };
    if let Some(inferred) = infer_type_from_expression(right, source, module_qn, import_map, registry) {
        out.insert(var_name, resolve(&inferred, module_qn, import_map, registry));
    }
}

fn extract_variable_reference(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" | "simple_identifier" => Some(node_text(node, source).to_string()),
        "navigation_expression" => {
            let receiver = node.child_by_field_name("value").or_else(|| node.child_by_field_name("receiver"))?;
            let field = node.child_by_field_name("suffix").or_else(|| node.child_by_field_name("field"))?;
            let object_name = node_text(receiver, source);
            let field_name = node_text(field, source).trim_start_matches('.');
            Some(format!("{object_name}.{field_name}"))
        }
        _ => None,
    }
}

/// Pass 5: enhanced for-loop variables (`for (x in collection)`).
fn analyze_for_loops(
    node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
    out: &mut HashMap<String, String>,
) {
    if node.kind() == "for_statement" {
        if let Some(name_node) = node
            .child_by_field_name("variable")
            .or_else(|| node.child_by_field_name("simple_identifier"))
        {
            let name = node_text(name_node, source).to_string();
            let element_type = node
                .child_by_field_name("type")
                .and_then(|t| extract_type_text(t, source))
                .unwrap_or_else(|| "Any".to_string());
            out.insert(name, resolve(&element_type, module_qn, import_map, registry));
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        analyze_for_loops(child, source, module_qn, import_map, registry, out);
    }
}

/// Best-effort inference of an expression's static type, used when a
/// `val`/`var` has no explicit type annotation. Only a handful of simple
/// expression shapes are handled; anything else yields `None` and the
/// declaration is left untyped (callers then fall back to the language's
/// top type).
fn infer_type_from_expression(
    node: Node,
    source: &str,
    module_qn: &Qn,
    import_map: &ImportMap,
    registry: &dyn SymbolRegistry,
) -> Option<String> {
    match node.kind() {
        "call_expression" => {
            let callee = node.child_by_field_name("value")?;
            match callee.kind() {
                "simple_identifier" => {
                    let name = node_text(callee, source);
                    Some(name.to_string())
                }
                "navigation_expression" => {
                    let suffix = callee.child_by_field_name("suffix")?;
                    Some(node_text(suffix, source).trim_start_matches('.').to_string())
                }
                _ => None,
            }
        }
        "string_literal" => Some("String".to_string()),
        "integer_literal" => Some("Int".to_string()),
        "real_literal" => Some("Double".to_string()),
        "boolean_literal" => Some("Boolean".to_string()),
        "navigation_expression" => {
            let receiver = node.child_by_field_name("value")?;
            let receiver_type =
                infer_type_from_expression(receiver, source, module_qn, import_map, registry)?;
            Some(receiver_type)
        }
        _ => None,
    }
}
