//! Pipeline orchestration (§2, §5): Phase 1 builds the Symbol Registry
//! over every file in parallel; Phase 2, only once the Registry is frozen,
//! resolves inheritance, variables, and calls per file in parallel.
//!
//! Phase 2 itself runs in two parallel sub-steps rather than one: step A
//! splits every class's `raw_delegations` and publishes a QN→superclass
//! map, step B resolves calls. Call resolution needs the full cross-file
//! superclass chain (a `this`-call may reach a superclass defined in
//! another file), which can only exist once every file's delegations have
//! been split — so step A must fully finish before step B starts, the same
//! ordering constraint that separates Phase 1 from Phase 2.

pub mod stats;
pub mod walker;

pub use stats::IndexingStats;

use crate::config::Settings;
use crate::declaration::Declaration;
use crate::emit::{contains_edge, declaration_props, declaration_relationships, GraphSink, NodeProps};
use crate::error::Result;
use crate::java::JavaExtractor;
use crate::kotlin::resolver::split_delegations;
use crate::kotlin::variables::build_variable_type_map;
use crate::kotlin::KotlinExtractor;
use crate::parsing::{Import, ImportMap, Language, LanguageParser, ParserFacade};
use crate::registry::{Registry, RegistryBuilder};
use crate::relationship::{RelKind, Relationship};
use crate::resolution::{resolve_call, ResolvedCall, SuperclassChain};
use crate::types::{FileId, NodeKind, Qn, Range};
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tree_sitter::{Node, Tree};

fn new_extractor(language: Language) -> Box<dyn LanguageParser> {
    match language {
        Language::Kotlin => Box::new(KotlinExtractor::new()),
        Language::Java => Box::new(JavaExtractor::new()),
    }
}

/// Turns a file path, relative to the indexed root, into a module QN by
/// joining its path segments with `.` and dropping the extension.
fn module_qn_for(root: &Path, path: &Path) -> Qn {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let without_ext = relative.with_extension("");
    let segments: Vec<String> = without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Qn::new(segments.join("."))
}

fn parent_qn(qn: &Qn) -> Option<Qn> {
    let segments: Vec<&str> = qn.segments().collect();
    if segments.len() <= 1 {
        return None;
    }
    Some(Qn::new(segments[..segments.len() - 1].join(".")))
}

/// Finds the smallest node whose range exactly matches `range`, used to
/// recover a declaration's tree-sitter node from its stored `Range` in
/// Phase 2 (Phase 1 discards node handles once the `Declaration` is
/// built).
fn find_node_by_range<'a>(tree: &'a Tree, range: Range) -> Option<Node<'a>> {
    fn walk<'b>(node: Node<'b>, range: Range) -> Option<Node<'b>> {
        let start = node.start_position();
        let end = node.end_position();
        if start.row as u32 == range.start_line
            && start.column as u16 == range.start_column
            && end.row as u32 == range.end_line
            && end.column as u16 == range.end_column
        {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if let Some(found) = walk(child, range) {
                    return Some(found);
                }
            }
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = walk(child, range) {
                return Some(found);
            }
        }
        None
    }
    walk(tree.root_node(), range)
}

const CLASS_LIKE_KINDS: &[&str] = &[
    "class_declaration",
    "object_declaration",
    "companion_object",
    "interface_declaration",
    "enum_declaration",
    "enum_class",
];

fn find_enclosing_class_node<'a>(node: Node<'a>) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if CLASS_LIKE_KINDS.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

struct ParsedFile {
    language: Language,
    source: String,
    tree: Tree,
    module_qn: Qn,
    imports: Vec<Import>,
    declarations: Vec<Declaration>,
}

/// Orchestrates both phases over every source file under `root`, feeding
/// every discovered node and relationship to `sink`.
pub struct Pipeline<'a> {
    settings: &'a Settings,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn run(&self, root: &Path, sink: &mut dyn GraphSink) -> Result<IndexingStats> {
        let started = Instant::now();
        let mut stats = IndexingStats::new();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.indexing.parallel_threads)
            .build()
            .expect("thread pool configuration is always valid");

        let paths = walker::walk_source_files(root, self.settings)?;

        let registry_builder = RegistryBuilder::new();
        let next_file_id = AtomicUsize::new(1);
        let failed = AtomicUsize::new(0);

        // Phase 1: parse every file and populate the Registry concurrently.
        let parsed_files: Vec<ParsedFile> = pool.install(|| {
            paths
                .par_iter()
                .filter_map(|path| {
                    let (tree, source, language) = match ParserFacade::parse_file(path) {
                        Ok(parsed) => parsed,
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            return None;
                        }
                    };
                    let file_id = FileId::new(next_file_id.fetch_add(1, Ordering::Relaxed) as u32)
                        .expect("counter starts at 1 and only increments");
                    let module_qn = module_qn_for(root, path);

                    let mut extractor = new_extractor(language);
                    let declarations =
                        extractor.extract_declarations(&tree, &source, file_id, &module_qn);
                    let imports = extractor.extract_imports(&tree, &source, file_id);

                    registry_builder
                        .insert(module_qn.clone(), NodeKind::Module, path)
                        .ok();
                    for decl in &declarations {
                        if let Err(err) = registry_builder.insert(decl.qn.clone(), decl.kind, path) {
                            tracing::error!(error = %err, "conflicting declaration kind");
                        }
                    }

                    Some(ParsedFile {
                        language,
                        source,
                        tree,
                        module_qn,
                        imports,
                        declarations,
                    })
                })
                .collect()
        });

        stats.files_parsed = parsed_files.len();
        stats.files_failed = failed.load(Ordering::Relaxed);

        let registry = registry_builder.freeze();

        let import_maps: HashMap<Qn, ImportMap> = parsed_files
            .iter()
            .map(|f| (f.module_qn.clone(), ImportMap::build(f.language, &f.imports)))
            .collect();

        let superclass_chain: DashMap<Qn, Qn> = DashMap::new();
        let excluded_unknown = AtomicUsize::new(0);

        // Phase 2, step A: split every class's raw_delegations now that the
        // Registry is frozen, and emit CONTAINS/INHERITS/IMPLEMENTS edges.
        // Alongside each file's declarations we carry a parallel vec of raw
        // fallback text (§8 scenario 6): when a delegation specifier is the
        // sole one and still doesn't resolve to a known CLASS/INTERFACE, an
        // unresolved INHERITS edge recording the raw name is emitted instead
        // of silently dropping it; with more than one specifier the failure
        // is ambiguous (could have been either kind) and is omitted.
        let step_a: Vec<(Vec<Declaration>, Vec<Option<String>>)> = pool.install(|| {
            parsed_files
                .par_iter()
                .map(|file| {
                    let import_map = &import_maps[&file.module_qn];
                    let mut decls = file.declarations.clone();
                    let mut unresolved_raw = vec![None; decls.len()];
                    for (decl, fallback) in decls.iter_mut().zip(unresolved_raw.iter_mut()) {
                        if decl.raw_delegations.is_empty() {
                            continue;
                        }
                        let raws: Vec<String> =
                            decl.raw_delegations.iter().map(|c| c.to_string()).collect();
                        let (superclass, interfaces) =
                            split_delegations(&raws, &file.module_qn, import_map, &registry);
                        let unresolved_count = raws.len()
                            - superclass.is_some() as usize
                            - interfaces.len();
                        excluded_unknown.fetch_add(unresolved_count, Ordering::Relaxed);
                        if superclass.is_none() && interfaces.is_empty() && raws.len() == 1 {
                            *fallback = Some(raws[0].clone());
                        }
                        if let Some(superclass) = &superclass {
                            superclass_chain.insert(decl.qn.clone(), superclass.clone());
                        }
                        decl.superclass = superclass;
                        decl.interfaces = interfaces;
                    }
                    (decls, unresolved_raw)
                })
                .collect()
        });

        for (file, (decls, unresolved_raw)) in parsed_files.iter().zip(&step_a) {
            emit_structural(file, decls, unresolved_raw, sink);
        }

        let declarations_by_file: Vec<Vec<Declaration>> =
            step_a.into_iter().map(|(decls, _)| decls).collect();
        stats.declarations = declarations_by_file.iter().map(|d| d.len()).sum();
        stats.excluded_unknown_specifiers = excluded_unknown.load(Ordering::Relaxed);

        // Phase 2, step B: variable analysis + call resolution per file.
        let per_file_relationships: Vec<Vec<Relationship>> = pool.install(|| {
            parsed_files
                .par_iter()
                .zip(declarations_by_file.par_iter())
                .map(|(file, decls)| {
                    resolve_calls_for_file(file, decls, &import_maps[&file.module_qn], &superclass_chain, &registry)
                })
                .collect()
        });

        for relationships in per_file_relationships {
            stats.relationships += relationships.len();
            stats.unresolved_calls += relationships.iter().filter(|r| r.unresolved).count();
            sink.ensure_relationship_batch(&relationships);
        }

        sink.flush();
        stats.elapsed = started.elapsed();
        Ok(stats)
    }
}

fn emit_structural(
    file: &ParsedFile,
    decls: &[Declaration],
    unresolved_raw: &[Option<String>],
    sink: &mut dyn GraphSink,
) {
    sink.ensure_node_batch(&[(&file.module_qn, NodeKind::Module, NodeProps::new())]);

    let node_refs: Vec<(&Qn, NodeKind, NodeProps)> = decls
        .iter()
        .map(|d| (&d.qn, d.kind, declaration_props(d)))
        .collect();
    sink.ensure_node_batch(&node_refs);

    let mut relationships = Vec::new();
    for (decl, fallback) in decls.iter().zip(unresolved_raw) {
        let parent = parent_qn(&decl.qn).unwrap_or_else(|| file.module_qn.clone());
        relationships.push(contains_edge(decl, &parent));
        relationships.extend(declaration_relationships(decl));
        if let Some(raw) = fallback {
            relationships.push(Relationship::unresolved(
                decl.qn.clone(),
                RelKind::Inherits,
                Qn::new(raw.clone()),
            ));
        }
    }
    sink.ensure_relationship_batch(&relationships);
}

fn resolve_calls_for_file(
    file: &ParsedFile,
    decls: &[Declaration],
    import_map: &ImportMap,
    superclass_chain: &DashMap<Qn, Qn>,
    registry: &Registry,
) -> Vec<Relationship> {
    let mut extractor = new_extractor(file.language);
    let calls = extractor.extract_calls(&file.tree, &file.source);

    let callables: Vec<&Declaration> = decls.iter().filter(|d| d.is_callable()).collect();
    let mut relationships = Vec::new();

    let chain_view: HashMap<Qn, Qn> = superclass_chain
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();

    for call in &calls {
        let Some(owner) = callables
            .iter()
            .filter(|d| d.range.contains(call.range.start_line, call.range.start_column))
            .min_by_key(|d| {
                (d.range.end_line as i64 - d.range.start_line as i64) * 10_000
                    + (d.range.end_column as i64 - d.range.start_column as i64)
            })
        else {
            continue;
        };

        let Some(owner_node) = find_node_by_range(&file.tree, owner.range) else {
            continue;
        };
        let enclosing_class_qn = parent_qn(&owner.qn).filter(|_| owner.kind == NodeKind::Method);
        let class_node = find_enclosing_class_node(owner_node);

        let variable_types = build_variable_type_map(
            owner_node,
            class_node,
            &file.source,
            &file.module_qn,
            import_map,
            registry,
        );

        let resolved = resolve_call(
            call,
            &variable_types,
            enclosing_class_qn.as_ref(),
            &file.module_qn,
            import_map,
            &chain_view as &dyn SuperclassChain,
            registry,
        );

        relationships.push(match resolved {
            ResolvedCall::Resolved { target } => {
                Relationship::new(owner.qn.clone(), RelKind::Calls, target)
            }
            ResolvedCall::Unresolved { raw_text } => {
                Relationship::unresolved(owner.qn.clone(), RelKind::Calls, Qn::new(raw_text))
            }
        });
    }

    relationships
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::InMemorySink;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_module_qn_derivation() {
        let root = Path::new("/repo/src");
        let path = Path::new("/repo/src/app/util/Helper.kt");
        assert_eq!(module_qn_for(root, path).as_str(), "app.util.Helper");
    }

    #[test]
    fn test_pipeline_indexes_simple_class_hierarchy() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Zoo.kt"),
            "open class Animal { open fun speak() {} }\n\
             class Dog : Animal() { fun bark() { this.speak() } }",
        )
        .unwrap();

        let settings = Settings::default();
        let pipeline = Pipeline::new(&settings);
        let mut sink = InMemorySink::new();
        let stats = pipeline.run(dir.path(), &mut sink).unwrap();

        assert_eq!(stats.files_parsed, 1);
        assert!(sink.relationships().any(|r| r.kind == RelKind::Inherits
            && r.from.as_str() == "Zoo.Dog"
            && r.to.as_str() == "Zoo.Animal"));
        assert!(sink.relationships().any(|r| r.kind == RelKind::Calls
            && r.from.as_str() == "Zoo.Dog.bark"
            && r.to.as_str() == "Zoo.Animal.speak"));
    }
}
