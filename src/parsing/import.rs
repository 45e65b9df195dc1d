//! Import Processor (§4.3): per-module identifier → QN mapping, with
//! wildcard and alias forms, plus JVM primitive/wrapper pre-population.

use crate::parsing::Language;
use crate::types::Qn;
use std::collections::HashMap;

/// A single parsed import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The dotted path being imported, e.g. `a.b.C` or `a.b.*`.
    pub path: String,
    /// `Some(alias)` for `import a.b.C as D`.
    pub alias: Option<String>,
    pub is_wildcard: bool,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            is_wildcard: false,
        }
    }

    pub fn wildcard(prefix: impl Into<String>) -> Self {
        Self {
            path: prefix.into(),
            alias: None,
            is_wildcard: true,
        }
    }

    pub fn aliased(path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: Some(alias.into()),
            is_wildcard: false,
        }
    }
}

/// identifier → QN for one module, including the two special key shapes
/// from §4.3: `"*<prefix>"` for wildcards, and `alias → target` for
/// aliased imports.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    entries: HashMap<String, String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(|s| s.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// All wildcard prefixes (values of `"*<prefix>"` keys), used by the
    /// Call Resolver (§4.7 step 3) and Type Resolver.
    pub fn wildcard_prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with('*'))
            .map(|(_, v)| v.as_str())
    }

    /// Build the import map for one module from its parsed imports,
    /// pre-populated with JVM primitive/wrapper names for JVM languages
    /// (§4.3).
    pub fn build(language: Language, imports: &[Import]) -> Self {
        let mut map = Self::new();
        if matches!(language, Language::Kotlin | Language::Java) {
            prepopulate_jvm_primitives(&mut map);
        }
        for import in imports {
            if import.is_wildcard {
                map.insert(format!("*{}", import.path), import.path.clone());
                continue;
            }
            let simple_name = import.path.rsplit('.').next().unwrap_or(&import.path);
            let key = import.alias.clone().unwrap_or_else(|| simple_name.to_string());
            map.insert(key, import.path.clone());
        }
        map
    }
}

/// Kotlin/Java primitive and wrapper type names that resolve without an
/// explicit import (§4.3).
pub const JVM_PRIMITIVES: &[&str] = &[
    "Int", "Long", "Double", "Float", "Boolean", "Char", "Byte", "Short", "Unit",
    "int", "long", "double", "float", "boolean", "char", "byte", "short", "void",
];

pub const JVM_WRAPPERS: &[&str] = &["String", "Any", "Object", "Number"];

fn prepopulate_jvm_primitives(map: &mut ImportMap) {
    for name in JVM_PRIMITIVES {
        map.insert(*name, *name);
    }
    for name in JVM_WRAPPERS {
        map.insert(*name, *name);
    }
}

/// Per-run, per-module memoization of built import maps (§3: "Import
/// mappings ... are memoized per module").
#[derive(Default)]
pub struct ImportCache {
    cache: dashmap::DashMap<Qn, std::sync::Arc<ImportMap>>,
}

impl ImportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        module_qn: &Qn,
        language: Language,
        imports: &[Import],
    ) -> std::sync::Arc<ImportMap> {
        if let Some(existing) = self.cache.get(module_qn) {
            return existing.clone();
        }
        let built = std::sync::Arc::new(ImportMap::build(language, imports));
        self.cache.insert(module_qn.clone(), built.clone());
        built
    }
}
