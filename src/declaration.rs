//! The Declaration record: the unit produced by a Declaration Extractor and
//! consumed by the Symbol Registry, Type Resolver, Variable Analyzer and
//! Graph Emitter (§3).

use crate::parsing::Language;
use crate::types::{CompactString, FileId, NodeKind, Qn, Range, compact_string};
use serde::{Deserialize, Serialize};

/// Whether a METHOD-kind declaration is a plain method or a constructor
/// (§4.4: "Constructors are tagged as callables of kind METHOD with a
/// distinguished callable_type = constructor").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallableType {
    Plain,
    Constructor,
}

/// An ordered, duplicate-preserving-first-occurrence set of string tokens.
/// Used for both `modifiers` and `annotations` (§3), which the spec
/// describes as a set but whose source order matters for deterministic
/// re-emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenList(Vec<CompactString>);

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_unique(&mut self, token: &str) {
        if !self.0.iter().any(|t| t.as_ref() == token) {
            self.0.push(compact_string(token));
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t.as_ref() == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single formal parameter's resolved type (§4.4: "the recorded
/// parameter type is the language's top type" when unannotated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: CompactString,
    pub type_name: CompactString,
}

/// A declaration produced by a language's Declaration Extractor.
///
/// Superclass/interfaces are resolved lazily in Phase 2 by the Type
/// Resolver; in Phase 1 only `raw_delegations` is populated for
/// class-like declarations whose delegation list cannot yet be split
/// (§4.4, Design Notes §9: the extractor never emits INHERITS/IMPLEMENTS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub qn: Qn,
    pub simple_name: CompactString,
    pub kind: NodeKind,
    pub language: Language,
    pub file_id: FileId,
    pub range: Range,

    pub superclass: Option<Qn>,
    pub interfaces: Vec<Qn>,
    /// Verbatim delegation-specifier texts captured in Phase 1, consumed
    /// only by the Type Resolver (§4.4, §4.5).
    pub raw_delegations: Vec<CompactString>,

    pub modifiers: TokenList,
    pub annotations: TokenList,
    pub type_parameters: Vec<CompactString>,

    /// Set for FUNCTION/METHOD declarations.
    pub parameters: Vec<Parameter>,
    pub return_type: Option<CompactString>,
    pub callable_type: Option<CallableType>,

    /// Set for FIELD declarations.
    pub declared_type: Option<CompactString>,
}

impl Declaration {
    pub fn new(
        qn: Qn,
        simple_name: impl Into<CompactString>,
        kind: NodeKind,
        language: Language,
        file_id: FileId,
        range: Range,
    ) -> Self {
        Self {
            qn,
            simple_name: simple_name.into(),
            kind,
            language,
            file_id,
            range,
            superclass: None,
            interfaces: Vec::new(),
            raw_delegations: Vec::new(),
            modifiers: TokenList::new(),
            annotations: TokenList::new(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            callable_type: None,
            declared_type: None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, NodeKind::Function | NodeKind::Method)
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.callable_type, Some(CallableType::Constructor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_list_dedup_preserves_first_occurrence() {
        let mut tokens = TokenList::new();
        tokens.push_unique("open");
        tokens.push_unique("data");
        tokens.push_unique("open");
        assert_eq!(tokens.iter().collect::<Vec<_>>(), vec!["open", "data"]);
    }

    #[test]
    fn test_declaration_constructor_tag() {
        let decl = Declaration::new(
            Qn::new("app.Foo"),
            "Foo",
            NodeKind::Class,
            Language::Kotlin,
            FileId::new(1).unwrap(),
            Range::new(1, 0, 10, 1),
        );
        assert!(!decl.is_constructor());
        assert!(!decl.is_callable());
    }
}
