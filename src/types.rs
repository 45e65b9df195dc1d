//! Core identity and position types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dot-separated qualified name: the sole identity for graph nodes.
///
/// Constructed from a module path plus nested declaration names; QNs are
/// deterministic and stable across runs of the same repository (§3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qn(String);

impl Qn {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a child QN by appending a simple name under this one.
    pub fn child(&self, simple_name: &str) -> Self {
        Self(format!("{}.{}", self.0, simple_name))
    }

    /// True if `self` is equal to `prefix` or starts with `prefix + "."`.
    pub fn starts_with_prefix(&self, prefix: &str) -> bool {
        self.0 == prefix || self.0.starts_with(&format!("{prefix}."))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Qn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Qn {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Qn {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Closed set of node kinds a declaration can be assigned (§3). Assigned
/// once at declaration time in Phase 1 and never changed afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Module,
    Class,
    Interface,
    Enum,
    Object,
    TypeAlias,
    Union,
    Function,
    Method,
    Field,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Module => "MODULE",
            NodeKind::Class => "CLASS",
            NodeKind::Interface => "INTERFACE",
            NodeKind::Enum => "ENUM",
            NodeKind::Object => "OBJECT",
            NodeKind::TypeAlias => "TYPE_ALIAS",
            NodeKind::Union => "UNION",
            NodeKind::Function => "FUNCTION",
            NodeKind::Method => "METHOD",
            NodeKind::Field => "FIELD",
        };
        write!(f, "{s}")
    }
}

impl NodeKind {
    /// The kind the Symbol Registry should record for this surface kind.
    /// OBJECT is retained as a distinct surface tag on the declaration but
    /// registered as CLASS (§4.4), since an object can be a superclass or
    /// interface-implementer target just like a class.
    pub fn registry_kind(self) -> NodeKind {
        match self {
            NodeKind::Object => NodeKind::Class,
            other => other,
        }
    }
}

/// A 1-indexed file identifier, stable for the lifetime of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(std::num::NonZeroU32);

impl FileId {
    pub fn new(value: u32) -> Option<Self> {
        std::num::NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

/// A byte/line/column span within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start_line: u32,
    pub start_column: u16,
    pub end_line: u32,
    pub end_column: u16,
}

impl Range {
    pub fn new(start_line: u32, start_column: u16, end_line: u32, end_column: u16) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn contains(&self, line: u32, column: u16) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && column < self.start_column {
            return false;
        }
        if line == self.end_line && column > self.end_column {
            return false;
        }
        true
    }
}

pub type CompactString = Box<str>;

pub fn compact_string(s: &str) -> CompactString {
    s.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qn_child_and_prefix() {
        let module = Qn::new("app.util");
        let class = module.child("Helper");
        assert_eq!(class.as_str(), "app.util.Helper");
        assert!(class.starts_with_prefix("app.util"));
        assert!(class.starts_with_prefix("app.util.Helper"));
        assert!(!class.starts_with_prefix("app.utility"));
    }

    #[test]
    fn test_node_kind_registry_kind() {
        assert_eq!(NodeKind::Object.registry_kind(), NodeKind::Class);
        assert_eq!(NodeKind::Class.registry_kind(), NodeKind::Class);
        assert_eq!(NodeKind::Interface.registry_kind(), NodeKind::Interface);
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(10, 5, 15, 20);
        assert!(range.contains(12, 10));
        assert!(range.contains(10, 5));
        assert!(range.contains(15, 20));
        assert!(!range.contains(9, 10));
        assert!(!range.contains(16, 10));
        assert!(!range.contains(10, 4));
        assert!(!range.contains(15, 21));
    }

    #[test]
    fn test_file_id() {
        assert!(FileId::new(0).is_none());
        let id = FileId::new(7).unwrap();
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn test_compact_string() {
        let s = compact_string("hello");
        assert_eq!(&*s, "hello");
    }
}
