//! Language detection and enumeration, restricted to the JVM family the
//! spec covers in full (§1: "language front-ends other than the JVM
//! family ... are parallel implementations of the same contracts").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Kotlin,
    Java,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "kt" | "kts" => Some(Language::Kotlin),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Kotlin => &["kt", "kts"],
            Language::Java => &["java"],
        }
    }

    pub fn config_key(&self) -> &str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Java => "java",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Language::Kotlin => "Kotlin",
            Language::Java => "Java",
        }
    }

    /// The implicit supertype used when no declared or inferable type
    /// exists (GLOSSARY: "Top type").
    pub fn top_type(&self) -> &str {
        match self {
            Language::Kotlin => "Any",
            Language::Java => "Object",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("kt"), Some(Language::Kotlin));
        assert_eq!(Language::from_extension("KT"), Some(Language::Kotlin));
        assert_eq!(Language::from_extension("kts"), Some(Language::Kotlin));
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("txt"), None);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("src/Main.kt")),
            Some(Language::Kotlin)
        );
        assert_eq!(
            Language::from_path(Path::new("src/Main.java")),
            Some(Language::Java)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn test_top_type() {
        assert_eq!(Language::Kotlin.top_type(), "Any");
        assert_eq!(Language::Java.top_type(), "Object");
    }
}
