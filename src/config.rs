//! Configuration module for the knowledge-graph pipeline.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CKG_` and use double
//! underscores to separate nested levels:
//! - `CKG_INDEXING__PARALLEL_THREADS=8` sets `indexing.parallel_threads`
//! - `CKG_LANGUAGES__KOTLIN__ENABLED=false` sets `languages.kotlin.enabled`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Language-specific settings, keyed by `Language::config_key()`.
    #[serde(default = "default_languages")]
    pub languages: HashMap<String, LanguageConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Number of worker threads used for both Phase 1 and Phase 2.
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Additional glob patterns to ignore, beyond VCS metadata directories.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Emit an `indicatif` progress bar while walking/indexing.
    #[serde(default = "default_false")]
    pub progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub extensions: Vec<String>,
}

fn default_version() -> u32 {
    1
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_ignore_patterns() -> Vec<String> {
    vec![
        ".git/**".to_string(),
        ".hg/**".to_string(),
        ".svn/**".to_string(),
        "build/**".to_string(),
        ".gradle/**".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            indexing: IndexingConfig::default(),
            languages: default_languages(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            ignore_patterns: default_ignore_patterns(),
            progress: false,
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut langs = HashMap::new();

    langs.insert(
        "kotlin".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["kt".to_string(), "kts".to_string()],
        },
    );

    langs.insert(
        "java".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["java".to_string()],
        },
    );

    langs
}

impl Settings {
    /// Load configuration from defaults, an optional `codanna-kgraph.toml`
    /// in the current directory, and `CKG_`-prefixed environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("codanna-kgraph.toml")
    }

    /// Load configuration from a specific file path (used by `check-config
    /// --path` and by tests).
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CKG_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.indexing.parallel_threads > 0);
        assert!(settings.languages.contains_key("kotlin"));
        assert!(settings.languages.contains_key("java"));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[indexing]
parallel_threads = 4
ignore_patterns = ["custom/**"]
progress = true

[languages.java]
enabled = false
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.indexing.parallel_threads, 4);
        assert_eq!(settings.indexing.ignore_patterns, vec!["custom/**"]);
        assert!(settings.indexing.progress);
        assert!(!settings.languages["java"].enabled);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
[indexing]
parallel_threads = 16
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();

        assert_eq!(settings.indexing.parallel_threads, 16);
        assert_eq!(settings.version, 1);
        assert!(settings.languages["kotlin"].enabled);
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[indexing]\nparallel_threads = 4\n").unwrap();

        unsafe {
            std::env::set_var("CKG_INDEXING__PARALLEL_THREADS", "9");
        }

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.indexing.parallel_threads, 9);

        unsafe {
            std::env::remove_var("CKG_INDEXING__PARALLEL_THREADS");
        }
    }
}
