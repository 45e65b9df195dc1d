//! File Walker (§2, §6): an `ignore`-based directory walk, filtered to the
//! extensions of enabled languages, with VCS/build-output exclusion
//! layered on top of `.gitignore` semantics.

use crate::config::Settings;
use crate::error::{PipelineError, Result};
use crate::parsing::Language;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walks `root`, returning every file whose extension matches an enabled
/// language, honoring `.gitignore` plus the configured extra ignore
/// patterns.
pub fn walk_source_files(root: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true).git_global(true);

    let mut override_builder = ignore::overrides::OverrideBuilder::new(root);
    for pattern in &settings.indexing.ignore_patterns {
        override_builder
            .add(&format!("!{pattern}"))
            .map_err(PipelineError::Walk)?;
    }
    let overrides = override_builder.build().map_err(PipelineError::Walk)?;
    builder.overrides(overrides);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(PipelineError::Walk)?;
        let path = entry.path();
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(language) = Language::from_path(path) else {
            continue;
        };
        if settings
            .languages
            .get(language.config_key())
            .is_some_and(|cfg| cfg.enabled)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
