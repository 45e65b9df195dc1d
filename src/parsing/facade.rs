//! Parser Facade (§4.1): thread-local, per-language `tree_sitter::Parser`
//! instances (a `Parser` is not `Sync`), used by Phase 1's rayon fan-out to
//! turn a file on disk into a `Tree` without a global lock.

use crate::error::{PipelineError, Result};
use crate::parsing::Language;
use std::cell::RefCell;
use std::path::Path;
use tree_sitter::{Parser, Tree};

thread_local! {
    static KOTLIN_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
    static JAVA_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

fn with_parser<F, R>(language: Language, f: F) -> R
where
    F: FnOnce(&mut Parser) -> R,
{
    let cell = match language {
        Language::Kotlin => &KOTLIN_PARSER,
        Language::Java => &JAVA_PARSER,
    };
    cell.with(|slot| {
        let mut slot = slot.borrow_mut();
        let parser = slot.get_or_insert_with(|| {
            let mut parser = Parser::new();
            let ts_language = match language {
                Language::Kotlin => tree_sitter_kotlin_codanna::LANGUAGE.into(),
                Language::Java => tree_sitter_java::LANGUAGE.into(),
            };
            parser
                .set_language(&ts_language)
                .expect("bundled tree-sitter grammar is ABI-compatible");
            parser
        });
        f(parser)
    })
}

/// Parses a single file's source text into a `Tree`, using the worker
/// thread's own parser instance for the detected `Language`.
pub struct ParserFacade;

impl ParserFacade {
    /// Detect the language from `path`'s extension, read its contents, and
    /// parse. Returns `PipelineError::UnsupportedFileType` for anything not
    /// covered by [`Language::from_path`] and `PipelineError::Parse` if
    /// tree-sitter fails to produce a tree at all (malformed encoding).
    pub fn parse_file(path: &Path) -> Result<(Tree, String, Language)> {
        let language = Language::from_path(path).ok_or_else(|| {
            PipelineError::UnsupportedFileType {
                path: path.to_path_buf(),
                extension: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            }
        })?;
        let source = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = Self::parse_str(&source, language, path)?;
        Ok((tree, source, language))
    }

    pub fn parse_str(source: &str, language: Language, path: &Path) -> Result<Tree> {
        with_parser(language, |parser| parser.parse(source, None)).ok_or_else(|| {
            PipelineError::Parse {
                path: path.to_path_buf(),
                language: language.name().to_string(),
                reason: "tree-sitter returned no tree".to_string(),
            }
        })
    }
}
