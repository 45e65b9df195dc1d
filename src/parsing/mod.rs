//! Parsing layer: language detection, the Parser Facade, the AST Cache,
//! the Import Processor, the shared Declaration Extractor trait, and call
//! site data (§4.1, §4.3, §4.4).

pub mod cache;
pub mod facade;
pub mod import;
pub mod language;
pub mod method_call;
pub mod parser;

pub use cache::{AstCache, CachedFile};
pub use facade::ParserFacade;
pub use import::{Import, ImportCache, ImportMap};
pub use language::Language;
pub use method_call::MethodCall;
pub use parser::{
    check_recursion_depth, safe_substring_window, safe_truncate_str, truncate_for_display,
    HandledNode, LanguageParser, NodeTracker, NodeTrackingState, ParserFactory, MAX_AST_DEPTH,
};
