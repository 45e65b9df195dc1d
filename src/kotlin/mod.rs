//! Kotlin language support: the full Declaration Extractor, Type Resolver,
//! and Variable Analyzer triad (§4.4-§4.6).

pub mod extractor;
pub mod resolver;
pub mod variables;

pub use extractor::{KotlinExtractor, KotlinParserFactory};
