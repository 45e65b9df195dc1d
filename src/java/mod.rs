//! Java language support: a thinner sibling to the Kotlin bundle (§4.4a).
//! Java reuses the Kotlin Type Resolver's cascade and the shared call
//! resolver; only declaration extraction needs a language-specific
//! implementation since Java's grammar has no aliased node kinds.

pub mod extractor;

pub use extractor::{JavaExtractor, JavaParserFactory};
