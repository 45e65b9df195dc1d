pub mod cli;
pub mod config;
pub mod declaration;
pub mod emit;
pub mod error;
pub mod java;
pub mod kotlin;
pub mod logging;
pub mod parsing;
pub mod pipeline;
pub mod registry;
pub mod relationship;
pub mod resolution;
pub mod types;

pub use config::Settings;
pub use declaration::{CallableType, Declaration, Parameter, TokenList};
pub use emit::{GraphSink, InMemorySink, LoggingSink, NodeProps};
pub use error::{ErrorContext, PipelineError, Result};
pub use parsing::{Import, ImportCache, ImportMap, Language, LanguageParser, ParserFacade};
pub use pipeline::{IndexingStats, Pipeline};
pub use registry::{Registry, RegistryBuilder, SymbolRegistry};
pub use relationship::{RelKind, Relationship};
pub use resolution::{resolve_call, ResolvedCall};
pub use types::{CompactString, FileId, NodeKind, Qn, Range};
