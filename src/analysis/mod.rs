//! Syntax-driven entity extraction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ Front-end    │────▶│ SourceFile    │
//! └─────────────────┘     │ (tree-sitter)│     │ (syntax tree) │
//!                         └──────────────┘     └───────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌───────────────┐
//!                         │ FileFacts    │◀────│EntityExtractor│
//!                         │ (records)    │     │ + type cache  │
//!                         └──────────────┘     └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `LanguageFrontend` trait, lowering into `syntax` types
//! 3. Register the front-end in `languages/mod.rs`

mod duplicate;
mod extract;
mod facts;
mod languages;
pub mod syntax;
mod traits;
mod type_cache;

pub use duplicate::{canonicalize, rolling_hash, DuplicateDetector};
pub use extract::EntityExtractor;
pub use facts::{
    is_exported_name, AnalysisReport, FileError, FileErrorKind, FileFacts, FunctionRecord,
    GlobalRecord, ImplementsRecord, ImportRecord, InterfaceRecord, StructRecord,
};
pub use languages::{get_frontend, register_frontends, GoFrontend};
pub use syntax::Span;
pub use traits::{LanguageFrontend, ParsedFile};
pub use type_cache::{TypeStringCache, DEFAULT_CAPACITY};
