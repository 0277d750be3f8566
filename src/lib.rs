//! Codescan - source-code intelligence for Go trees.
//!
//! Codescan walks a directory, extracts functions, structs, interfaces,
//! globals and imports from every Go file, computes per-function metrics,
//! and links everything into a call graph to flag recursion, duplicates
//! and dead code.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter front-end, lowering, extraction and records
//! - `metrics`: complexity, Halstead and maintainability computations
//! - `graph`: call graph, recursion (SCC) and reachability passes
//! - `scan`: file discovery and the concurrent `Analyzer`
//! - `summary`: aggregate `CodeSummary` over a report
//! - `report`: output formatting (pretty, JSON)
//! - `config`: YAML configuration
//!
//! # Example
//!
//! ```no_run
//! use codescan::{summarize, Analyzer, AnalyzerConfig};
//!
//! let analyzer = Analyzer::new(AnalyzerConfig::default())?;
//! let report = analyzer.analyze("path/to/project")?;
//! let summary = summarize(&report);
//! println!("{} functions, {} unused", summary.total_functions, summary.unused_functions);
//! # Ok::<(), codescan::AnalysisError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod report;
pub mod scan;
pub mod summary;

pub use analysis::{
    AnalysisReport, FileError, FileErrorKind, FunctionRecord, GlobalRecord, ImplementsRecord,
    ImportRecord, InterfaceRecord, StructRecord,
};
pub use config::{AnalyzerConfig, ErrorPolicy};
pub use error::AnalysisError;
pub use metrics::Metrics;
pub use scan::Analyzer;
pub use summary::{summarize, CodeSummary, Hotspot};
