//! Concurrent scan of a source tree.
//!
//! Every file is read, parsed, lowered, extracted and measured independently
//! on the rayon pool. Once all workers have joined, a single-threaded fan-in
//! marks duplicates (in path order, so "first occurrence" is stable),
//! finalizes maintainability, builds the call graph and runs the recursion,
//! dead-code and implements passes.

mod files;

pub use files::{collect_files, relative_path, FileFilter};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::{
    get_frontend, register_frontends, AnalysisReport, DuplicateDetector, EntityExtractor,
    FileError, FileFacts, TypeStringCache,
};
use crate::config::{AnalyzerConfig, ErrorPolicy};
use crate::error::AnalysisError;
use crate::graph::{infer_implements, CallGraph, MethodSets};
use crate::metrics::finalize_maintainability;

/// Result of analyzing one file.
struct FileOutcome {
    facts: Option<FileFacts>,
    error: Option<FileError>,
}

/// The analysis engine: `analyze(root)` produces an [`AnalysisReport`].
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer, rejecting invalid configuration.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        config.validate().map_err(|e| AnalysisError::Config {
            path: PathBuf::from("<config>"),
            message: e.to_string(),
        })?;
        register_frontends();
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze every source file under `root`.
    pub fn analyze<P: AsRef<Path>>(&self, root: P) -> Result<AnalysisReport, AnalysisError> {
        let root = root.as_ref();
        let config_error = |message: String| AnalysisError::Config {
            path: PathBuf::from("<config>"),
            message,
        };

        let excluded = self
            .config
            .excluded_matcher()
            .map_err(|e| config_error(e.to_string()))?;
        let files = collect_files(
            root,
            &FileFilter {
                include_test_files: self.config.include_test_files,
                excluded: &excluded,
            },
        )?;
        self.check_frontends(&files)?;

        info!(root = %root.display(), files = files.len(), "scan started");

        let cache = TypeStringCache::with_capacity(self.config.type_cache_capacity);
        let outcomes = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| config_error(e.to_string()))?
                .install(|| self.scan_files(root, &files, &cache)),
            None => self.scan_files(root, &files, &cache),
        }?;

        let report = merge(outcomes, &self.config.entry_points);
        info!(
            functions = report.functions.len(),
            structs = report.structs.len(),
            interfaces = report.interfaces.len(),
            errors = report.errors.len(),
            cached_types = cache.len(),
            "scan complete"
        );
        Ok(report)
    }

    /// Make sure every needed grammar loads before fanning out.
    fn check_frontends(&self, files: &[PathBuf]) -> Result<(), AnalysisError> {
        let extensions: BTreeSet<&str> = files
            .iter()
            .filter_map(|f| f.extension().and_then(|e| e.to_str()))
            .collect();
        for ext in extensions {
            if let Some(frontend) = get_frontend(ext) {
                frontend
                    .create_parser()
                    .map_err(|e| AnalysisError::Frontend {
                        language: frontend.language_id().to_string(),
                        message: e.to_string(),
                    })?;
            }
        }
        Ok(())
    }

    /// Fan out over files. Results keep the input (path) order.
    fn scan_files(
        &self,
        root: &Path,
        files: &[PathBuf],
        cache: &TypeStringCache,
    ) -> Result<Vec<FileOutcome>, AnalysisError> {
        let analyze = |path: &PathBuf| {
            let rel = relative_path(root, path);
            self.analyze_file(path, &rel, cache).or_else(|err| {
                warn!(file = %rel, error = %err, "skipping file");
                match (self.config.error_policy, err.to_file_error(&rel)) {
                    (ErrorPolicy::Continue, Some(error)) => Ok(FileOutcome {
                        facts: None,
                        error: Some(error),
                    }),
                    _ => Err(err),
                }
            })
        };

        match self.config.error_policy {
            // Short-circuits: remaining files are abandoned on the first error.
            ErrorPolicy::FailFast => files.par_iter().map(analyze).collect(),
            ErrorPolicy::Continue => {
                let results: Vec<_> = files.par_iter().map(analyze).collect();
                results.into_iter().collect()
            }
        }
    }

    fn analyze_file(
        &self,
        path: &Path,
        rel: &str,
        cache: &TypeStringCache,
    ) -> Result<FileOutcome, AnalysisError> {
        let parse_error = |message: String| AnalysisError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let frontend = get_frontend(ext)
            .ok_or_else(|| parse_error(format!("no front-end for extension {:?}", ext)))?;

        let source = fs::read(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = frontend
            .parse(path, &source)
            .map_err(|e| parse_error(e.to_string()))?;

        let syntax_error = parsed.first_error().map(|(line, col)| {
            parse_error(format!("syntax error at {}:{}", line, col))
        });
        let error = match syntax_error {
            Some(err) if !self.config.accept_partial_parses => return Err(err),
            Some(err) => {
                warn!(file = %rel, error = %err, "keeping partially parsed file");
                err.to_file_error(rel)
            }
            None => None,
        };

        let file = frontend
            .lower(&parsed)
            .map_err(|e| parse_error(e.to_string()))?;
        let facts = EntityExtractor::new(cache).extract(&file, rel);
        debug!(file = %rel, functions = facts.functions.len(), "file analyzed");

        Ok(FileOutcome {
            facts: Some(facts),
            error,
        })
    }
}

/// Single-threaded fan-in over per-file results in path order.
fn merge(outcomes: Vec<FileOutcome>, entry_points: &[String]) -> AnalysisReport {
    let mut report = AnalysisReport::default();
    let mut methods = MethodSets::new();
    let mut detector = DuplicateDetector::new();

    for outcome in outcomes {
        if let Some(error) = outcome.error {
            report.errors.push(error);
        }
        let Some(facts) = outcome.facts else {
            continue;
        };

        for (receiver, method) in facts.methods_by_struct {
            methods
                .entry((facts.package.clone(), receiver))
                .or_default()
                .insert(method);
        }

        for mut func in facts.functions {
            if let Some(fingerprint) = &func.fingerprint {
                func.metrics.is_duplicate = detector.check(fingerprint);
            }
            func.sync_metrics();
            // Zeroed metrics stay zeroed, maintainability included.
            if func.metrics.is_measured() {
                finalize_maintainability(&mut func.metrics);
            }
            report.functions.push(func);
        }
        report.structs.extend(facts.structs);
        report.interfaces.extend(facts.interfaces);
        report.globals.extend(facts.globals);
        report.imports.extend(facts.imports);
    }

    let graph = CallGraph::build(&report.functions);
    graph.mark_recursion(&mut report.functions);
    graph.mark_unused(&mut report.functions, entry_points);

    report.implements = infer_implements(&report.structs, &report.interfaces, &methods);
    report.sort();
    report
}
