//! Record structures produced by extraction and consumed by the report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// A function or method with its call list and metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Qualified name: `package.Func` or `package.Receiver.Method`.
    #[serde(rename = "caller")]
    pub qualified_name: String,
    /// Callee names as written: bare identifiers or rendered selectors.
    pub callees: Vec<String>,
    pub file: String,
    pub package: String,
    /// Rendered parameter types, one per declared parameter.
    pub params: Vec<String>,
    /// Rendered result types.
    pub returns: Vec<String>,
    pub is_method: bool,
    /// Receiver struct name for methods, empty otherwise.
    #[serde(rename = "struct")]
    pub receiver_struct: String,
    pub is_recursive: bool,
    pub is_duplicate: bool,
    pub cyclomatic_complexity: u32,
    pub lines_of_code: u32,
    pub referenced_globals: Vec<String>,
    pub dependencies: Vec<String>,
    pub metrics: Metrics,

    /// Bare function name.
    #[serde(skip)]
    pub name: String,
    /// Line of the declaration.
    #[serde(skip)]
    pub line: usize,
    /// Canonical body token stream, `None` when the function has no body.
    #[serde(skip)]
    pub fingerprint: Option<String>,
}

impl FunctionRecord {
    /// Whether the bare name is exported (capitalized initial).
    pub fn is_exported(&self) -> bool {
        is_exported_name(&self.name)
    }

    /// Sync the top-level copies of metrics fields with the metrics block.
    pub fn sync_metrics(&mut self) {
        self.cyclomatic_complexity = self.metrics.cyclomatic_complexity;
        self.lines_of_code = self.metrics.lines_of_code;
        self.is_duplicate = self.metrics.is_duplicate;
    }
}

impl fmt::Display for FunctionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.qualified_name, self.file, self.line)
    }
}

/// Whether a Go identifier is exported.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// A struct type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructRecord {
    pub name: String,
    pub file: String,
    pub package: String,
}

/// An interface type declaration with its named methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub file: String,
    pub package: String,
    pub methods: Vec<String>,
}

/// A package-level variable or constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRecord {
    pub name: String,
    /// Rendered declared type, empty when inferred.
    #[serde(rename = "type")]
    pub ty: String,
    /// Rendered initializer, empty when absent.
    pub value: String,
    pub file: String,
    pub package: String,
}

/// An import of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub path: String,
    pub file: String,
    pub package: String,
}

/// A struct whose method set covers an interface.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImplementsRecord {
    #[serde(rename = "struct")]
    pub struct_name: String,
    pub interface: String,
}

/// Why a file could not be analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    Io,
    Parse,
}

impl FileErrorKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileErrorKind::Io => "io",
            FileErrorKind::Parse => "parse",
        }
    }
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recoverable per-file failure surfaced alongside the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: String,
    pub kind: FileErrorKind,
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.file, self.kind, self.message)
    }
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    /// Path relative to the scan root.
    pub path: String,
    pub package: String,
    pub functions: Vec<FunctionRecord>,
    pub structs: Vec<StructRecord>,
    pub interfaces: Vec<InterfaceRecord>,
    pub globals: Vec<GlobalRecord>,
    pub imports: Vec<ImportRecord>,
    /// Method names declared per receiver struct, for implements inference.
    pub methods_by_struct: Vec<(String, String)>,
}

/// Result of analyzing a whole tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub functions: Vec<FunctionRecord>,
    pub structs: Vec<StructRecord>,
    pub interfaces: Vec<InterfaceRecord>,
    pub globals: Vec<GlobalRecord>,
    pub imports: Vec<ImportRecord>,
    pub implements: Vec<ImplementsRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}

impl AnalysisReport {
    /// Find a function by qualified name.
    pub fn function(&self, qualified_name: &str) -> Option<&FunctionRecord> {
        self.functions
            .iter()
            .find(|f| f.qualified_name == qualified_name)
    }

    /// Qualified names of functions flagged unused.
    pub fn unused_functions(&self) -> Vec<&str> {
        self.functions
            .iter()
            .filter(|f| f.metrics.is_unused)
            .map(|f| f.qualified_name.as_str())
            .collect()
    }

    /// Sort every collection so repeated runs compare equal.
    pub fn sort(&mut self) {
        self.functions
            .sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name).then(a.file.cmp(&b.file)));
        self.structs
            .sort_by(|a, b| (&a.file, &a.name).cmp(&(&b.file, &b.name)));
        self.interfaces
            .sort_by(|a, b| (&a.file, &a.name).cmp(&(&b.file, &b.name)));
        self.globals
            .sort_by(|a, b| (&a.file, &a.name).cmp(&(&b.file, &b.name)));
        self.imports
            .sort_by(|a, b| (&a.file, &a.path).cmp(&(&b.file, &b.path)));
        self.implements.sort();
        self.implements.dedup();
        self.errors.sort_by(|a, b| a.file.cmp(&b.file));
    }
}
