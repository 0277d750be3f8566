//! Aggregate view over an [`AnalysisReport`].

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisReport, FunctionRecord};

/// Cyclomatic complexity at or below which a function is `Low`.
pub const LOW_COMPLEXITY_MAX: u32 = 5;
/// Cyclomatic complexity at or below which a function is `Medium`.
pub const MEDIUM_COMPLEXITY_MAX: u32 = 10;

const HOTSPOT_COMPLEXITY: u32 = 10;
const HOTSPOT_NESTING: u32 = 4;
const HOTSPOT_MAINTAINABILITY: f64 = 50.0;
const HIGH_COGNITIVE_SCORE: u32 = 15;

/// Function counts per complexity bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityDistribution {
    #[serde(rename = "Low")]
    pub low: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
}

impl ComplexityDistribution {
    fn record(&mut self, complexity: u32) {
        match complexity {
            c if c <= LOW_COMPLEXITY_MAX => self.low += 1,
            c if c <= MEDIUM_COMPLEXITY_MAX => self.medium += 1,
            _ => self.high += 1,
        }
    }
}

/// A function worth looking at, with the reasons why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub name: String,
    pub file: String,
    pub complexity: u32,
    pub maintainability: f64,
    pub issues: Vec<String>,
}

/// Aggregate counts and averages for a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeSummary {
    pub total_functions: usize,
    pub total_lines: u64,
    pub unused_functions: usize,
    pub recursive_functions: usize,
    pub duplicate_functions: usize,
    pub avg_complexity: f64,
    pub avg_maintainability: f64,
    pub avg_nesting_depth: f64,
    pub complexity_distribution: ComplexityDistribution,
    pub hotspots: Vec<Hotspot>,
}

/// Summarize a report. Averages are zero for an empty report.
///
/// Functions without measured metrics are counted but left out of the
/// maintainability average.
pub fn summarize(report: &AnalysisReport) -> CodeSummary {
    let mut summary = CodeSummary::default();
    let mut total_complexity = 0.0;
    let mut total_maintainability = 0.0;
    let mut total_nesting = 0.0;
    let mut measured = 0usize;

    for func in &report.functions {
        let metrics = &func.metrics;
        summary.total_functions += 1;
        summary.total_lines += u64::from(metrics.lines_of_code);
        if metrics.is_unused {
            summary.unused_functions += 1;
        }
        if func.is_recursive {
            summary.recursive_functions += 1;
        }
        if func.is_duplicate {
            summary.duplicate_functions += 1;
        }

        total_complexity += f64::from(metrics.cyclomatic_complexity);
        if metrics.is_measured() {
            measured += 1;
            total_maintainability += metrics.maintainability_index;
        }
        total_nesting += f64::from(metrics.readability.nesting_depth);
        summary
            .complexity_distribution
            .record(metrics.cyclomatic_complexity);

        if let Some(hotspot) = hotspot(func) {
            summary.hotspots.push(hotspot);
        }
    }

    if summary.total_functions > 0 {
        let n = summary.total_functions as f64;
        summary.avg_complexity = total_complexity / n;
        summary.avg_nesting_depth = total_nesting / n;
    }
    if measured > 0 {
        summary.avg_maintainability = total_maintainability / measured as f64;
    }

    summary
        .hotspots
        .sort_by(|a, b| b.complexity.cmp(&a.complexity).then_with(|| a.name.cmp(&b.name)));
    summary
}

fn hotspot(func: &FunctionRecord) -> Option<Hotspot> {
    let metrics = &func.metrics;
    let complex = metrics.cyclomatic_complexity > HOTSPOT_COMPLEXITY;
    let deep = metrics.readability.nesting_depth > HOTSPOT_NESTING;
    let unmaintainable =
        metrics.is_measured() && metrics.maintainability_index < HOTSPOT_MAINTAINABILITY;
    if !(complex || deep || unmaintainable) {
        return None;
    }

    let mut issues = Vec::new();
    if complex {
        issues.push("High cyclomatic complexity".to_string());
    }
    if deep {
        issues.push("Deep nesting".to_string());
    }
    if unmaintainable {
        issues.push("Low maintainability".to_string());
    }
    if metrics.cognitive_complexity.score > HIGH_COGNITIVE_SCORE {
        issues.push("High cognitive complexity".to_string());
    }

    Some(Hotspot {
        name: func.qualified_name.clone(),
        file: func.file.clone(),
        complexity: metrics.cyclomatic_complexity,
        maintainability: metrics.maintainability_index,
        issues,
    })
}
