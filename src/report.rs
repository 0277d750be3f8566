//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the full report (or summary) for programmatic consumption

use std::io::{self, Write};

use colored::*;
use serde::Serialize;

use crate::analysis::{AnalysisReport, FileError};
use crate::summary::{summarize, CodeSummary, Hotspot};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    /// Parse a `--format` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pretty" => Some(OutputFormat::Pretty),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize a report or summary as pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write a report or summary to stdout as JSON.
pub fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write a human-readable rendering of `report`.
///
/// With `summary_only`, per-function listings are left out.
pub fn write_pretty<W: Write>(
    out: &mut W,
    root: &str,
    report: &AnalysisReport,
    summary_only: bool,
) -> io::Result<()> {
    let summary = summarize(report);

    // Header
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "codescan".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Scanned: ".dimmed(), root)?;
    writeln!(out)?;

    write_counts(out, report, &summary)?;
    writeln!(out)?;
    write_distribution(out, &summary)?;
    writeln!(out)?;

    if !summary.hotspots.is_empty() {
        write_hotspots(out, &summary.hotspots)?;
        writeln!(out)?;
    }

    if !summary_only {
        write_name_list(out, "Unused", &report.unused_functions())?;

        let recursive: Vec<&str> = report
            .functions
            .iter()
            .filter(|f| f.is_recursive)
            .map(|f| f.qualified_name.as_str())
            .collect();
        write_name_list(out, "Recursive", &recursive)?;

        if !report.implements.is_empty() {
            writeln!(out, "  {} ({}):", "Implements".bold(), report.implements.len())?;
            for rec in &report.implements {
                writeln!(out, "    {} {} {}", rec.struct_name, "->".dimmed(), rec.interface)?;
            }
            writeln!(out)?;
        }
    }

    if !report.errors.is_empty() {
        write_errors(out, &report.errors)?;
        writeln!(out)?;
    }

    Ok(())
}

fn write_counts<W: Write>(
    out: &mut W,
    report: &AnalysisReport,
    summary: &CodeSummary,
) -> io::Result<()> {
    writeln!(
        out,
        "  {:<14}{}  ({} lines)",
        "Functions:",
        summary.total_functions.to_string().bold(),
        summary.total_lines
    )?;
    writeln!(
        out,
        "  {:<14}{} structs, {} interfaces, {} globals, {} imports",
        "Types:",
        report.structs.len(),
        report.interfaces.len(),
        report.globals.len(),
        report.imports.len()
    )?;
    writeln!(
        out,
        "  {:<14}{} unused, {} recursive, {} duplicate",
        "Flags:",
        count_colored(summary.unused_functions),
        count_colored(summary.recursive_functions),
        count_colored(summary.duplicate_functions)
    )?;
    writeln!(
        out,
        "  {:<14}complexity {:.2}, maintainability {}, nesting {:.2}",
        "Averages:",
        summary.avg_complexity,
        maintainability_colored(summary.avg_maintainability),
        summary.avg_nesting_depth
    )
}

fn count_colored(n: usize) -> ColoredString {
    if n == 0 {
        n.to_string().green()
    } else {
        n.to_string().yellow()
    }
}

fn maintainability_colored(mi: f64) -> ColoredString {
    let text = format!("{:.1}", mi);
    match mi {
        m if m >= 75.0 => text.green(),
        m if m >= 50.0 => text.yellow(),
        _ => text.red(),
    }
}

fn write_distribution<W: Write>(out: &mut W, summary: &CodeSummary) -> io::Result<()> {
    let dist = &summary.complexity_distribution;
    writeln!(out, "  {}", "Complexity:".bold())?;
    writeln!(out, "    {:<8}{:>5}", "Low".green(), dist.low)?;
    writeln!(out, "    {:<8}{:>5}", "Medium".yellow(), dist.medium)?;
    writeln!(out, "    {:<8}{:>5}", "High".red(), dist.high)
}

fn write_hotspots<W: Write>(out: &mut W, hotspots: &[Hotspot]) -> io::Result<()> {
    writeln!(out, "  {} ({}):", "Hotspots".bold(), hotspots.len())?;
    writeln!(out)?;

    for h in hotspots {
        write!(out, "    {:<32}", h.name)?;
        write!(out, "{}", h.file.blue())?;
        writeln!(
            out,
            "  {}{}",
            format!("cc {}  mi ", h.complexity).dimmed(),
            maintainability_colored(h.maintainability)
        )?;
        writeln!(out, "            {}", h.issues.join(", "))?;
    }
    Ok(())
}

fn write_name_list<W: Write>(out: &mut W, title: &str, names: &[&str]) -> io::Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {} ({}):", title.bold(), names.len())?;
    for name in names {
        writeln!(out, "    {}", name)?;
    }
    writeln!(out)
}

fn write_errors<W: Write>(out: &mut W, errors: &[FileError]) -> io::Result<()> {
    writeln!(out, "  {} ({}):", "Skipped files".red().bold(), errors.len())?;
    for e in errors {
        writeln!(
            out,
            "    {} {}  {}",
            e.kind.as_str().to_uppercase().red(),
            e.file.blue(),
            e.message
        )?;
    }
    Ok(())
}
