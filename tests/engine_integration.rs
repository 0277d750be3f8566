//! Integration tests for the full analysis pipeline.
//!
//! These tests run the analyzer against the Go fixtures under testdata/
//! and check the cross-file passes: recursion, duplicates, dead code and
//! implements.

use std::path::PathBuf;

use codescan::{
    summarize, AnalysisError, AnalysisReport, Analyzer, AnalyzerConfig, ErrorPolicy,
    FileErrorKind, FunctionRecord,
};

fn testdata_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn analyze(name: &str) -> AnalysisReport {
    Analyzer::new(AnalyzerConfig::default())
        .expect("default config is valid")
        .analyze(testdata_path(name))
        .expect("analysis should succeed")
}

fn function<'r>(report: &'r AnalysisReport, name: &str) -> &'r FunctionRecord {
    report
        .function(name)
        .unwrap_or_else(|| panic!("{} missing from report", name))
}

#[test]
fn test_extracts_all_entities() {
    let report = analyze("project");

    let names: Vec<_> = report
        .functions
        .iter()
        .map(|f| f.qualified_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "main.factorial",
            "main.greet",
            "main.leftover",
            "main.main",
            "main.ping",
            "main.pong",
            "main.sumA",
            "main.sumB",
            "shapes.Circle.Area",
            "shapes.Circle.Perimeter",
            "shapes.Describe",
            "shapes.Square.Area",
            "shapes.round",
        ]
    );
    assert_eq!(report.structs.len(), 2);
    assert_eq!(report.interfaces.len(), 2);
    assert_eq!(report.globals.len(), 2);
    assert_eq!(report.imports.len(), 4);
    assert!(report.errors.is_empty());

    let shape = report
        .interfaces
        .iter()
        .find(|i| i.name == "Shape")
        .expect("Shape interface");
    assert_eq!(shape.methods, vec!["Area", "Perimeter"]);
    assert_eq!(shape.file, "shapes/shapes.go");
}

#[test]
fn test_function_details() {
    let report = analyze("project");

    let factorial = function(&report, "main.factorial");
    assert_eq!(factorial.params, vec!["int"]);
    assert_eq!(factorial.returns, vec!["int"]);
    assert_eq!(factorial.file, "main.go");
    assert!(factorial.metrics.halstead_metrics.volume > 0.0);
    assert!(factorial.metrics.halstead_metrics.effort > 0.0);

    let area = function(&report, "shapes.Square.Area");
    assert!(area.is_method);
    assert_eq!(area.receiver_struct, "Square");

    let main = function(&report, "main.main");
    assert!(main.callees.contains(&"greet".to_string()));
    assert!(main.callees.contains(&"fmt.Println".to_string()));
    assert!(main.callees.contains(&"shapes.Describe".to_string()));
    assert_eq!(main.referenced_globals, vec!["defaultName"]);
    for dep in ["os", "fmt", "example.com/project/shapes"] {
        assert!(main.dependencies.contains(&dep.to_string()), "missing {}", dep);
    }

    let greet = function(&report, "main.greet");
    assert_eq!(greet.referenced_globals, vec!["verbose"]);
    assert_eq!(greet.dependencies, vec!["fmt"]);

    let describe = function(&report, "shapes.Describe");
    assert_eq!(describe.cyclomatic_complexity, 3);
    assert_eq!(describe.metrics.cognitive_complexity.logical_ops, 1);
}

#[test]
fn test_recursion_detection() {
    let report = analyze("project");

    assert!(function(&report, "main.factorial").is_recursive);
    assert!(function(&report, "main.ping").is_recursive);
    assert!(function(&report, "main.pong").is_recursive);
    assert!(
        !function(&report, "main.main").is_recursive,
        "calling into a cycle is not recursion"
    );

    for func in &report.functions {
        if func.callees.contains(&func.name) || func.callees.contains(&func.qualified_name) {
            assert!(func.is_recursive, "{} calls itself", func.qualified_name);
        }
    }
}

#[test]
fn test_duplicates_ignore_comments() {
    let report = analyze("project");

    assert!(!function(&report, "main.sumA").is_duplicate);
    assert!(function(&report, "main.sumB").is_duplicate);
    assert!(function(&report, "main.sumB").metrics.is_duplicate);

    let duplicates: Vec<_> = report
        .functions
        .iter()
        .filter(|f| f.is_duplicate)
        .map(|f| f.qualified_name.as_str())
        .collect();
    assert_eq!(duplicates, vec!["main.sumB"]);
}

#[test]
fn test_dead_code() {
    let report = analyze("project");
    assert_eq!(
        report.unused_functions(),
        vec!["main.leftover", "main.sumA", "main.sumB", "shapes.round"]
    );

    for func in &report.functions {
        if func.is_exported() {
            assert!(!func.metrics.is_unused, "{} is exported", func.qualified_name);
        }
    }
}

#[test]
fn test_implements_inference() {
    let report = analyze("project");
    assert_eq!(report.implements.len(), 1);
    assert_eq!(report.implements[0].struct_name, "Circle");
    assert_eq!(report.implements[0].interface, "Shape");
}

#[test]
fn test_complexity_invariant_holds_everywhere() {
    let report = analyze("project");
    for func in &report.functions {
        assert_eq!(
            func.cyclomatic_complexity,
            func.metrics.cognitive_complexity.branching_score + 1,
            "{}",
            func.qualified_name
        );
        assert_eq!(func.cyclomatic_complexity, func.metrics.cyclomatic_complexity);
        assert!(func.metrics.maintainability_index > 0.0);
        assert!(func.metrics.maintainability_index <= 100.0);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = analyze("project");
    let second = analyze("project");
    assert_eq!(first, second);
}

#[test]
fn test_single_thread_matches_default_pool() {
    let config = AnalyzerConfig {
        threads: Some(1),
        ..Default::default()
    };
    let serial = Analyzer::new(config)
        .unwrap()
        .analyze(testdata_path("project"))
        .unwrap();
    assert_eq!(serial, analyze("project"));
}

#[test]
fn test_summary_over_fixture() {
    let summary = summarize(&analyze("project"));
    assert_eq!(summary.total_functions, 13);
    assert_eq!(summary.unused_functions, 4);
    assert_eq!(summary.recursive_functions, 3);
    assert_eq!(summary.duplicate_functions, 1);
    assert_eq!(summary.complexity_distribution.low, 13);
    assert!(summary.avg_maintainability > 50.0);
}

#[test]
fn test_configured_entry_points() {
    let config = AnalyzerConfig {
        entry_points: vec!["main".to_string(), "sumA".to_string()],
        ..Default::default()
    };
    let report = Analyzer::new(config)
        .unwrap()
        .analyze(testdata_path("project"))
        .unwrap();
    assert!(!function(&report, "main.sumA").metrics.is_unused);
    assert!(function(&report, "main.sumB").metrics.is_unused);
}

#[test]
fn test_exclusions() {
    let config = AnalyzerConfig {
        excluded_paths: vec!["shapes/**".to_string()],
        ..Default::default()
    };
    let report = Analyzer::new(config)
        .unwrap()
        .analyze(testdata_path("project"))
        .unwrap();
    assert!(report.functions.iter().all(|f| f.package == "main"));
    assert!(report.implements.is_empty());
}

#[test]
fn test_discovers_fixture_config() {
    let (config, path) = AnalyzerConfig::discover(testdata_path("project"))
        .unwrap()
        .expect("fixture ships a config");
    assert!(path.ends_with("codescan.yaml"));
    assert_eq!(config.excluded_paths, vec!["gen/**"]);
}

#[test]
fn test_parse_errors_recorded() {
    let report = analyze("broken");

    assert_eq!(report.functions.len(), 1);
    assert_eq!(report.functions[0].qualified_name, "broken.Fine");
    assert_eq!(report.functions[0].params, vec!["int", "int"]);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].file, "bad.go");
    assert_eq!(report.errors[0].kind, FileErrorKind::Parse);
    assert!(report.errors[0].message.starts_with("syntax error at "));
}

#[test]
fn test_fail_fast_aborts_on_parse_error() {
    let config = AnalyzerConfig {
        error_policy: ErrorPolicy::FailFast,
        ..Default::default()
    };
    let err = Analyzer::new(config)
        .unwrap()
        .analyze(testdata_path("broken"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Parse { .. }));
}

#[test]
fn test_missing_root_is_fatal() {
    let err = Analyzer::new(AnalyzerConfig::default())
        .unwrap()
        .analyze(testdata_path("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Walk { .. }));
    assert!(!err.is_recoverable());
}
