//! Per-function complexity metrics.
//!
//! Halstead counts, cyclomatic complexity, cognitive complexity and the
//! readability figures all come out of a single walk over the body. The
//! maintainability index is applied afterwards by [`finalize_maintainability`]
//! because it depends on the duplicate flag, which is only known once every
//! file has been seen.

mod halstead;
mod maintainability;

pub use halstead::{HalsteadCounter, HalsteadMetrics};
pub use maintainability::{maintainability_index, MaintainabilityInputs};

use serde::{Deserialize, Serialize};

use crate::analysis::syntax::{Block, Clause, Node, TypeExpr};

/// Nesting-weighted control-flow measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognitiveComplexity {
    pub score: u32,
    pub nested_depth: u32,
    pub logical_ops: u32,
    pub branching_score: u32,
}

/// Layout-oriented readability figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    pub nesting_depth: u32,
    pub comment_density: f64,
    pub branch_density: f64,
}

/// The full metrics block attached to every function record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cyclomatic_complexity: u32,
    pub lines_of_code: u32,
    pub is_duplicate: bool,
    pub is_unused: bool,
    pub halstead_metrics: HalsteadMetrics,
    pub cognitive_complexity: CognitiveComplexity,
    pub readability: Readability,
    pub maintainability_index: f64,
}

impl Metrics {
    /// Metrics for a function with no usable body.
    pub fn zeroed() -> Self {
        Self {
            cyclomatic_complexity: 1,
            ..Default::default()
        }
    }

    /// Whether these metrics came from a parsed body. Zeroed metrics
    /// (missing or malformed body) have no lines of code.
    pub fn is_measured(&self) -> bool {
        self.lines_of_code > 0
    }
}

// Cognitive weights per construct.
const IF_WEIGHT: u32 = 1;
const LOOP_WEIGHT: u32 = 2;
const SWITCH_WEIGHT: u32 = 1;
const SELECT_WEIGHT: u32 = 1;
const LOGICAL_OP_WEIGHT: u32 = 1;

/// Outcome of measuring a body.
#[derive(Debug, Clone)]
pub struct BodyMetrics {
    pub metrics: Metrics,
    /// Whether the body contained parse-error placeholders.
    pub has_errors: bool,
}

/// Compute everything except the maintainability index for one body.
pub fn measure(body: &Block) -> BodyMetrics {
    let mut walker = Walker::default();
    walker.block(body, 0, 0);

    let loc = body.span.line_count() as u32;
    let density = |count: u32| {
        if loc == 0 {
            0.0
        } else {
            f64::from(count) / f64::from(loc)
        }
    };

    let mut cognitive = walker.cognitive;
    cognitive.branching_score = walker.decision_points;

    BodyMetrics {
        metrics: Metrics {
            cyclomatic_complexity: 1 + walker.decision_points,
            lines_of_code: loc,
            is_duplicate: false,
            is_unused: false,
            halstead_metrics: walker.halstead.finish(),
            cognitive_complexity: cognitive,
            readability: Readability {
                nesting_depth: walker.max_block_depth,
                comment_density: density(walker.comments),
                branch_density: density(walker.branches),
            },
            maintainability_index: 0.0,
        },
        has_errors: walker.has_errors,
    }
}

/// Fill in the maintainability index from the other metrics.
pub fn finalize_maintainability(metrics: &mut Metrics) {
    metrics.maintainability_index = maintainability_index(&MaintainabilityInputs {
        lines_of_code: metrics.lines_of_code,
        cyclomatic_complexity: metrics.cyclomatic_complexity,
        comment_density: metrics.readability.comment_density,
        nesting_depth: metrics.readability.nesting_depth,
        branch_density: metrics.readability.branch_density,
        is_duplicate: metrics.is_duplicate,
    });
}

/// Single-pass accumulator.
///
/// `nesting` is the cognitive nesting level, `depth` the block depth used
/// for readability. They differ: an if's condition sits at the outer
/// nesting level while a bare `{}` block deepens only `depth`.
#[derive(Default)]
struct Walker {
    halstead: HalsteadCounter,
    cognitive: CognitiveComplexity,
    decision_points: u32,
    comments: u32,
    branches: u32,
    max_block_depth: u32,
    has_errors: bool,
}

impl Walker {
    fn reach(&mut self, nesting: u32) {
        self.cognitive.nested_depth = self.cognitive.nested_depth.max(nesting);
    }

    fn block(&mut self, block: &Block, nesting: u32, depth: u32) {
        self.reach(nesting);
        let depth = depth + 1;
        self.max_block_depth = self.max_block_depth.max(depth);
        for stmt in &block.stmts {
            self.node(stmt, nesting, depth);
        }
    }

    fn opt(&mut self, node: &Option<Box<Node>>, nesting: u32, depth: u32) {
        if let Some(node) = node {
            self.node(node, nesting, depth);
        }
    }

    fn clauses(&mut self, clauses: &[Clause], nesting: u32, depth: u32) {
        self.reach(nesting);
        // The clause list is the body block of the switch/select.
        let depth = depth + 1;
        self.max_block_depth = self.max_block_depth.max(depth);
        for clause in clauses {
            self.decision_points += 1;
            for expr in &clause.exprs {
                self.node(expr, nesting, depth);
            }
            for stmt in &clause.body {
                self.node(stmt, nesting, depth);
            }
        }
    }

    fn type_names(&mut self, ty: &TypeExpr) {
        ty.for_each_name(&mut |name| self.halstead.operand(name));
    }

    fn node(&mut self, node: &Node, nesting: u32, depth: u32) {
        self.reach(nesting);
        match node {
            Node::Ident(name) | Node::Literal(name) => self.halstead.operand(name),
            Node::Type(ty) => self.type_names(ty),
            Node::Comment(_) => self.comments += 1,
            Node::Unary { op, operand } => {
                self.halstead.operator(op);
                self.node(operand, nesting, depth);
            }
            Node::Binary { op, left, right } => {
                self.halstead.operator(op);
                if Node::is_short_circuit(op) {
                    self.decision_points += 1;
                    self.cognitive.logical_ops += 1;
                    self.cognitive.score += LOGICAL_OP_WEIGHT;
                }
                self.node(left, nesting, depth);
                self.node(right, nesting, depth);
            }
            Node::Call { function, args } => {
                self.node(function, nesting, depth);
                for arg in args {
                    self.node(arg, nesting, depth);
                }
            }
            Node::Selector { operand, field } => {
                self.node(operand, nesting, depth);
                self.halstead.operand(field);
            }
            Node::If {
                init,
                cond,
                then,
                otherwise,
            } => {
                self.decision_points += 1;
                self.branches += 1;
                self.cognitive.score += IF_WEIGHT;
                self.opt(init, nesting, depth);
                self.node(cond, nesting, depth);
                self.block(then, nesting + 1, depth);
                match otherwise.as_deref() {
                    Some(Node::Block(block)) => self.block(block, nesting + 1, depth),
                    Some(other) => self.node(other, nesting + 1, depth),
                    None => {}
                }
            }
            Node::For {
                init,
                cond,
                post,
                body,
            } => {
                self.decision_points += 1;
                self.branches += 1;
                self.cognitive.score += LOOP_WEIGHT;
                self.opt(init, nesting, depth);
                self.opt(cond, nesting, depth);
                self.opt(post, nesting, depth);
                self.block(body, nesting + 1, depth);
            }
            Node::Range { left, target, body } => {
                self.decision_points += 1;
                self.branches += 1;
                self.cognitive.score += LOOP_WEIGHT;
                self.opt(left, nesting, depth);
                self.node(target, nesting, depth);
                self.block(body, nesting + 1, depth);
            }
            Node::Switch {
                init,
                tag,
                clauses,
                comments,
            } => {
                self.branches += 1;
                self.cognitive.score += SWITCH_WEIGHT;
                self.opt(init, nesting, depth);
                self.opt(tag, nesting, depth);
                self.clauses(clauses, nesting + 1, depth);
                self.comments += comments.len() as u32;
            }
            Node::Select { clauses, comments } => {
                self.decision_points += 1;
                self.branches += 1;
                self.cognitive.score += SELECT_WEIGHT;
                self.clauses(clauses, nesting + 1, depth);
                self.comments += comments.len() as u32;
            }
            Node::Block(block) => self.block(block, nesting, depth),
            Node::Return(values) => {
                for value in values {
                    self.node(value, nesting, depth);
                }
            }
            Node::Other { children, .. } => {
                if node.is_error() {
                    self.has_errors = true;
                }
                for child in children {
                    self.node(child, nesting, depth);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::syntax::{Decl, SourceFile};
    use crate::analysis::{GoFrontend, LanguageFrontend};
    use std::path::Path;

    fn lower(source: &str) -> SourceFile {
        let frontend = GoFrontend::new();
        let parsed = frontend
            .parse(Path::new("metrics.go"), source.as_bytes())
            .unwrap();
        frontend.lower(&parsed).unwrap()
    }

    fn measure_fn(source: &str, name: &str) -> BodyMetrics {
        let file = lower(source);
        let func = file
            .decls
            .iter()
            .find_map(|d| match d {
                Decl::Func(f) if f.name == name => Some(f),
                _ => None,
            })
            .unwrap_or_else(|| panic!("function {} not found", name));
        measure(func.body.as_ref().expect("function has a body"))
    }

    #[test]
    fn test_recursive_example_has_halstead_volume() {
        let source = r#"
package test

func example(n int) int {
    if n <= 1 { return 1 }
    return n * example(n-1)
}
"#;
        let m = measure_fn(source, "example").metrics;
        assert!(m.halstead_metrics.volume > 0.0);
        assert!(m.halstead_metrics.effort > 0.0);
        assert_eq!(m.cyclomatic_complexity, 2);
        assert_eq!(m.lines_of_code, 4);
        assert_eq!(m.readability.nesting_depth, 2);
    }

    #[test]
    fn test_nested_cognitive_complexity() {
        let source = r#"
package test

func nested(x int) {
    if x > 0 {
        if x > 10 && x < 20 {
            for i := 0; i < x; i++ {
                if i%2 == 0 {
                    println(i)
                }
            }
        }
    }
}
"#;
        let m = measure_fn(source, "nested").metrics;
        let cog = m.cognitive_complexity;
        assert_eq!(cog.score, 6, "if + if + && + for(2) + if");
        assert_eq!(cog.nested_depth, 4);
        assert_eq!(cog.logical_ops, 1);
        assert_eq!(m.cyclomatic_complexity, cog.branching_score + 1);
        assert_eq!(m.cyclomatic_complexity, 6);
    }

    #[test]
    fn test_switch_and_select_decisions() {
        let source = r#"
package test

func route(kind string, ch chan int, done chan bool) int {
    switch kind {
    case "a", "b":
        return 1
    case "c":
        return 2
    default:
        return 0
    }
    select {
    case v := <-ch:
        return v
    case <-done:
        return -1
    }
}
"#;
        let m = measure_fn(source, "route").metrics;
        // 3 switch clauses, select, 2 comm clauses
        assert_eq!(m.cyclomatic_complexity, 1 + 3 + 1 + 2);
        assert_eq!(m.cognitive_complexity.score, 2);
        assert_eq!(m.cyclomatic_complexity, m.cognitive_complexity.branching_score + 1);
    }

    #[test]
    fn test_comment_and_branch_density() {
        let source = r#"
package test

func documented(x int) int {
    // double it
    // when positive
    if x > 0 {
        return x * 2
    }
    return x
}
"#;
        let m = measure_fn(source, "documented").metrics;
        assert_eq!(m.lines_of_code, 8);
        assert!((m.readability.comment_density - 2.0 / 8.0).abs() < 1e-9);
        assert!((m.readability.branch_density - 1.0 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_comments_between_clauses_count() {
        let source = r#"
package test

func pick(x int) int {
    switch x {
    // one
    case 1:
        return 1
    // two
    case 2:
        return 2
    }
    return 0
}

func wait(ch chan int) int {
    select {
    // ready
    case v := <-ch:
        return v
    }
}
"#;
        let m = measure_fn(source, "pick").metrics;
        assert_eq!(m.lines_of_code, 11);
        assert!((m.readability.comment_density - 2.0 / 11.0).abs() < 1e-9);

        let m = measure_fn(source, "wait").metrics;
        assert_eq!(m.lines_of_code, 7);
        assert!((m.readability.comment_density - 1.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_body() {
        let source = "package test\n\nfunc noop() {}\n";
        let m = measure_fn(source, "noop").metrics;
        assert_eq!(m.cyclomatic_complexity, 1);
        assert_eq!(m.lines_of_code, 1);
        assert_eq!(m.halstead_metrics, HalsteadMetrics::default());
        assert_eq!(m.readability.nesting_depth, 1);
    }

    #[test]
    fn test_finalize_applies_duplicate_penalty() {
        let mut metrics = Metrics::zeroed();
        metrics.lines_of_code = 10;
        finalize_maintainability(&mut metrics);
        let original = metrics.maintainability_index;

        metrics.is_duplicate = true;
        finalize_maintainability(&mut metrics);
        assert!((metrics.maintainability_index - original * 0.8).abs() < 1e-9);
    }
}
