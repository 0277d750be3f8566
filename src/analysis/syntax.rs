//! Language-neutral syntax tree consumed by the engine.
//!
//! A front-end lowers its concrete parse tree into these types. Everything
//! downstream (extraction, metrics, duplicate detection) only ever sees this
//! closed set of variants; node kinds the front-end does not map explicitly
//! end up as [`Node::Other`] or [`TypeExpr::Unsupported`] instead of being
//! guessed at.

use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Number of source lines covered, counting both ends.
    pub fn line_count(&self) -> usize {
        if self.end_line < self.start_line {
            return 0;
        }
        self.end_line - self.start_line + 1
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// One lowered source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as reported in records.
    pub path: String,
    /// Package name from the package clause (empty if missing).
    pub package: String,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
    /// Whether the concrete tree contained syntax errors.
    pub has_errors: bool,
}

/// Top-level declaration kinds the engine understands.
#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeSpec),
    Value(ValueSpec),
    Import(ImportSpec),
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver type for methods (`*Server` for `func (s *Server) Run()`).
    pub receiver: Option<TypeExpr>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    /// `None` for declarations without a body (assembly stubs, linknames).
    pub body: Option<Block>,
    pub span: Span,
}

/// A named type declaration (`type Name T` or `type Name = T`).
#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Whether a value spec came from `var` or `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Var,
    Const,
}

/// A single `var`/`const` spec, possibly declaring several names.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub kind: ValueKind,
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
    /// Initializer expressions, positionally matched to `names`.
    pub values: Vec<TypeExpr>,
    pub span: Span,
}

/// An import spec.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Unquoted import path.
    pub path: String,
    /// Optional alias (`import log "github.com/sirupsen/logrus"`).
    pub alias: Option<String>,
    pub span: Span,
}

impl ImportSpec {
    /// The identifier the import is referenced by inside the file.
    pub fn local_name(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A parameter, result, struct field or interface element.
///
/// `names` is empty for unnamed parameters, embedded fields and embedded
/// interface elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl Field {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }
}

/// Type (and type-like value) expressions.
///
/// Structural equality doubles as the cache identity in
/// [`TypeStringCache`](crate::analysis::TypeStringCache).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Ident(String),
    Pointer(Box<TypeExpr>),
    /// Slices and arrays alike.
    Slice(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan(Box<TypeExpr>),
    Func {
        params: Vec<Field>,
        results: Vec<Field>,
    },
    Interface(Vec<Field>),
    Struct(Vec<Field>),
    Literal(String),
    Selector {
        base: Box<TypeExpr>,
        member: String,
    },
    Variadic(Box<TypeExpr>),
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// A node kind with no rendering rule; carries the kind name.
    Unsupported(String),
}

impl TypeExpr {
    /// Short tag naming the variant.
    pub fn kind_name(&self) -> &str {
        match self {
            TypeExpr::Ident(_) => "ident",
            TypeExpr::Pointer(_) => "pointer",
            TypeExpr::Slice(_) => "slice",
            TypeExpr::Map { .. } => "map",
            TypeExpr::Chan(_) => "chan",
            TypeExpr::Func { .. } => "func",
            TypeExpr::Interface(_) => "interface",
            TypeExpr::Struct(_) => "struct",
            TypeExpr::Literal(_) => "literal",
            TypeExpr::Selector { .. } => "selector",
            TypeExpr::Variadic(_) => "variadic",
            TypeExpr::Generic { .. } => "generic",
            TypeExpr::Unsupported(kind) => kind,
        }
    }

    /// Call `f` for every identifier name appearing in the expression.
    pub fn for_each_name(&self, f: &mut dyn FnMut(&str)) {
        match self {
            TypeExpr::Ident(name) => f(name),
            TypeExpr::Pointer(inner)
            | TypeExpr::Slice(inner)
            | TypeExpr::Chan(inner)
            | TypeExpr::Variadic(inner) => inner.for_each_name(f),
            TypeExpr::Map { key, value } => {
                key.for_each_name(f);
                value.for_each_name(f);
            }
            TypeExpr::Func { params, results } => {
                for field in params.iter().chain(results) {
                    field.ty.for_each_name(f);
                }
            }
            TypeExpr::Interface(fields) | TypeExpr::Struct(fields) => {
                for field in fields {
                    field.ty.for_each_name(f);
                }
            }
            TypeExpr::Selector { base, member } => {
                base.for_each_name(f);
                f(member);
            }
            TypeExpr::Generic { base, args } => {
                base.for_each_name(f);
                for arg in args {
                    arg.for_each_name(f);
                }
            }
            TypeExpr::Literal(_) | TypeExpr::Unsupported(_) => {}
        }
    }
}

/// A brace-delimited statement block.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Node>,
    pub span: Span,
}

/// Which construct a [`Clause`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// `case`/`default` of an expression or type switch.
    Case,
    /// `case`/`default` of a select statement.
    Comm,
}

/// A switch case or select communication clause.
#[derive(Debug, Clone)]
pub struct Clause {
    pub kind: ClauseKind,
    pub is_default: bool,
    /// Case expressions, case types or the communication statement.
    pub exprs: Vec<Node>,
    pub body: Vec<Node>,
}

/// Statement and expression nodes inside function bodies.
#[derive(Debug, Clone)]
pub enum Node {
    Ident(String),
    Literal(String),
    Unary {
        op: String,
        operand: Box<Node>,
    },
    Binary {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    Call {
        function: Box<Node>,
        args: Vec<Node>,
    },
    Selector {
        operand: Box<Node>,
        field: String,
    },
    Type(TypeExpr),
    If {
        init: Option<Box<Node>>,
        cond: Box<Node>,
        then: Block,
        /// Either a `Node::Block` or a chained `Node::If`.
        otherwise: Option<Box<Node>>,
    },
    For {
        init: Option<Box<Node>>,
        cond: Option<Box<Node>>,
        post: Option<Box<Node>>,
        body: Block,
    },
    Range {
        left: Option<Box<Node>>,
        target: Box<Node>,
        body: Block,
    },
    Switch {
        init: Option<Box<Node>>,
        tag: Option<Box<Node>>,
        clauses: Vec<Clause>,
        /// Comments between clauses, outside any clause body.
        comments: Vec<Node>,
    },
    Select {
        clauses: Vec<Clause>,
        comments: Vec<Node>,
    },
    Block(Block),
    Return(Vec<Node>),
    Comment(String),
    /// Any other construct, with its lowered children in source order.
    Other {
        kind: String,
        children: Vec<Node>,
    },
}

impl Node {
    /// Whether this node is a parse-error placeholder.
    pub fn is_error(&self) -> bool {
        matches!(self, Node::Other { kind, .. } if kind == "ERROR" || kind == "MISSING")
    }

    /// Whether `op` is a short-circuit logical operator.
    pub fn is_short_circuit(op: &str) -> bool {
        op == "&&" || op == "||"
    }
}

/// Pre-order visitor over body nodes.
///
/// Override the `visit_*` hooks and call the matching `walk_*` function to
/// keep descending.
pub trait Visitor {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_clause(&mut self, clause: &Clause) {
        walk_clause(self, clause);
    }
}

/// Visit every statement of a block.
pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_node(stmt);
    }
}

/// Visit a clause's expressions, then its body.
pub fn walk_clause<V: Visitor + ?Sized>(v: &mut V, clause: &Clause) {
    for expr in &clause.exprs {
        v.visit_node(expr);
    }
    for stmt in &clause.body {
        v.visit_node(stmt);
    }
}

/// Visit the children of `node` in source order.
pub fn walk_node<V: Visitor + ?Sized>(v: &mut V, node: &Node) {
    match node {
        Node::Ident(_) | Node::Literal(_) | Node::Type(_) | Node::Comment(_) => {}
        Node::Unary { operand, .. } => v.visit_node(operand),
        Node::Binary { left, right, .. } => {
            v.visit_node(left);
            v.visit_node(right);
        }
        Node::Call { function, args } => {
            v.visit_node(function);
            for arg in args {
                v.visit_node(arg);
            }
        }
        Node::Selector { operand, .. } => v.visit_node(operand),
        Node::If {
            init,
            cond,
            then,
            otherwise,
        } => {
            if let Some(init) = init {
                v.visit_node(init);
            }
            v.visit_node(cond);
            v.visit_block(then);
            if let Some(otherwise) = otherwise {
                v.visit_node(otherwise);
            }
        }
        Node::For {
            init,
            cond,
            post,
            body,
        } => {
            for part in [init, cond, post].into_iter().flatten() {
                v.visit_node(part);
            }
            v.visit_block(body);
        }
        Node::Range { left, target, body } => {
            if let Some(left) = left {
                v.visit_node(left);
            }
            v.visit_node(target);
            v.visit_block(body);
        }
        Node::Switch {
            init,
            tag,
            clauses,
            comments,
        } => {
            for part in [init, tag].into_iter().flatten() {
                v.visit_node(part);
            }
            for clause in clauses {
                v.visit_clause(clause);
            }
            for comment in comments {
                v.visit_node(comment);
            }
        }
        Node::Select { clauses, comments } => {
            for clause in clauses {
                v.visit_clause(clause);
            }
            for comment in comments {
                v.visit_node(comment);
            }
        }
        Node::Block(block) => v.visit_block(block),
        Node::Return(values) => {
            for value in values {
                v.visit_node(value);
            }
        }
        Node::Other { children, .. } => {
            for child in children {
                v.visit_node(child);
            }
        }
    }
}
