//! Go language front-end using tree-sitter.
//!
//! Lowers a tree-sitter-go tree into the engine's syntax types:
//! - Function and method declarations (receiver, parameters, results, body)
//! - Type declarations (struct, interface, aliases, named types)
//! - Variable and constant specs
//! - Imports
//! - Function bodies as [`Node`] trees

use std::collections::HashSet;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor};

use crate::analysis::syntax::{
    Block, Clause, ClauseKind, Decl, Field, FuncDecl, ImportSpec, Node, SourceFile, Span,
    TypeExpr, TypeSpec, ValueKind, ValueSpec,
};
use crate::analysis::{LanguageFrontend, ParsedFile};

/// Tree-sitter query for extracting imports.
const IMPORT_QUERY: &str = r#"
(import_declaration
  (import_spec
    name: (package_identifier)? @alias
    path: (interpreted_string_literal) @path
  )
) @import

(import_declaration
  (import_spec_list
    (import_spec
      name: (package_identifier)? @alias
      path: (interpreted_string_literal) @path
    ) @import_item
  )
) @import_group
"#;

/// Tree-sitter query for package declaration.
const PACKAGE_QUERY: &str = r#"
(package_clause
  (package_identifier) @package_name
)
"#;

/// Node kinds that are lowered to [`Node::Ident`].
const IDENT_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "package_identifier",
    "label_name",
    "blank_identifier",
    "true",
    "false",
    "nil",
    "iota",
];

/// Node kinds that are lowered to [`Node::Literal`].
const LITERAL_KINDS: &[&str] = &[
    "int_literal",
    "float_literal",
    "imaginary_literal",
    "rune_literal",
    "interpreted_string_literal",
    "raw_string_literal",
];

/// Node kinds that denote a type in expression position.
const TYPE_KINDS: &[&str] = &[
    "type_identifier",
    "qualified_type",
    "pointer_type",
    "array_type",
    "implicit_length_array_type",
    "slice_type",
    "map_type",
    "channel_type",
    "function_type",
    "interface_type",
    "struct_type",
    "generic_type",
    "parenthesized_type",
];

/// Go language front-end.
pub struct GoFrontend {
    language: Language,
}

impl GoFrontend {
    /// Create a new Go front-end.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Extract the package name from a parsed file.
    fn extract_package(&self, parsed: &ParsedFile) -> Option<String> {
        let query = Query::new(&self.language, PACKAGE_QUERY).ok()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        if let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if name == "package_name" {
                    return Some(parsed.node_text(capture.node).to_string());
                }
            }
        }
        None
    }

    /// Extract imports from a parsed file.
    fn extract_imports(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<ImportSpec>> {
        let query = Query::new(&self.language, IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = Vec::new();
        let mut seen_paths = HashSet::new();

        while let Some(m) = matches.next() {
            let mut path = String::new();
            let mut alias = None;
            let mut import_node = None;

            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                match name {
                    "path" => {
                        // Remove quotes from path
                        let raw = parsed.node_text(capture.node);
                        path = raw.trim_matches('"').to_string();
                        import_node = Some(capture.node);
                    }
                    "alias" => {
                        alias = Some(parsed.node_text(capture.node).to_string());
                    }
                    _ => {}
                }
            }

            if !path.is_empty() && seen_paths.insert(path.clone()) {
                if let Some(node) = import_node {
                    imports.push(ImportSpec {
                        path,
                        alias,
                        span: Span::from_node(node),
                    });
                }
            }
        }

        imports.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(imports)
    }
}

impl Default for GoFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageFrontend for GoFrontend {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Go source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn lower(&self, parsed: &ParsedFile) -> anyhow::Result<SourceFile> {
        let package = self.extract_package(parsed).unwrap_or_default();
        let mut decls: Vec<Decl> = self
            .extract_imports(parsed)?
            .into_iter()
            .map(Decl::Import)
            .collect();

        let lowerer = Lowerer { parsed };
        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(func) = lowerer.func_decl(child) {
                        decls.push(Decl::Func(func));
                    }
                }
                "type_declaration" => lowerer.type_decl(child, &mut decls),
                "var_declaration" => lowerer.value_decl(child, ValueKind::Var, &mut decls),
                "const_declaration" => lowerer.value_decl(child, ValueKind::Const, &mut decls),
                _ => {}
            }
        }

        Ok(SourceFile {
            path: parsed.path.clone(),
            package,
            decls,
            has_errors: parsed.has_errors(),
        })
    }

    fn is_test_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with("_test.go"))
            .unwrap_or(false)
    }
}

/// Walks one concrete tree and builds syntax values from it.
struct Lowerer<'a> {
    parsed: &'a ParsedFile,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: tree_sitter::Node) -> String {
        self.parsed.node_text(node).to_string()
    }

    fn func_decl(&self, node: tree_sitter::Node) -> Option<FuncDecl> {
        let name = self.text(node.child_by_field_name("name")?);

        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| self.fields(list).into_iter().next())
            .map(|field| field.ty);

        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.fields(list))
            .unwrap_or_default();

        let results = match node.child_by_field_name("result") {
            Some(result) if result.kind() == "parameter_list" => self.fields(result),
            Some(result) => vec![Field::unnamed(self.type_expr(result))],
            None => Vec::new(),
        };

        let body = node.child_by_field_name("body").map(|b| self.block(b));

        Some(FuncDecl {
            name,
            receiver,
            params,
            results,
            body,
            span: Span::from_node(node),
        })
    }

    fn type_decl(&self, node: tree_sitter::Node, out: &mut Vec<Decl>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            let (Some(name), Some(ty)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };
            out.push(Decl::Type(TypeSpec {
                name: self.text(name),
                ty: self.type_expr(ty),
                span: Span::from_node(spec),
            }));
        }
    }

    fn value_decl(&self, node: tree_sitter::Node, kind: ValueKind, out: &mut Vec<Decl>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "var_spec" | "const_spec" => out.push(Decl::Value(self.value_spec(child, kind))),
                // Grouped declarations may wrap specs in a list node.
                "var_spec_list" | "const_spec_list" => self.value_decl(child, kind, out),
                _ => {}
            }
        }
    }

    fn value_spec(&self, spec: tree_sitter::Node, kind: ValueKind) -> ValueSpec {
        let mut cursor = spec.walk();
        let names = spec
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n))
            .collect();

        let ty = spec.child_by_field_name("type").map(|t| self.type_expr(t));

        let values = match spec.child_by_field_name("value") {
            Some(list) if list.kind() == "expression_list" => {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .map(|n| self.type_expr(n))
                    .collect()
            }
            Some(value) => vec![self.type_expr(value)],
            None => Vec::new(),
        };

        ValueSpec {
            kind,
            names,
            ty,
            values,
            span: Span::from_node(spec),
        }
    }

    /// Lower a `parameter_list` into fields.
    fn fields(&self, list: tree_sitter::Node) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            let Some(ty) = param.child_by_field_name("type") else {
                continue;
            };
            let mut ty = self.type_expr(ty);
            if param.kind() == "variadic_parameter_declaration" {
                ty = TypeExpr::Variadic(Box::new(ty));
            }
            let mut names_cursor = param.walk();
            let names = param
                .children_by_field_name("name", &mut names_cursor)
                .map(|n| self.text(n))
                .collect();
            fields.push(Field { names, ty });
        }
        fields
    }

    /// Lower a type (or type-like value) expression.
    fn type_expr(&self, node: tree_sitter::Node) -> TypeExpr {
        let kind = node.kind();
        if matches!(kind, "identifier" | "type_identifier" | "package_identifier")
            || IDENT_KINDS.contains(&kind)
        {
            return TypeExpr::Ident(self.text(node));
        }
        if LITERAL_KINDS.contains(&kind) {
            return TypeExpr::Literal(self.text(node));
        }

        let field = |name: &str| node.child_by_field_name(name).map(|n| self.type_expr(n));
        let boxed = |ty: Option<TypeExpr>| Box::new(ty.unwrap_or_else(|| missing(node)));

        match kind {
            "pointer_type" | "parenthesized_type" | "parenthesized_expression" => {
                let inner = first_named(node).map(|n| self.type_expr(n));
                if kind == "pointer_type" {
                    TypeExpr::Pointer(boxed(inner))
                } else {
                    inner.unwrap_or_else(|| missing(node))
                }
            }
            "slice_type" | "array_type" | "implicit_length_array_type" => {
                TypeExpr::Slice(boxed(field("element")))
            }
            "map_type" => TypeExpr::Map {
                key: boxed(field("key")),
                value: boxed(field("value")),
            },
            "channel_type" => TypeExpr::Chan(boxed(field("value"))),
            "function_type" => {
                let params = node
                    .child_by_field_name("parameters")
                    .map(|list| self.fields(list))
                    .unwrap_or_default();
                let results = match node.child_by_field_name("result") {
                    Some(r) if r.kind() == "parameter_list" => self.fields(r),
                    Some(r) => vec![Field::unnamed(self.type_expr(r))],
                    None => Vec::new(),
                };
                TypeExpr::Func { params, results }
            }
            "interface_type" => TypeExpr::Interface(self.interface_elems(node)),
            "struct_type" => TypeExpr::Struct(self.struct_fields(node)),
            "qualified_type" => match (
                node.child_by_field_name("package"),
                node.child_by_field_name("name"),
            ) {
                (Some(pkg), Some(name)) => TypeExpr::Selector {
                    base: Box::new(TypeExpr::Ident(self.text(pkg))),
                    member: self.text(name),
                },
                _ => missing(node),
            },
            "selector_expression" => match (
                node.child_by_field_name("operand"),
                node.child_by_field_name("field"),
            ) {
                (Some(operand), Some(member)) => TypeExpr::Selector {
                    base: Box::new(self.type_expr(operand)),
                    member: self.text(member),
                },
                _ => missing(node),
            },
            "generic_type" => {
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|list| {
                        let mut cursor = list.walk();
                        list.named_children(&mut cursor)
                            .map(|arg| self.type_arg(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeExpr::Generic {
                    base: boxed(field("type")),
                    args,
                }
            }
            "type_elem" | "constraint_elem" => self.type_arg(node),
            other => TypeExpr::Unsupported(other.to_string()),
        }
    }

    fn type_arg(&self, node: tree_sitter::Node) -> TypeExpr {
        if matches!(node.kind(), "type_elem" | "constraint_elem") {
            let mut cursor = node.walk();
            let parts: Vec<_> = node.named_children(&mut cursor).collect();
            return match parts.as_slice() {
                [single] => self.type_expr(*single),
                _ => TypeExpr::Unsupported(node.kind().to_string()),
            };
        }
        self.type_expr(node)
    }

    fn interface_elems(&self, node: tree_sitter::Node) -> Vec<Field> {
        let mut elems = Vec::new();
        let mut cursor = node.walk();
        for elem in node.named_children(&mut cursor) {
            match elem.kind() {
                "method_elem" | "method_spec" => {
                    let Some(name) = elem.child_by_field_name("name") else {
                        continue;
                    };
                    let params = elem
                        .child_by_field_name("parameters")
                        .map(|list| self.fields(list))
                        .unwrap_or_default();
                    let results = match elem.child_by_field_name("result") {
                        Some(r) if r.kind() == "parameter_list" => self.fields(r),
                        Some(r) => vec![Field::unnamed(self.type_expr(r))],
                        None => Vec::new(),
                    };
                    elems.push(Field {
                        names: vec![self.text(name)],
                        ty: TypeExpr::Func { params, results },
                    });
                }
                "comment" => {}
                _ => elems.push(Field::unnamed(self.type_arg(elem))),
            }
        }
        elems
    }

    fn struct_fields(&self, node: tree_sitter::Node) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut cursor = node.walk();
        let Some(list) = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "field_declaration_list")
        else {
            return fields;
        };

        let mut list_cursor = list.walk();
        for decl in list.named_children(&mut list_cursor) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let Some(ty_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let mut names_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut names_cursor)
                .map(|n| self.text(n))
                .collect();
            let mut ty = self.type_expr(ty_node);
            // Embedded `*T` carries the star as an anonymous sibling.
            let embedded_pointer = names.is_empty()
                && decl.child(0).map(|c| c.kind() == "*").unwrap_or(false);
            if embedded_pointer {
                ty = TypeExpr::Pointer(Box::new(ty));
            }
            fields.push(Field { names, ty });
        }
        fields
    }

    fn block(&self, node: tree_sitter::Node) -> Block {
        let mut stmts = Vec::new();
        self.push_stmts(node, &mut stmts);
        Block {
            stmts,
            span: Span::from_node(node),
        }
    }

    /// Push the lowered named children of `node`, flattening statement lists.
    fn push_stmts(&self, node: tree_sitter::Node, out: &mut Vec<Node>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "statement_list" {
                self.push_stmts(child, out);
            } else {
                out.push(self.node(child));
            }
        }
    }

    fn opt_node(&self, node: tree_sitter::Node, field: &str) -> Option<Box<Node>> {
        node.child_by_field_name(field).map(|n| Box::new(self.node(n)))
    }

    fn node(&self, node: tree_sitter::Node) -> Node {
        if node.is_missing() {
            return Node::Other {
                kind: "MISSING".to_string(),
                children: Vec::new(),
            };
        }

        let kind = node.kind();
        if IDENT_KINDS.contains(&kind) {
            return Node::Ident(self.text(node));
        }
        if LITERAL_KINDS.contains(&kind) {
            return Node::Literal(self.text(node));
        }
        if TYPE_KINDS.contains(&kind) {
            return Node::Type(self.type_expr(node));
        }

        match kind {
            "comment" => Node::Comment(self.text(node)),
            "expression_statement" | "parenthesized_expression" => match first_named(node) {
                Some(inner) => self.node(inner),
                None => self.other(node),
            },
            "unary_expression" => match node.child_by_field_name("operand") {
                Some(operand) => Node::Unary {
                    op: operator(node),
                    operand: Box::new(self.node(operand)),
                },
                None => self.other(node),
            },
            "binary_expression" => match (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some(right)) => Node::Binary {
                    op: operator(node),
                    left: Box::new(self.node(left)),
                    right: Box::new(self.node(right)),
                },
                _ => self.other(node),
            },
            "call_expression" => match node.child_by_field_name("function") {
                Some(function) => {
                    let mut args = Vec::new();
                    if let Some(list) = node.child_by_field_name("arguments") {
                        self.push_stmts(list, &mut args);
                    }
                    Node::Call {
                        function: Box::new(self.node(function)),
                        args,
                    }
                }
                None => self.other(node),
            },
            "selector_expression" => match (
                node.child_by_field_name("operand"),
                node.child_by_field_name("field"),
            ) {
                (Some(operand), Some(field)) => Node::Selector {
                    operand: Box::new(self.node(operand)),
                    field: self.text(field),
                },
                _ => self.other(node),
            },
            "if_statement" => self.if_stmt(node),
            "for_statement" => self.for_stmt(node),
            "expression_switch_statement" | "type_switch_statement" => {
                let (clauses, comments) = self.clauses(node);
                Node::Switch {
                    init: self.opt_node(node, "initializer"),
                    tag: self.opt_node(node, "value"),
                    clauses,
                    comments,
                }
            }
            "select_statement" => {
                let (clauses, comments) = self.clauses(node);
                Node::Select { clauses, comments }
            }
            "block" => Node::Block(self.block(node)),
            "return_statement" => {
                let mut values = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "expression_list" {
                        self.push_stmts(child, &mut values);
                    } else {
                        values.push(self.node(child));
                    }
                }
                Node::Return(values)
            }
            _ => self.other(node),
        }
    }

    fn other(&self, node: tree_sitter::Node) -> Node {
        let mut children = Vec::new();
        self.push_stmts(node, &mut children);
        Node::Other {
            kind: node.kind().to_string(),
            children,
        }
    }

    fn if_stmt(&self, node: tree_sitter::Node) -> Node {
        let cond = self.opt_node(node, "condition").unwrap_or_else(|| {
            Box::new(Node::Other {
                kind: "MISSING".to_string(),
                children: Vec::new(),
            })
        });
        let then = node
            .child_by_field_name("consequence")
            .map(|b| self.block(b))
            .unwrap_or_else(|| empty_block(node));
        Node::If {
            init: self.opt_node(node, "initializer"),
            cond,
            then,
            otherwise: self.opt_node(node, "alternative"),
        }
    }

    fn for_stmt(&self, node: tree_sitter::Node) -> Node {
        let body = node
            .child_by_field_name("body")
            .map(|b| self.block(b))
            .unwrap_or_else(|| empty_block(node));

        let mut cursor = node.walk();
        let header = node
            .named_children(&mut cursor)
            .find(|c| !matches!(c.kind(), "block" | "comment"));

        match header {
            Some(clause) if clause.kind() == "range_clause" => Node::Range {
                left: self.opt_node(clause, "left"),
                target: self.opt_node(clause, "right").unwrap_or_else(|| {
                    Box::new(Node::Other {
                        kind: "MISSING".to_string(),
                        children: Vec::new(),
                    })
                }),
                body,
            },
            Some(clause) if clause.kind() == "for_clause" => Node::For {
                init: self.opt_node(clause, "initializer"),
                cond: self.opt_node(clause, "condition"),
                post: self.opt_node(clause, "update"),
                body,
            },
            Some(cond) => Node::For {
                init: None,
                cond: Some(Box::new(self.node(cond))),
                post: None,
                body,
            },
            None => Node::For {
                init: None,
                cond: None,
                post: None,
                body,
            },
        }
    }

    /// Collect case/default/communication clauses of a switch or select,
    /// plus the comments sitting between them.
    fn clauses(&self, node: tree_sitter::Node) -> (Vec<Clause>, Vec<Node>) {
        let mut clauses = Vec::new();
        let mut comments = Vec::new();
        let mut cursor = node.walk();
        for case in node.named_children(&mut cursor) {
            let kind = match case.kind() {
                "comment" => {
                    comments.push(Node::Comment(self.text(case)));
                    continue;
                }
                "expression_case" | "type_case" => ClauseKind::Case,
                "communication_case" => ClauseKind::Comm,
                "default_case" if node.kind() == "select_statement" => ClauseKind::Comm,
                "default_case" => ClauseKind::Case,
                _ => continue,
            };

            let mut header_ids = HashSet::new();
            let mut exprs = Vec::new();
            for field in ["value", "type", "communication"] {
                let mut field_cursor = case.walk();
                for expr in case.children_by_field_name(field, &mut field_cursor) {
                    header_ids.insert(expr.id());
                    if expr.kind() == "expression_list" {
                        self.push_stmts(expr, &mut exprs);
                    } else {
                        exprs.push(self.node(expr));
                    }
                }
            }

            let mut body = Vec::new();
            let mut body_cursor = case.walk();
            for child in case.named_children(&mut body_cursor) {
                if header_ids.contains(&child.id()) {
                    continue;
                }
                if child.kind() == "statement_list" {
                    self.push_stmts(child, &mut body);
                } else {
                    body.push(self.node(child));
                }
            }

            clauses.push(Clause {
                kind,
                is_default: case.kind() == "default_case",
                exprs,
                body,
            });
        }
        (clauses, comments)
    }
}

fn first_named(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    found
}

fn operator(node: tree_sitter::Node) -> String {
    node.child_by_field_name("operator")
        .map(|op| op.kind().to_string())
        .unwrap_or_default()
}

fn missing(node: tree_sitter::Node) -> TypeExpr {
    TypeExpr::Unsupported(node.kind().to_string())
}

fn empty_block(node: tree_sitter::Node) -> Block {
    Block {
        stmts: Vec::new(),
        span: Span::from_node(node),
    }
}
