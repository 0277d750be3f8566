//! Entity extraction from one lowered source file.

use std::collections::HashSet;

use super::duplicate::canonicalize;
use super::facts::{
    FileFacts, FunctionRecord, GlobalRecord, ImportRecord, InterfaceRecord, StructRecord,
};
use super::syntax::{walk_node, Decl, Field, FuncDecl, Node, SourceFile, TypeExpr, Visitor};
use super::type_cache::TypeStringCache;
use crate::metrics::{self, Metrics};

/// Turns a [`SourceFile`] into records, rendering types through a shared cache.
pub struct EntityExtractor<'a> {
    cache: &'a TypeStringCache,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(cache: &'a TypeStringCache) -> Self {
        Self { cache }
    }

    /// Extract every record from `file`, reporting paths as `rel_path`.
    ///
    /// Function metrics are complete except for the maintainability index,
    /// which waits for the duplicate flag.
    pub fn extract(&self, file: &SourceFile, rel_path: &str) -> FileFacts {
        let mut facts = FileFacts {
            path: rel_path.to_string(),
            package: file.package.clone(),
            ..Default::default()
        };

        // Imports and globals first so function bodies can be checked against them.
        for decl in &file.decls {
            match decl {
                Decl::Import(import) => facts.imports.push(ImportRecord {
                    path: import.path.clone(),
                    file: rel_path.to_string(),
                    package: file.package.clone(),
                }),
                Decl::Value(spec) => {
                    let ty = spec
                        .ty
                        .as_ref()
                        .map(|t| self.cache.render(t))
                        .unwrap_or_default();
                    for (i, name) in spec.names.iter().enumerate() {
                        let value = spec
                            .values
                            .get(i)
                            .map(|v| self.cache.render(v))
                            .unwrap_or_default();
                        facts.globals.push(GlobalRecord {
                            name: name.clone(),
                            ty: ty.clone(),
                            value,
                            file: rel_path.to_string(),
                            package: file.package.clone(),
                        });
                    }
                }
                Decl::Type(spec) => match &spec.ty {
                    TypeExpr::Struct(_) => facts.structs.push(StructRecord {
                        name: spec.name.clone(),
                        file: rel_path.to_string(),
                        package: file.package.clone(),
                    }),
                    TypeExpr::Interface(elems) => facts.interfaces.push(InterfaceRecord {
                        name: spec.name.clone(),
                        file: rel_path.to_string(),
                        package: file.package.clone(),
                        methods: elems.iter().flat_map(|e| e.names.iter().cloned()).collect(),
                    }),
                    _ => {}
                },
                Decl::Func(_) => {}
            }
        }

        let scope = FileScope::new(file, &facts.globals);
        for decl in &file.decls {
            if let Decl::Func(func) = decl {
                let record = self.function(func, file, rel_path, &scope);
                if !record.receiver_struct.is_empty() {
                    facts
                        .methods_by_struct
                        .push((record.receiver_struct.clone(), record.name.clone()));
                }
                facts.functions.push(record);
            }
        }

        facts
    }

    fn function(
        &self,
        func: &FuncDecl,
        file: &SourceFile,
        rel_path: &str,
        scope: &FileScope,
    ) -> FunctionRecord {
        let receiver_struct = func
            .receiver
            .as_ref()
            .and_then(receiver_name)
            .unwrap_or_default();

        let qualified_name = if receiver_struct.is_empty() {
            format!("{}.{}", file.package, func.name)
        } else {
            format!("{}.{}.{}", file.package, receiver_struct, func.name)
        };

        let mut refs = BodyRefs {
            cache: self.cache,
            scope,
            callees: Ordered::default(),
            globals: Ordered::default(),
            dependencies: Ordered::default(),
        };

        let (metrics, fingerprint) = match &func.body {
            Some(body) => {
                refs.visit_block(body);
                let measured = metrics::measure(body);
                if measured.has_errors {
                    (Metrics::zeroed(), None)
                } else {
                    (measured.metrics, Some(canonicalize(body)))
                }
            }
            None => (Metrics::zeroed(), None),
        };

        let mut record = FunctionRecord {
            qualified_name,
            callees: refs.callees.0,
            file: rel_path.to_string(),
            package: file.package.clone(),
            params: self.field_types(&func.params),
            returns: self.field_types(&func.results),
            is_method: func.receiver.is_some(),
            receiver_struct,
            is_recursive: false,
            is_duplicate: false,
            cyclomatic_complexity: 0,
            lines_of_code: 0,
            referenced_globals: refs.globals.0,
            dependencies: refs.dependencies.0,
            metrics,
            name: func.name.clone(),
            line: func.span.start_line,
            fingerprint,
        };
        record.sync_metrics();
        record
    }

    /// One rendered type per declared name (or per unnamed field).
    fn field_types(&self, fields: &[Field]) -> Vec<String> {
        let mut out = Vec::new();
        for field in fields {
            let rendered = self.cache.render(&field.ty);
            let count = field.names.len().max(1);
            out.extend(std::iter::repeat(rendered).take(count));
        }
        out
    }
}

/// Struct name behind a receiver type (`*Stack[T]` -> `Stack`).
fn receiver_name(ty: &TypeExpr) -> Option<String> {
    match ty {
        TypeExpr::Ident(name) => Some(name.clone()),
        TypeExpr::Pointer(inner) => receiver_name(inner),
        TypeExpr::Generic { base, .. } => receiver_name(base),
        _ => None,
    }
}

/// File-level names visible to function bodies.
struct FileScope {
    globals: HashSet<String>,
    /// (local package name, import path)
    imports: Vec<(String, String)>,
}

impl FileScope {
    fn new(file: &SourceFile, globals: &[GlobalRecord]) -> Self {
        let imports = file
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Import(i) => Some((i.local_name().to_string(), i.path.clone())),
                _ => None,
            })
            .collect();
        Self {
            globals: globals.iter().map(|g| g.name.clone()).collect(),
            imports,
        }
    }
}

/// Insertion-ordered set of strings.
#[derive(Default)]
struct Ordered(Vec<String>);

impl Ordered {
    fn push(&mut self, value: &str) {
        if !self.0.iter().any(|v| v == value) {
            self.0.push(value.to_string());
        }
    }
}

/// Collects callees, referenced globals and import dependencies of a body.
struct BodyRefs<'a> {
    cache: &'a TypeStringCache,
    scope: &'a FileScope,
    callees: Ordered,
    globals: Ordered,
    dependencies: Ordered,
}

impl Visitor for BodyRefs<'_> {
    fn visit_node(&mut self, node: &Node) {
        match node {
            Node::Call { function, .. } => match function.as_ref() {
                Node::Ident(name) => self.callees.push(name),
                Node::Selector { .. } => {
                    let rendered = self.cache.render(&as_type_expr(function));
                    self.callees.push(&rendered);
                }
                _ => {}
            },
            Node::Ident(name) if self.scope.globals.contains(name) => self.globals.push(name),
            Node::Selector { operand, .. } => {
                if let Node::Ident(base) = operand.as_ref() {
                    for (local, path) in &self.scope.imports {
                        if local == base {
                            self.dependencies.push(path);
                        }
                    }
                }
            }
            _ => {}
        }
        walk_node(self, node);
    }
}

/// View a selector chain as a renderable expression.
fn as_type_expr(node: &Node) -> TypeExpr {
    match node {
        Node::Ident(name) => TypeExpr::Ident(name.clone()),
        Node::Literal(raw) => TypeExpr::Literal(raw.clone()),
        Node::Selector { operand, field } => TypeExpr::Selector {
            base: Box::new(as_type_expr(operand)),
            member: field.clone(),
        },
        Node::Type(ty) => ty.clone(),
        Node::Call { .. } => TypeExpr::Unsupported("call_expression".to_string()),
        Node::Other { kind, .. } => TypeExpr::Unsupported(kind.clone()),
        _ => TypeExpr::Unsupported("expression".to_string()),
    }
}
