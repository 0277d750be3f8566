//! Memoized canonical rendering of type expressions.

use std::collections::HashMap;
use std::sync::RwLock;

use super::syntax::{Field, TypeExpr};

/// Default number of rendered expressions kept before the cache stops growing.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Thread-safe cache from type expression to its canonical string.
///
/// Lookups take the read lock; a miss renders without holding any lock, then
/// takes the write lock and re-checks before inserting so concurrent callers
/// agree on a single stored value.
pub struct TypeStringCache {
    entries: RwLock<HashMap<TypeExpr, String>>,
    capacity: usize,
}

impl TypeStringCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache that stores at most `capacity` renderings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Render `expr`, reusing a stored rendering when available.
    pub fn render(&self, expr: &TypeExpr) -> String {
        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(expr) {
                return hit.clone();
            }
        }

        let rendered = self.render_uncached(expr);

        let Ok(mut entries) = self.entries.write() else {
            return rendered;
        };
        if let Some(existing) = entries.get(expr) {
            return existing.clone();
        }
        if entries.len() < self.capacity {
            entries.insert(expr.clone(), rendered.clone());
        }
        rendered
    }

    /// Number of stored renderings.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render_uncached(&self, expr: &TypeExpr) -> String {
        match expr {
            TypeExpr::Ident(name) => name.clone(),
            TypeExpr::Pointer(inner) => format!("*{}", self.render(inner)),
            TypeExpr::Slice(elem) => format!("[]{}", self.render(elem)),
            TypeExpr::Map { key, value } => {
                format!("map[{}]{}", self.render(key), self.render(value))
            }
            TypeExpr::Chan(elem) => format!("chan {}", self.render(elem)),
            TypeExpr::Func { params, results } => {
                let mut out = format!("func({})", self.join(params, ", "));
                if !results.is_empty() {
                    out.push_str(&format!(" ({})", self.join(results, ", ")));
                }
                out
            }
            TypeExpr::Interface(methods) => format!("interface{{{}}}", self.join(methods, "; ")),
            TypeExpr::Struct(fields) => format!("struct{{{}}}", self.join(fields, "; ")),
            TypeExpr::Literal(raw) => raw.clone(),
            TypeExpr::Selector { base, member } => format!("{}.{}", self.render(base), member),
            TypeExpr::Variadic(elem) => format!("...{}", self.render(elem)),
            TypeExpr::Generic { base, args } => {
                let args: Vec<String> = args.iter().map(|a| self.render(a)).collect();
                format!("{}[{}]", self.render(base), args.join(", "))
            }
            TypeExpr::Unsupported(kind) => format!("<{}>", kind),
        }
    }

    fn join(&self, fields: &[Field], sep: &str) -> String {
        fields
            .iter()
            .map(|f| self.render(&f.ty))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl Default for TypeStringCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn ident(name: &str) -> TypeExpr {
        TypeExpr::Ident(name.to_string())
    }

    fn boxed(name: &str) -> Box<TypeExpr> {
        Box::new(ident(name))
    }

    #[test]
    fn test_render_composites() {
        let cache = TypeStringCache::new();

        assert_eq!(cache.render(&TypeExpr::Pointer(boxed("Server"))), "*Server");
        assert_eq!(cache.render(&TypeExpr::Slice(boxed("byte"))), "[]byte");
        assert_eq!(
            cache.render(&TypeExpr::Map {
                key: boxed("string"),
                value: Box::new(TypeExpr::Slice(boxed("int"))),
            }),
            "map[string][]int"
        );
        assert_eq!(cache.render(&TypeExpr::Chan(boxed("error"))), "chan error");
        assert_eq!(
            cache.render(&TypeExpr::Selector {
                base: boxed("http"),
                member: "Handler".to_string(),
            }),
            "http.Handler"
        );
        assert_eq!(cache.render(&TypeExpr::Literal("42".to_string())), "42");
    }

    #[test]
    fn test_render_func_interface_struct() {
        let cache = TypeStringCache::new();

        let func = TypeExpr::Func {
            params: vec![Field::unnamed(ident("int")), Field::unnamed(ident("string"))],
            results: vec![Field::unnamed(ident("error"))],
        };
        assert_eq!(cache.render(&func), "func(int, string) (error)");

        let no_results = TypeExpr::Func {
            params: Vec::new(),
            results: Vec::new(),
        };
        assert_eq!(cache.render(&no_results), "func()");

        let iface = TypeExpr::Interface(vec![Field {
            names: vec!["Run".to_string()],
            ty: func.clone(),
        }]);
        assert_eq!(cache.render(&iface), "interface{func(int, string) (error)}");

        let st = TypeExpr::Struct(vec![
            Field {
                names: vec!["a".to_string(), "b".to_string()],
                ty: ident("int"),
            },
            Field::unnamed(TypeExpr::Pointer(boxed("Base"))),
        ]);
        assert_eq!(cache.render(&st), "struct{int; *Base}");
    }

    #[test]
    fn test_render_unsupported_is_tagged() {
        let cache = TypeStringCache::new();
        let rendered = cache.render(&TypeExpr::Unsupported("call_expression".to_string()));
        assert_eq!(rendered, "<call_expression>");
    }

    #[test]
    fn test_hits_reuse_stored_value() {
        let cache = TypeStringCache::new();
        let expr = TypeExpr::Pointer(boxed("Config"));

        let first = cache.render(&expr);
        let stored = cache.len();
        let second = cache.render(&expr);

        assert_eq!(first, second);
        assert_eq!(cache.len(), stored, "a hit must not insert again");
        // Both the pointer and its target were memoized.
        assert_eq!(stored, 2);
    }

    #[test]
    fn test_capacity_bound() {
        let cache = TypeStringCache::with_capacity(1);
        cache.render(&ident("a"));
        cache.render(&ident("b"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.render(&ident("b")), "b");
    }

    #[test]
    fn test_concurrent_renders_agree() {
        let cache = Arc::new(TypeStringCache::new());
        let expr = TypeExpr::Map {
            key: boxed("string"),
            value: Box::new(TypeExpr::Chan(boxed("int"))),
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let expr = expr.clone();
                thread::spawn(move || cache.render(&expr))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "map[string]chan int");
        }
        assert_eq!(cache.len(), 4);
    }
}
