//! Language-specific front-end implementations.

mod go;

pub use go::GoFrontend;

use super::LanguageFrontend;
use once_cell::sync::OnceCell;

/// Static storage for Go front-end.
static GO_FRONTEND: OnceCell<GoFrontend> = OnceCell::new();

/// Register all available language front-ends.
///
/// This is idempotent - calling it multiple times is safe.
pub fn register_frontends() {
    GO_FRONTEND.get_or_init(GoFrontend::new);
}

/// Get a front-end for the given file extension.
///
/// Returns None if no front-end is registered for the extension.
pub fn get_frontend(ext: &str) -> Option<&'static dyn LanguageFrontend> {
    register_frontends();

    match ext {
        "go" => GO_FRONTEND
            .get()
            .map(|f| f as &'static dyn LanguageFrontend),
        _ => None,
    }
}
