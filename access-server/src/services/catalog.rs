//! Module catalog loading
//!
//! The built-in catalog is used unless `CATALOG_PATH` points at a JSON
//! definition. A malformed override aborts startup instead of silently
//! falling back.

use std::path::Path;

use shared::access::ModuleCatalog;

use crate::utils::{AppError, AppResult};

/// Load the catalog from `path`, or the built-in one when `None`
pub fn load_catalog(path: Option<&str>) -> AppResult<ModuleCatalog> {
    let Some(path) = path else {
        let catalog = ModuleCatalog::builtin();
        tracing::info!(pairs = catalog.len(), "Using built-in module catalog");
        return Ok(catalog);
    };

    let raw = std::fs::read_to_string(Path::new(path))
        .map_err(|e| AppError::config(format!("Cannot read module catalog {path}: {e}")))?;
    let catalog = ModuleCatalog::from_json(&raw)?;
    tracing::info!(
        path = path,
        modules = catalog.modules().count(),
        pairs = catalog.len(),
        "Module catalog loaded"
    );
    Ok(catalog)
}
