//! Process-wide named module table.
//!
//! Modules are installed once at process start and never replaced; the
//! loader acquires one by its well-known id. Install-once matches the
//! service invariant that the selected backend is never swapped.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::ModuleError;
use crate::module::ModuleRef;

static MODULES: Lazy<RwLock<HashMap<String, ModuleRef>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Installs a module under its own id. A second install under the same id
/// is rejected; modules are never swapped at runtime.
pub fn install(module: ModuleRef) -> Result<(), ModuleError> {
    let id = module.id().to_string();
    let mut table = MODULES.write();
    if table.contains_key(&id) {
        return Err(ModuleError::AlreadyInstalled(id));
    }
    info!(
        module = %id,
        api_version = format_args!("{:#06x}", module.api_version()),
        "allocation module installed"
    );
    table.insert(id, module);
    Ok(())
}

/// Acquires the module installed under `id`.
pub fn acquire(id: &str) -> Result<ModuleRef, ModuleError> {
    let table = MODULES.read();
    match table.get(id) {
        Some(module) => {
            debug!(module = %id, "allocation module acquired");
            Ok(module.clone())
        }
        None => Err(ModuleError::NotInstalled(id.to_string())),
    }
}
