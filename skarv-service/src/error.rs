//! Loader failure kinds.

use thiserror::Error;

use skarv_module::ModuleError;

/// Failures while probing the platform module and building a backend.
///
/// None of these leave a partially initialized service behind: the loader
/// either returns a working [`Allocator`](crate::Allocator) or nothing.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("no allocation module available: {0}")]
    ModuleNotFound(#[source] ModuleError),

    #[error("unsupported allocation module version {major} (raw {raw:#06x})")]
    UnsupportedVersion { major: u32, raw: u32 },

    #[error("allocation backend initialization failed: {0}")]
    BackendInit(#[source] ModuleError),
}
