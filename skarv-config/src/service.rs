//! Front-end and loader configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Allocation service parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ServiceConfig {
    /// Registry id the loader probes for an allocation module.
    #[serde(default = "default_module_id")]
    #[validate(custom(function = validation::validate_module_id))]
    pub module_id: String,
}

fn default_module_id() -> String {
    "skarv.alloc".into()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            module_id: default_module_id(),
        }
    }
}
