//! Simulated module configuration.
//!
//! Only the CLI installs the simulated module; services embedding a real
//! platform module ignore this section.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Parameters for the simulated allocation module.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SimSettings {
    /// Maximum number of live buffers.
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 65536))]
    pub capacity: usize,

    /// Stride alignment in bytes (must be a power of two).
    #[serde(default = "default_stride_align")]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub stride_align: u32,

    /// Packed api version the module advertises (major in the high byte).
    #[serde(default = "default_api_version")]
    #[validate(range(max = 65535))]
    pub api_version: u32,
}

fn default_capacity() -> usize {
    64
}

fn default_stride_align() -> u32 {
    64
}

fn default_api_version() -> u32 {
    0x0100
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            stride_align: default_stride_align(),
            api_version: default_api_version(),
        }
    }
}
