//! The installed-module contract and its version-marker convention.

use std::sync::Arc;

use crate::device::{V0Device, V1Device};
use crate::error::ModuleError;

/// Well-known registry id under which the platform allocation module is
/// installed.
pub const ALLOC_MODULE_ID: &str = "skarv.alloc";

/// Packs a module api version: major in the high byte, minor in the low.
pub const fn make_api_version(major: u8, minor: u8) -> u32 {
    ((major as u32) << 8) | minor as u32
}

/// Extracts the major api version used for backend dispatch: the high byte
/// after an 8-bit right shift.
pub const fn major_api_version(raw: u32) -> u32 {
    (raw >> 8) & 0xff
}

/// An installed allocation module.
///
/// A module advertises one packed api version and provides the device
/// generation matching it; opening the other generation fails. The default
/// implementations let a module implement only the generation it ships.
pub trait PlatformModule: Send + Sync {
    /// Registry id this module installs under.
    fn id(&self) -> &str;

    /// Packed api version; the high byte selects the backend.
    fn api_version(&self) -> u32;

    /// Opens the legacy per-buffer device (generation 0).
    fn open_v0(&self) -> Result<Box<dyn V0Device>, ModuleError> {
        Err(ModuleError::DeviceUnavailable {
            id: self.id().to_string(),
            generation: 0,
        })
    }

    /// Opens the descriptor-native device (generation 1).
    fn open_v1(&self) -> Result<Box<dyn V1Device>, ModuleError> {
        Err(ModuleError::DeviceUnavailable {
            id: self.id().to_string(),
            generation: 1,
        })
    }
}

/// Convenience alias for the shared module references the registry hands
/// out.
pub type ModuleRef = Arc<dyn PlatformModule>;
