//! Module-lookup and raw-device failure kinds.

use skarv_hal::AllocError;
use thiserror::Error;

/// Failures while locating or opening an installed module.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("no allocation module installed under id '{0}'")]
    NotInstalled(String),

    #[error("an allocation module is already installed under id '{0}'")]
    AlreadyInstalled(String),

    #[error("module '{id}' does not provide a generation-{generation} device")]
    DeviceUnavailable { id: String, generation: u32 },
}

/// Failures reported by a raw allocation device.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("device buffer pool exhausted")]
    Exhausted,

    #[error("bad device parameter: {0}")]
    BadParameter(&'static str),

    #[error("device rejected the descriptor")]
    BadDescriptor,

    #[error("device failure: {0}")]
    Failure(String),
}

impl From<DeviceError> for AllocError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Exhausted => AllocError::NoResources,
            DeviceError::BadParameter(what) => AllocError::BadValue(what),
            DeviceError::BadDescriptor => AllocError::BadDescriptor,
            DeviceError::Failure(detail) => AllocError::Device(detail),
        }
    }
}
