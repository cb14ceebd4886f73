//! # skarv-module
//!
//! The platform edge of the allocation service: the convention by which an
//! installed allocation module is found, version-probed, and opened.
//!
//! ### Key Submodules:
//! - `module`: the [`PlatformModule`] trait and api-version packing
//! - `registry`: process-wide named module table
//! - `device`: the raw, mutually incompatible per-generation device
//!   interfaces legacy backends drive
//! - `error`: module and device failure kinds
//!
//! Real platform modules register themselves here at process start; the
//! loader in `skarv-service` acquires one by its well-known id and never
//! looks at it again.

pub mod device;
pub mod error;
pub mod module;
pub mod registry;

pub use device::{V0Device, V1Device};
pub use error::{DeviceError, ModuleError};
pub use module::{make_api_version, major_api_version, ModuleRef, PlatformModule, ALLOC_MODULE_ID};
