//! # skarv-backends
//!
//! The concrete backend adapters behind the allocation front end: one per
//! installed-module generation, each translating the stable
//! [`AllocatorHal`](skarv_hal::AllocatorHal) contract onto its raw device
//! interface.
//!
//! - [`V0Backend`]: drives the legacy per-buffer device; decodes the
//!   descriptor itself, loops over single allocations, and rolls the batch
//!   back on any mid-batch failure.
//! - [`V1Backend`]: drives the descriptor-native device; manages the
//!   device-side descriptor lifecycle and enforces stride uniformity over
//!   the batch.
//!
//! The loader in `skarv-service` constructs exactly one of these per
//! process.

pub mod v0;
pub mod v1;

pub use v0::V0Backend;
pub use v1::V1Backend;
