//! # skarv-hal
//!
//! Capability contract between the skarv allocation front end and the
//! concrete allocation backends, plus the buffer data model shared across
//! the workspace.
//!
//! ### Key Submodules:
//! - `hal`: the [`AllocatorHal`] trait every backend implements
//! - `descriptor`: opaque buffer descriptors and their wire codec
//! - `handle`: backend-local vs. caller-facing buffer references
//! - `error`: per-call allocation failure kinds
//!
//! The front end never interprets descriptor contents and never clones a
//! backend-local handle; those rules are encoded in the types here rather
//! than left to convention.

pub mod descriptor;
pub mod error;
pub mod hal;
pub mod handle;

pub mod prelude {
    pub use crate::descriptor::*;
    pub use crate::error::*;
    pub use crate::hal::*;
    pub use crate::handle::*;
}

pub use descriptor::{BufferDescriptor, DescriptorError, DescriptorInfo};
pub use error::AllocError;
pub use hal::{AllocatedBuffers, AllocatorHal, BufferBatch};
pub use handle::{BufferHandle, RawBufferHandle};
