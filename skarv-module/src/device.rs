//! Raw per-generation device interfaces.
//!
//! The two generations are mutually incompatible; the adapters in
//! `skarv-backends` bridge each one to the common allocator interface.
//! Generation 0 is the legacy shape: one buffer per call, unpacked
//! parameters, stride reported at allocation time. Generation 1 is
//! descriptor-native: device-side descriptor objects, batch allocation, and
//! a separate stride query.

use skarv_hal::{DescriptorInfo, RawBufferHandle};

use crate::error::DeviceError;

/// Legacy allocation device (module generation 0).
pub trait V0Device: Send + Sync {
    /// Allocates a single buffer, returning its handle and stride. Legacy
    /// devices know nothing of layered buffers.
    fn alloc(
        &self,
        width: u32,
        height: u32,
        format: u32,
        usage: u64,
    ) -> Result<(RawBufferHandle, u32), DeviceError>;

    /// Releases one previously allocated buffer. Best-effort.
    fn free(&self, handle: RawBufferHandle);

    /// Human-readable device state. Must not mutate device state.
    fn dump(&self) -> String;
}

/// Descriptor-native allocation device (module generation 1).
pub trait V1Device: Send + Sync {
    /// Materializes a device-side descriptor object.
    fn create_descriptor(&self, info: &DescriptorInfo) -> Result<u64, DeviceError>;

    /// Destroys a device-side descriptor object. Best-effort.
    fn destroy_descriptor(&self, descriptor: u64);

    /// Allocates `count` buffers for the given descriptor, all-or-nothing.
    fn allocate(&self, descriptor: u64, count: u32) -> Result<Vec<RawBufferHandle>, DeviceError>;

    /// Reports the stride of a live buffer.
    fn stride(&self, handle: &RawBufferHandle) -> Result<u32, DeviceError>;

    /// Releases one previously allocated buffer. Best-effort.
    fn release(&self, handle: RawBufferHandle);

    /// Human-readable device state. Must not mutate device state.
    fn dump(&self) -> String;
}
