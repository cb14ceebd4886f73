//! Version-1 backend: adapts the descriptor-native device.
//!
//! Generation-1 devices consume device-side descriptor objects and allocate
//! in batches, but report stride per buffer through a separate query. The
//! adapter owns the descriptor lifecycle (a created descriptor is always
//! destroyed, on success and on every failure path) and enforces a uniform
//! stride across the batch, releasing every handle if the device disagrees
//! with itself.

use std::sync::Arc;

use tracing::{debug, warn};

use skarv_hal::{
    AllocError, AllocatedBuffers, AllocatorHal, BufferDescriptor, DescriptorInfo, RawBufferHandle,
};
use skarv_module::{DeviceError, ModuleError, PlatformModule, V1Device};

pub struct V1Backend {
    device: Box<dyn V1Device>,
}

impl V1Backend {
    /// Opens the module's descriptor-native device. Open failure
    /// propagates; no half-initialized backend is ever produced.
    pub fn with_module(module: &Arc<dyn PlatformModule>) -> Result<Self, ModuleError> {
        Ok(Self {
            device: module.open_v1()?,
        })
    }

    pub fn new(device: Box<dyn V1Device>) -> Self {
        Self { device }
    }

    fn release_all(&self, buffers: Vec<RawBufferHandle>) {
        warn!(buffers = buffers.len(), "releasing inconsistent batch");
        for handle in buffers {
            self.device.release(handle);
        }
    }

    fn allocate_with_descriptor(
        &self,
        device_descriptor: u64,
        count: u32,
    ) -> Result<AllocatedBuffers, AllocError> {
        let buffers = self.device.allocate(device_descriptor, count)?;

        let mut stride = 0u32;
        let mut mismatch = false;
        let mut failure: Option<DeviceError> = None;
        for (index, handle) in buffers.iter().enumerate() {
            match self.device.stride(handle) {
                Ok(first) if index == 0 => stride = first,
                Ok(same) if same == stride => {}
                Ok(_) => {
                    mismatch = true;
                    break;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            self.release_all(buffers);
            return Err(err.into());
        }
        if mismatch {
            self.release_all(buffers);
            return Err(AllocError::BadValue("stride varies within batch"));
        }

        Ok(AllocatedBuffers { stride, buffers })
    }
}

impl AllocatorHal for V1Backend {
    fn dump_debug_info(&self) -> String {
        format!("skarv allocator: version-1 backend\n{}", self.device.dump())
    }

    fn allocate_buffers(
        &self,
        descriptor: &BufferDescriptor,
        count: u32,
    ) -> Result<AllocatedBuffers, AllocError> {
        let info = DescriptorInfo::decode(descriptor)?;
        debug!(count, width = info.width, height = info.height, "descriptor batch allocation");

        let device_descriptor = self.device.create_descriptor(&info)?;
        let allocated = self.allocate_with_descriptor(device_descriptor, count);
        // The device-side descriptor never outlives the call.
        self.device.destroy_descriptor(device_descriptor);
        allocated
    }

    fn free_buffers(&self, buffers: Vec<RawBufferHandle>) {
        for handle in buffers {
            self.device.release(handle);
        }
    }
}
