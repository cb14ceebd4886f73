//! Version-0 backend: adapts the legacy per-buffer device.
//!
//! Legacy devices allocate one buffer per call and report stride per
//! buffer. The adapter decodes the opaque descriptor (legacy devices cannot
//! parse it), rejects layered requests, and turns the per-call interface
//! into the all-or-nothing batch the capability contract promises: on any
//! mid-batch failure or stride disagreement the buffers already produced
//! are freed before the error is reported.

use std::sync::Arc;

use tracing::{debug, warn};

use skarv_hal::{
    AllocError, AllocatedBuffers, AllocatorHal, BufferDescriptor, DescriptorInfo, RawBufferHandle,
};
use skarv_module::{ModuleError, PlatformModule, V0Device};

pub struct V0Backend {
    device: Box<dyn V0Device>,
}

impl V0Backend {
    /// Opens the module's legacy device. Open failure propagates; no
    /// half-initialized backend is ever produced.
    pub fn with_module(module: &Arc<dyn PlatformModule>) -> Result<Self, ModuleError> {
        Ok(Self {
            device: module.open_v0()?,
        })
    }

    pub fn new(device: Box<dyn V0Device>) -> Self {
        Self { device }
    }

    fn rollback(&self, produced: Vec<RawBufferHandle>) {
        if !produced.is_empty() {
            warn!(
                buffers = produced.len(),
                "rolling back partial batch on legacy device"
            );
        }
        for handle in produced {
            self.device.free(handle);
        }
    }
}

impl AllocatorHal for V0Backend {
    fn dump_debug_info(&self) -> String {
        format!("skarv allocator: version-0 backend\n{}", self.device.dump())
    }

    fn allocate_buffers(
        &self,
        descriptor: &BufferDescriptor,
        count: u32,
    ) -> Result<AllocatedBuffers, AllocError> {
        let info = DescriptorInfo::decode(descriptor)?;
        if info.layer_count > 1 {
            // Legacy devices are single-layer only.
            return Err(AllocError::Unsupported);
        }

        debug!(count, width = info.width, height = info.height, "legacy batch allocation");

        let mut stride = 0u32;
        let mut buffers = Vec::with_capacity(count as usize);
        for produced in 0..count {
            match self
                .device
                .alloc(info.width, info.height, info.format, info.usage)
            {
                Ok((handle, buffer_stride)) => {
                    if produced == 0 {
                        stride = buffer_stride;
                    } else if buffer_stride != stride {
                        self.device.free(handle);
                        self.rollback(buffers);
                        return Err(AllocError::BadValue("stride varies within batch"));
                    }
                    buffers.push(handle);
                }
                Err(err) => {
                    self.rollback(buffers);
                    return Err(err.into());
                }
            }
        }

        Ok(AllocatedBuffers { stride, buffers })
    }

    fn free_buffers(&self, buffers: Vec<RawBufferHandle>) {
        for handle in buffers {
            self.device.free(handle);
        }
    }
}
