//! Simulated devices for both module generations.
//!
//! Both devices run against the same shared [`SimState`], so a module
//! opened as generation 0 or generation 1 exposes the same ledger to
//! tests. Buffers are tokens only; nothing is mapped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use skarv_hal::{DescriptorInfo, RawBufferHandle};
use skarv_module::{DeviceError, V0Device, V1Device};

use crate::heap::SimState;

/// Legacy per-buffer device over the sim heap.
pub struct SimV0Device {
    state: Arc<SimState>,
}

impl SimV0Device {
    pub(crate) fn new(state: Arc<SimState>) -> Self {
        Self { state }
    }
}

impl V0Device for SimV0Device {
    fn alloc(
        &self,
        width: u32,
        height: u32,
        _format: u32,
        _usage: u64,
    ) -> Result<(RawBufferHandle, u32), DeviceError> {
        let _call = self.state.begin_call();
        self.state.note_alloc_call();
        if width == 0 || height == 0 {
            return Err(DeviceError::BadParameter("zero dimension"));
        }
        self.state.heap.lock().allocate_one(width)
    }

    fn free(&self, handle: RawBufferHandle) {
        let _call = self.state.begin_call();
        self.state.heap.lock().free_one(handle);
    }

    fn dump(&self) -> String {
        // No begin_call here: the front end's debug path is unsynchronized
        // and must not register as an overlapping device call.
        dump_heap("generation-0 (legacy)", &self.state)
    }
}

/// Descriptor-native batch device over the sim heap.
pub struct SimV1Device {
    state: Arc<SimState>,
    descriptors: Mutex<DescriptorTable>,
}

#[derive(Default)]
struct DescriptorTable {
    next_id: u64,
    entries: HashMap<u64, DescriptorInfo>,
}

impl SimV1Device {
    pub(crate) fn new(state: Arc<SimState>) -> Self {
        Self {
            state,
            descriptors: Mutex::new(DescriptorTable::default()),
        }
    }
}

impl V1Device for SimV1Device {
    fn create_descriptor(&self, info: &DescriptorInfo) -> Result<u64, DeviceError> {
        if info.width == 0 || info.height == 0 || info.layer_count == 0 {
            return Err(DeviceError::BadParameter("zero dimension"));
        }
        let mut table = self.descriptors.lock();
        table.next_id += 1;
        let id = table.next_id;
        table.entries.insert(id, *info);
        Ok(id)
    }

    fn destroy_descriptor(&self, descriptor: u64) {
        self.descriptors.lock().entries.remove(&descriptor);
    }

    fn allocate(&self, descriptor: u64, count: u32) -> Result<Vec<RawBufferHandle>, DeviceError> {
        let _call = self.state.begin_call();
        self.state.note_alloc_call();
        let info = *self
            .descriptors
            .lock()
            .entries
            .get(&descriptor)
            .ok_or(DeviceError::BadDescriptor)?;

        let mut heap = self.state.heap.lock();
        let mut handles = Vec::with_capacity(count as usize);
        for _ in 0..count {
            match heap.allocate_one(info.width) {
                Ok((handle, _)) => handles.push(handle),
                Err(err) => {
                    // Batch allocation is all-or-nothing at the device.
                    for handle in handles {
                        heap.free_one(handle);
                    }
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }

    fn stride(&self, handle: &RawBufferHandle) -> Result<u32, DeviceError> {
        self.state.heap.lock().stride_of(handle)
    }

    fn release(&self, handle: RawBufferHandle) {
        let _call = self.state.begin_call();
        self.state.heap.lock().free_one(handle);
    }

    fn dump(&self) -> String {
        dump_heap("generation-1 (descriptor)", &self.state)
    }
}

fn dump_heap(generation: &str, state: &SimState) -> String {
    let heap = state.heap.lock();
    format!(
        "sim allocation module\n  device: {}\n  live buffers: {}\n  freed buffers: {}\n  capacity: {}\n  stride align: {}\n  double frees: {}",
        generation,
        heap.live_len(),
        heap.freed().len(),
        heap.config().capacity,
        heap.config().stride_align,
        heap.double_frees(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimConfig;

    fn descriptor(width: u32, height: u32) -> DescriptorInfo {
        DescriptorInfo {
            width,
            height,
            format: 1,
            layer_count: 1,
            usage: 0,
        }
    }

    #[test]
    fn v0_rejects_zero_dimensions() {
        let device = SimV0Device::new(Arc::new(SimState::new(SimConfig::default())));
        assert_eq!(
            device.alloc(0, 32, 1, 0).unwrap_err(),
            DeviceError::BadParameter("zero dimension")
        );
    }

    #[test]
    fn v1_descriptor_lifecycle() {
        let device = SimV1Device::new(Arc::new(SimState::new(SimConfig::default())));
        let id = device.create_descriptor(&descriptor(16, 16)).unwrap();
        let second = device.create_descriptor(&descriptor(8, 8)).unwrap();
        assert_ne!(id, second);
        let handles = device.allocate(id, 2).unwrap();
        assert_eq!(handles.len(), 2);
        device.destroy_descriptor(id);
        assert_eq!(
            device.allocate(id, 1).unwrap_err(),
            DeviceError::BadDescriptor
        );
        for handle in handles {
            device.release(handle);
        }
    }

    #[test]
    fn v1_batch_is_all_or_nothing() {
        let state = Arc::new(SimState::new(SimConfig {
            capacity: 2,
            ..SimConfig::default()
        }));
        let device = SimV1Device::new(state.clone());
        let id = device.create_descriptor(&descriptor(16, 16)).unwrap();
        assert_eq!(device.allocate(id, 3).unwrap_err(), DeviceError::Exhausted);
        // The partial batch was unwound inside the device.
        assert_eq!(state.heap.lock().live_len(), 0);
    }

    #[test]
    fn v1_rejects_oversized_width() {
        let state = Arc::new(SimState::new(SimConfig::default()));
        let device = SimV1Device::new(state.clone());
        let id = device.create_descriptor(&descriptor(0x4000_0000, 1)).unwrap();
        assert_eq!(
            device.allocate(id, 1).unwrap_err(),
            DeviceError::BadParameter("width too large")
        );
        assert_eq!(state.heap.lock().live_len(), 0);
    }

    #[test]
    fn v1_stride_matches_alignment() {
        let device = SimV1Device::new(Arc::new(SimState::new(SimConfig {
            stride_align: 64,
            ..SimConfig::default()
        })));
        let id = device.create_descriptor(&descriptor(10, 4)).unwrap();
        let handles = device.allocate(id, 1).unwrap();
        assert_eq!(device.stride(&handles[0]).unwrap(), 64);
    }

    #[test]
    fn dump_reports_ledger_counts() {
        let state = Arc::new(SimState::new(SimConfig::default()));
        let device = SimV0Device::new(state.clone());
        let (handle, _) = device.alloc(8, 8, 1, 0).unwrap();
        let dump = device.dump();
        assert!(dump.contains("live buffers: 1"));
        device.free(handle);
        assert!(device.dump().contains("freed buffers: 1"));
    }
}
