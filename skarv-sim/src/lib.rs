//! # skarv-sim
//!
//! A deterministic in-memory allocation module for tests, benches, and the
//! CLI. Buffers are opaque tokens over a bookkeeping heap; no memory is
//! actually mapped. The module can present itself as either device
//! generation, and its shared state records everything the service did to
//! it: freed tokens in order, double-free attempts, and whether any two
//! serialized device calls ever overlapped.
//!
//! ### Key Submodules:
//! - `heap`: the token ledger and the call-overlap detector
//! - `device`: [`SimV0Device`] and [`SimV1Device`] over the shared heap

mod device;
mod heap;

use std::sync::Arc;

use skarv_module::{
    make_api_version, major_api_version, ModuleError, PlatformModule, V0Device, V1Device,
    ALLOC_MODULE_ID,
};

pub use device::{SimV0Device, SimV1Device};
pub use heap::SimState;

/// Tuning knobs for a simulated module.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Maximum number of live buffers before allocation reports exhaustion.
    pub capacity: usize,
    /// Stride alignment in bytes. Must be a power of two.
    pub stride_align: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            stride_align: 64,
        }
    }
}

/// A simulated allocation module.
///
/// The advertised api version decides which device generation the module
/// will open; the other generation reports
/// [`ModuleError::DeviceUnavailable`], as a real single-generation module
/// would.
pub struct SimModule {
    id: String,
    api_version: u32,
    state: Arc<SimState>,
}

impl SimModule {
    /// A legacy module advertising api version 0.3.
    pub fn v0(config: SimConfig) -> Self {
        Self::with_api_version(ALLOC_MODULE_ID, make_api_version(0, 3), config)
    }

    /// A descriptor-native module advertising api version 1.0.
    pub fn v1(config: SimConfig) -> Self {
        Self::with_api_version(ALLOC_MODULE_ID, make_api_version(1, 0), config)
    }

    /// A module with an arbitrary id and raw packed api version. Ids other
    /// than [`ALLOC_MODULE_ID`] let tests keep their registry entries
    /// apart; out-of-range versions exercise the loader's rejection path.
    pub fn with_api_version(id: impl Into<String>, api_version: u32, config: SimConfig) -> Self {
        Self {
            id: id.into(),
            api_version,
            state: Arc::new(SimState::new(config)),
        }
    }

    /// Number of currently live buffers.
    pub fn live_count(&self) -> usize {
        self.state.heap.lock().live_len()
    }

    /// Tokens freed so far, in free order.
    pub fn freed_tokens(&self) -> Vec<u64> {
        self.state.heap.lock().freed().to_vec()
    }

    /// Frees of tokens that were not live at the time.
    pub fn double_free_count(&self) -> u64 {
        self.state.heap.lock().double_frees()
    }

    /// Times two serialized device calls were observed in flight at once.
    pub fn overlap_count(&self) -> u64 {
        self.state.overlap_count()
    }

    /// Allocation calls that reached the device, across both generations.
    pub fn alloc_calls(&self) -> u64 {
        self.state.alloc_calls()
    }

    /// Makes the next single-buffer allocation fail with a device fault.
    pub fn arm_fault(&self) {
        self.state.heap.lock().arm_fault();
    }
}

impl PlatformModule for SimModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn api_version(&self) -> u32 {
        self.api_version
    }

    fn open_v0(&self) -> Result<Box<dyn V0Device>, ModuleError> {
        if major_api_version(self.api_version) != 0 {
            return Err(ModuleError::DeviceUnavailable {
                id: self.id.clone(),
                generation: 0,
            });
        }
        Ok(Box::new(SimV0Device::new(self.state.clone())))
    }

    fn open_v1(&self) -> Result<Box<dyn V1Device>, ModuleError> {
        if major_api_version(self.api_version) != 1 {
            return Err(ModuleError::DeviceUnavailable {
                id: self.id.clone(),
                generation: 1,
            });
        }
        Ok(Box::new(SimV1Device::new(self.state.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skarv_module::DeviceError;

    #[test]
    fn v0_module_opens_only_its_generation() {
        let module = SimModule::v0(SimConfig::default());
        assert!(module.open_v0().is_ok());
        assert!(matches!(
            module.open_v1(),
            Err(ModuleError::DeviceUnavailable { generation: 1, .. })
        ));
    }

    #[test]
    fn v1_module_opens_only_its_generation() {
        let module = SimModule::v1(SimConfig::default());
        assert!(module.open_v1().is_ok());
        assert!(matches!(
            module.open_v0(),
            Err(ModuleError::DeviceUnavailable { generation: 0, .. })
        ));
    }

    #[test]
    fn future_version_opens_neither_generation() {
        let module =
            SimModule::with_api_version("sim-test.future", make_api_version(2, 0), SimConfig::default());
        assert!(module.open_v0().is_err());
        assert!(module.open_v1().is_err());
    }

    #[test]
    fn module_observes_device_traffic() {
        let module = SimModule::v0(SimConfig::default());
        let device = module.open_v0().unwrap();
        let (handle, _) = device.alloc(8, 8, 1, 0).unwrap();
        assert_eq!(module.live_count(), 1);
        assert_eq!(module.alloc_calls(), 1);
        device.free(handle);
        assert_eq!(module.live_count(), 0);
        assert_eq!(module.freed_tokens(), vec![1]);
    }

    #[test]
    fn armed_fault_fails_one_allocation() {
        let module = SimModule::v0(SimConfig::default());
        let device = module.open_v0().unwrap();
        module.arm_fault();
        assert!(matches!(
            device.alloc(8, 8, 1, 0),
            Err(DeviceError::Failure(_))
        ));
        // The fault is one-shot.
        assert!(device.alloc(8, 8, 1, 0).is_ok());
    }
}
