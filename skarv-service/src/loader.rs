//! ## skarv-service::loader
//! **Module probe and version-dispatched backend construction**
//!
//! The loader runs once at service start: acquire the installed module,
//! read its packed api version, and build the one backend whose major
//! version matches. An unknown major is an error, not a fallback; the
//! service refuses to start rather than guess at a device interface.

use std::sync::Arc;

use tracing::{error, info, instrument};

use skarv_backends::{V0Backend, V1Backend};
use skarv_hal::AllocatorHal;
use skarv_module::{major_api_version, registry, ModuleRef, ALLOC_MODULE_ID};
use skarv_telemetry::AllocMetrics;

use crate::allocator::Allocator;
use crate::error::LoaderError;

/// Probes the module installed under [`ALLOC_MODULE_ID`] and wraps it in
/// a front end.
pub fn load(metrics: Arc<AllocMetrics>) -> Result<Allocator, LoaderError> {
    load_module(ALLOC_MODULE_ID, metrics)
}

/// Probes the module installed under `module_id`.
#[instrument(skip(metrics))]
pub fn load_module(module_id: &str, metrics: Arc<AllocMetrics>) -> Result<Allocator, LoaderError> {
    let module = registry::acquire(module_id).map_err(LoaderError::ModuleNotFound)?;
    let raw = module.api_version();
    let major = major_api_version(raw);
    info!(
        module = %module_id,
        api_version = format_args!("{:#06x}", raw),
        major,
        "allocation module probed"
    );
    let hal = backend_for_version(major, &module)?;
    Ok(Allocator::new(hal, metrics))
}

/// Builds the backend matching a module's major api version.
pub fn backend_for_version(
    major: u32,
    module: &ModuleRef,
) -> Result<Box<dyn AllocatorHal>, LoaderError> {
    match major {
        1 => {
            let backend = V1Backend::with_module(module).map_err(LoaderError::BackendInit)?;
            Ok(Box::new(backend))
        }
        0 => {
            let backend = V0Backend::with_module(module).map_err(LoaderError::BackendInit)?;
            Ok(Box::new(backend))
        }
        unknown => {
            error!(major = unknown, "unsupported allocation module version");
            Err(LoaderError::UnsupportedVersion {
                major: unknown,
                raw: module.api_version(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skarv_hal::{AllocError, BufferDescriptor, DescriptorInfo};
    use skarv_module::{make_api_version, ModuleError, PlatformModule};
    use skarv_sim::{SimConfig, SimModule};
    use tracing_test::traced_test;

    fn metrics() -> Arc<AllocMetrics> {
        Arc::new(AllocMetrics::new())
    }

    fn install_sim(id: &str, api_version: u32, config: SimConfig) -> Arc<SimModule> {
        let module = Arc::new(SimModule::with_api_version(id, api_version, config));
        registry::install(module.clone()).unwrap();
        module
    }

    fn descriptor(width: u32) -> BufferDescriptor {
        DescriptorInfo {
            width,
            height: 1,
            format: 1,
            layer_count: 1,
            usage: 0,
        }
        .encode()
    }

    #[test]
    fn version_1_module_gets_the_descriptor_backend() {
        install_sim("loader-test.v1", make_api_version(1, 0), SimConfig::default());
        let allocator = load_module("loader-test.v1", metrics()).unwrap();
        assert!(allocator.dump_debug_info().contains("version-1 backend"));
    }

    #[test]
    fn version_0_module_gets_the_legacy_backend() {
        install_sim("loader-test.v0", make_api_version(0, 3), SimConfig::default());
        let allocator = load_module("loader-test.v0", metrics()).unwrap();
        assert!(allocator.dump_debug_info().contains("version-0 backend"));
    }

    #[test]
    fn future_version_is_rejected() {
        install_sim(
            "loader-test.future",
            make_api_version(2, 0),
            SimConfig::default(),
        );
        assert!(matches!(
            load_module("loader-test.future", metrics()),
            Err(LoaderError::UnsupportedVersion { major: 2, .. })
        ));
    }

    #[test]
    fn missing_module_is_reported() {
        assert!(matches!(
            load_module("loader-test.absent", metrics()),
            Err(LoaderError::ModuleNotFound(_))
        ));
    }

    struct HollowModule;

    impl PlatformModule for HollowModule {
        fn id(&self) -> &str {
            "loader-test.hollow"
        }
        fn api_version(&self) -> u32 {
            make_api_version(1, 0)
        }
    }

    #[test]
    fn device_open_failure_is_backend_init() {
        registry::install(Arc::new(HollowModule)).unwrap();
        assert!(matches!(
            load_module("loader-test.hollow", metrics()),
            Err(LoaderError::BackendInit(ModuleError::DeviceUnavailable { .. }))
        ));
    }

    #[test]
    fn allocates_through_a_version_1_module() {
        let module = install_sim(
            "loader-test.v1-e2e",
            make_api_version(1, 0),
            SimConfig::default(),
        );
        let allocator = load_module("loader-test.v1-e2e", metrics()).unwrap();

        allocator.allocate(&descriptor(1024), 3, |result| {
            let batch = result.unwrap();
            assert_eq!(batch.stride, 4096);
            assert_eq!(batch.buffers.len(), 3);
            // The device still holds every buffer during delivery.
            assert_eq!(module.live_count(), 3);
        });

        assert_eq!(module.live_count(), 0);
        assert_eq!(module.freed_tokens(), vec![1, 2, 3]);
    }

    #[test]
    fn allocates_through_a_version_0_module() {
        let module = install_sim(
            "loader-test.v0-e2e",
            make_api_version(0, 3),
            SimConfig::default(),
        );
        let allocator = load_module("loader-test.v0-e2e", metrics()).unwrap();

        allocator.allocate(&descriptor(16), 2, |result| {
            let batch = result.unwrap();
            assert_eq!(batch.stride, 64);
            assert_eq!(batch.buffers.len(), 2);
        });

        assert_eq!(module.freed_tokens(), vec![1, 2]);
    }

    #[test]
    fn malformed_descriptor_is_delivered_as_error() {
        install_sim(
            "loader-test.baddesc",
            make_api_version(1, 0),
            SimConfig::default(),
        );
        let allocator = load_module("loader-test.baddesc", metrics()).unwrap();

        let raw = BufferDescriptor::from(vec![1u8, 2, 3]);
        allocator.allocate(&raw, 1, |result| {
            assert_eq!(result.unwrap_err(), AllocError::BadDescriptor);
        });
    }

    #[test]
    fn partial_batch_is_rolled_back_on_exhaustion() {
        let module = install_sim(
            "loader-test.partial",
            make_api_version(0, 3),
            SimConfig {
                capacity: 2,
                ..SimConfig::default()
            },
        );
        let allocator = load_module("loader-test.partial", metrics()).unwrap();

        allocator.allocate(&descriptor(8), 4, |result| {
            assert_eq!(result.unwrap_err(), AllocError::NoResources);
        });

        assert_eq!(module.live_count(), 0);
        assert_eq!(module.freed_tokens(), vec![1, 2]);
    }

    #[test]
    fn device_fault_surfaces_as_device_error() {
        let module = install_sim(
            "loader-test.fault",
            make_api_version(0, 3),
            SimConfig::default(),
        );
        let allocator = load_module("loader-test.fault", metrics()).unwrap();

        module.arm_fault();
        allocator.allocate(&descriptor(8), 1, |result| {
            assert!(matches!(result.unwrap_err(), AllocError::Device(_)));
        });
    }

    #[traced_test]
    #[test]
    fn exhaustion_is_logged_and_delivered() {
        install_sim(
            "loader-test.exhausted",
            make_api_version(1, 0),
            SimConfig {
                capacity: 1,
                ..SimConfig::default()
            },
        );
        let allocator = load_module("loader-test.exhausted", metrics()).unwrap();

        allocator.allocate(&descriptor(8), 4, |result| {
            assert_eq!(result.unwrap_err(), AllocError::NoResources);
        });
        assert!(logs_contain("allocation failed"));
    }

    #[test]
    fn concurrent_allocations_never_overlap_device_calls() {
        let module = install_sim(
            "loader-test.stress",
            make_api_version(1, 0),
            SimConfig {
                capacity: 16,
                ..SimConfig::default()
            },
        );
        let allocator = load_module("loader-test.stress", metrics()).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let allocator = &allocator;
                scope.spawn(move || {
                    let descriptor = descriptor(32);
                    for _ in 0..25 {
                        allocator.allocate(&descriptor, 2, |result| assert!(result.is_ok()));
                    }
                });
            }
        });

        assert_eq!(module.overlap_count(), 0);
        assert_eq!(module.alloc_calls(), 100);
        assert_eq!(module.live_count(), 0);
        assert_eq!(module.freed_tokens().len(), 200);
    }
}
