//! The capability contract every concrete allocation backend implements.

use crate::descriptor::BufferDescriptor;
use crate::error::AllocError;
use crate::handle::{BufferHandle, RawBufferHandle};

/// One backend allocation: the backend-reported stride plus the
/// backend-local handles, in request order. `buffers.len()` equals the
/// requested count whenever this is produced.
#[derive(Debug)]
pub struct AllocatedBuffers {
    pub stride: u32,
    pub buffers: Vec<RawBufferHandle>,
}

/// The caller-facing result of a successful allocation: exported handles
/// the caller may retain beyond the call.
#[derive(Clone, Debug)]
pub struct BufferBatch {
    pub stride: u32,
    pub buffers: Vec<BufferHandle>,
}

/// Contract between the allocation front end and a concrete backend.
///
/// Exactly one implementation is active per process, selected once by the
/// loader and owned exclusively by the front end thereafter. The front end
/// serializes `allocate_buffers`/`free_buffers`; implementations need no
/// internal locking beyond what their own `dump_debug_info` requires.
pub trait AllocatorHal: Send + Sync {
    /// Human-readable snapshot of backend state. Must not fail and must not
    /// mutate backend state; it may be called concurrently with an in-flight
    /// allocation (see the front end's debug path).
    fn dump_debug_info(&self) -> String;

    /// Requests `count` buffers matching `descriptor`. On success the
    /// returned batch holds exactly `count` handles; on failure no handles
    /// remain allocated (backends roll back partial batches internally).
    fn allocate_buffers(
        &self,
        descriptor: &BufferDescriptor,
        count: u32,
    ) -> Result<AllocatedBuffers, AllocError>;

    /// Releases backend-local references. Only ever called with exactly the
    /// handles returned by the most recent `allocate_buffers` call; there is
    /// no status channel, release is best-effort.
    fn free_buffers(&self, buffers: Vec<RawBufferHandle>);
}
