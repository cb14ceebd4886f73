//! ## skarv-hal::handle
//! Buffer references on both sides of the delivery boundary.
//!
//! A backend produces [`RawBufferHandle`]s that live on its transient
//! buffer list; the front end exports an independent [`BufferHandle`] per
//! raw handle for the caller, then returns the raw handles to the backend
//! for release. The two types are distinct ownership domains connected only
//! by the buffer they reference.

/// Backend-local reference to an allocated buffer.
///
/// Not `Clone`: release consumes the handle, so each raw handle can be
/// freed exactly once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RawBufferHandle {
    token: u64,
}

impl RawBufferHandle {
    pub fn new(token: u64) -> Self {
        Self { token }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// Mints the caller-facing representation of this buffer.
    ///
    /// The export stays valid after this raw handle is released; backends
    /// guarantee that freeing local references does not invalidate handles
    /// already communicated to the caller.
    pub fn export(&self) -> BufferHandle {
        BufferHandle { token: self.token }
    }
}

/// Caller-held reference to an allocated buffer, independent of the
/// backend-local handle it was exported from. Callers may retain it beyond
/// the allocation call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    token: u64,
}

impl BufferHandle {
    pub fn token(&self) -> u64 {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_preserves_token() {
        let raw = RawBufferHandle::new(42);
        let exported = raw.export();
        assert_eq!(exported.token(), 42);
        // The export must survive release of the raw handle.
        drop(raw);
        assert_eq!(exported.clone().token(), 42);
    }
}
