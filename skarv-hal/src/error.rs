//! Per-call allocation failure kinds reported to callers.

use thiserror::Error;

use crate::descriptor::DescriptorError;

/// A specific allocation failure. The "no error" status of the service
/// contract is the `Ok` arm of `Result<_, AllocError>`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("malformed buffer descriptor")]
    BadDescriptor,

    #[error("invalid allocation argument: {0}")]
    BadValue(&'static str),

    #[error("backend out of buffer resources")]
    NoResources,

    #[error("operation not supported by the active backend")]
    Unsupported,

    #[error("backend device failure: {0}")]
    Device(String),
}

impl From<DescriptorError> for AllocError {
    fn from(_: DescriptorError) -> Self {
        AllocError::BadDescriptor
    }
}
