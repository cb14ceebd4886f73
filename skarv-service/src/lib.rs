//! # skarv-service
//!
//! The allocation service proper: a loader that probes the installed
//! platform module and picks the backend matching its major api version,
//! and a front end that serializes every allocation against that backend.
//!
//! ### Key Submodules:
//! - `loader`: module probe and version-dispatched backend construction
//! - `allocator`: the mutex-serialized front end callers go through
//! - `error`: loader failure kinds
//!
//! The front end never exposes the backend directly; the only handle a
//! process holds is an [`Allocator`].

pub mod allocator;
pub mod error;
pub mod loader;

pub use allocator::Allocator;
pub use error::LoaderError;
pub use loader::{load, load_module};
