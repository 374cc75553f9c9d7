//! Cache Storage Layer
//!
//! This crate provides the storage handle that the host cache passes to
//! admission decisions, together with a local disk implementation.

pub mod backend;
pub mod error;
pub mod local;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use local::LocalStorage;
