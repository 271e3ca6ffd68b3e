//! Storage module for file management
//!
//! Provides the local-disk store backing every file operation.

mod local_store;

pub use local_store::LocalStore;
