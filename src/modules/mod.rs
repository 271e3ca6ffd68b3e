//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for the systems the service stores data in.

pub mod storage;
