//! CLI command implementations

pub mod traffic;
