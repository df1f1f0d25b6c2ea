//! Storage layer for configuration files.

mod atomic_toml;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
