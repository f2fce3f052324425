//! Patchwork Core - engine-facing model for the patchwork editor
//!
//! Everything in here is toolkit-agnostic:
//!
//! - [`engine`]: the narrow interface to the dataflow engine, the cross-thread
//!   event bridge and an in-memory engine
//! - [`sync`]: the value synchronisation protocol shared by all GUI objects
//! - [`config`]: YAML-backed editor settings
//! - [`pd`]: libpd-backed engine (feature `libpd`)

pub mod config;
pub mod engine;
pub mod sync;
pub mod types;

#[cfg(feature = "libpd")]
pub mod pd;

pub use types::*;
