//! Pure Data backend via libpd-rs
//!
//! ```text
//! ┌─────────────────────┐  send symbols   ┌──────────────┐
//! │ PdEngine            │ ──────────────▶ │ PdInstance   │
//! │ (BindingManifest    │                 │ (libpd-rs)   │
//! │  mirror of objects) │ ◀────────────── │              │
//! └─────────────────────┘  receive hooks  └──────────────┘
//!           │                   ▲
//!           │ EngineEvent       │ poll every 5 ms
//!           ▼                   │
//!      EngineNotifier      pd-poll thread
//! ```

mod engine;
mod error;
mod instance;
mod manifest;

pub use engine::PdEngine;
pub use error::{PdError, PdResult};
pub use instance::PdInstance;
pub use manifest::{BindingManifest, BoundObject};
