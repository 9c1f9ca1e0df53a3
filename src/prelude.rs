//! # Vitrine Prelude
//!
//! Brings the types a typical viewer composition needs into scope:
//!
//! ```no_run
//! use vitrine::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = vitrine::default();
//!     app.load_model("models/example.glb", Placement::default());
//!     app.run()
//! }
//! ```

// Re-export core application types
pub use crate::app::{ModelRequest, VitrineApp};
pub use crate::default;

// Re-export graphics and scene types
pub use crate::gfx::scene::{Light, Placement, Scene};

// Re-export UI types and utilities
pub use crate::ui::{material_panel, BindingRegistry};

// Re-export common external dependencies
pub use cgmath::{Deg, Vector3};
