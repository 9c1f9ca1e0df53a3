// src/lib.rs
//! Vitrine
//!
//! A small glTF showcase viewer built on wgpu and winit: it loads a cube-map
//! environment and a handful of glTF/GLB models concurrently, places them in
//! a scene with per-frame orbit controls, and exposes every model material's
//! roughness and metalness as live sliders in an ImGui panel.

pub mod app;
pub mod assets;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::VitrineApp;

/// Creates a default viewer application instance
pub fn default() -> VitrineApp {
    pollster::block_on(VitrineApp::new())
}
