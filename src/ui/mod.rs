//! # User Interface Module
//!
//! Dear ImGui-based debug panel for the viewer.
//!
//! The [`UiManager`] handles ImGui integration with winit and wgpu: input
//! capture, frame timing, and rendering the overlay on top of the 3D scene.
//! The [`panel`] module provides the material tuning panel together with
//! the [`BindingRegistry`] that records which material parameters are
//! exposed as sliders.
//!
//! Input capture matters here: when the panel is focused, camera controls
//! are suppressed so dragging a slider does not also orbit the camera.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{material_panel, BindingRegistry, MaterialBinding, TunableParam};
