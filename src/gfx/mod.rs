//! # Graphics Module
//!
//! Everything rendering-related: the camera system, the wgpu render engine
//! and its pipelines, GPU resource management, and the scene structures.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped controls
//! - **Rendering** ([`rendering`]) - Sky-box and PBR passes over wgpu
//! - **Scene Management** ([`scene`]) - Objects, lights, placements
//! - **Resource Management** ([`resources`]) - Materials, textures, the
//!   shared environment cube map
//! - **Geometry** ([`geometry`]) - Procedural placeholder geometry
//!
//! The graphics system is primarily used through the [`RenderEngine`] and
//! [`Scene`](scene::Scene) types; both are wired up by the application
//! layer.

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
