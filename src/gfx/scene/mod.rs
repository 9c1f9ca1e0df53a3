//! # Scene Management Module
//!
//! Scene container, objects, and the vertex/placement data structures used
//! to describe what the viewer renders. The scene owns the object list, the
//! light list, the material library, and the camera; objects are appended
//! as model loads complete and are never removed.

pub mod object;
pub mod placement;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawMesh, Mesh, Object};
pub use placement::Placement;
pub use scene::{Light, LightingConfig, Scene};
pub use vertex::Vertex3D;
