//! Asset loading
//!
//! Loader objects for the two asset kinds the viewer consumes: glTF/GLB
//! models and six-face cube maps. Loaders are CPU-only so they can run on
//! worker threads; GPU upload happens later on the event-loop thread once
//! a device is available.
//!
//! A loader holds nothing but its configured base path, so one instance
//! can serve any number of load calls, from any thread.

pub mod cubemap;
pub mod gltf;

pub use cubemap::{CubeMapData, CubeMapLoader, FACE_FILES};
pub use gltf::{GltfLoader, ImageData, MaterialData, MeshData, ModelData};
