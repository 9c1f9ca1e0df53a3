//! Error types for asset loading and engine startup.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for asset loading operations.
///
/// Every variant carries the path of the asset that failed so the
/// application can report exactly which file broke the scene.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The asset file could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The glTF document could not be parsed.
    #[error("failed to parse glTF '{}': {source}", .path.display())]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    /// An image (texture or cube-map face) could not be decoded.
    #[error("failed to decode image '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The glTF document contains no renderable meshes.
    #[error("glTF '{}' contains no meshes", .0.display())]
    NoMeshes(PathBuf),

    /// A cube-map face does not match the dimensions of the first face.
    #[error(
        "cube-map face '{}' is {width}x{height}, expected {expected}x{expected}",
        .path.display()
    )]
    CubeFaceSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },
}

impl AssetError {
    /// Path of the asset that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            AssetError::Io { path, .. }
            | AssetError::Gltf { path, .. }
            | AssetError::Image { path, .. }
            | AssetError::CubeFaceSize { path, .. } => path,
            AssetError::NoMeshes(path) => path,
        }
    }
}

/// Result type alias for asset loading.
pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_path() {
        let err = AssetError::NoMeshes(PathBuf::from("assets/models/empty.gltf"));
        let message = err.to_string();
        assert!(message.contains("empty.gltf"), "got: {message}");
        assert_eq!(err.path(), Path::new("assets/models/empty.gltf"));
    }
}
