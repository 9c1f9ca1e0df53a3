//! Six-face cube-map loading
//!
//! Decodes the conventional +X/-X/+Y/-Y/+Z/-Z face images into RGBA data.
//! All faces must be square and share one size; the GPU upload (one texture
//! layer per face) happens elsewhere.

use std::path::{Path, PathBuf};

use crate::assets::gltf::ImageData;
use crate::error::{AssetError, AssetResult};

/// Face file names in the layer order wgpu expects for cube textures.
pub const FACE_FILES: [&str; 6] = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];

/// A decoded cube map: six same-sized RGBA faces.
#[derive(Debug)]
pub struct CubeMapData {
    pub size: u32,
    pub faces: Vec<ImageData>,
}

/// Loads six-face cube maps from a fixed directory.
///
/// Stateless apart from the configured base path; safe to call from a
/// worker thread.
#[derive(Clone, Debug)]
pub struct CubeMapLoader {
    base_path: PathBuf,
}

impl CubeMapLoader {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Loads and decodes all six faces.
    pub fn load(&self) -> AssetResult<CubeMapData> {
        log::info!("loading cube map from '{}'", self.base_path.display());

        let mut faces = Vec::with_capacity(FACE_FILES.len());
        let mut size = 0u32;

        for file in FACE_FILES {
            let path = self.base_path.join(file);
            let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            let decoded = image::load_from_memory(&bytes)
                .map_err(|source| AssetError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();

            if faces.is_empty() {
                size = decoded.width();
            }
            if decoded.width() != size || decoded.height() != size {
                return Err(AssetError::CubeFaceSize {
                    path,
                    width: decoded.width(),
                    height: decoded.height(),
                    expected: size,
                });
            }

            faces.push(ImageData {
                width: decoded.width(),
                height: decoded.height(),
                rgba: decoded.into_raw(),
            });
        }

        Ok(CubeMapData { size, faces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_face(dir: &Path, file: &str, size: u32) {
        let img = image::RgbaImage::from_pixel(size, size, image::Rgba([40, 80, 160, 255]));
        img.save(dir.join(file)).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vitrine_cubemap_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_six_equal_faces() {
        let dir = temp_dir("ok");
        for file in FACE_FILES {
            write_face(&dir, file, 4);
        }

        let cubemap = CubeMapLoader::new(&dir).load().unwrap();
        assert_eq!(cubemap.size, 4);
        assert_eq!(cubemap.faces.len(), 6);
        for face in &cubemap.faces {
            assert_eq!(face.rgba.len(), 4 * 4 * 4);
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn mismatched_face_size_is_rejected() {
        let dir = temp_dir("mismatch");
        for file in &FACE_FILES[..5] {
            write_face(&dir, file, 4);
        }
        write_face(&dir, FACE_FILES[5], 8);

        let err = CubeMapLoader::new(&dir).load().unwrap_err();
        match err {
            AssetError::CubeFaceSize {
                width, expected, ..
            } => {
                assert_eq!(width, 8);
                assert_eq!(expected, 4);
            }
            other => panic!("expected CubeFaceSize, got {other}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_face_reports_its_path() {
        let dir = temp_dir("missing");
        // No files written at all.
        let err = CubeMapLoader::new(&dir).load().unwrap_err();
        assert!(err.path().ends_with("px.png"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
