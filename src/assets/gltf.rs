//! glTF / GLB model loading
//!
//! Parses a glTF document into plain CPU-side data: flattened meshes with
//! their node transforms baked alongside, and the PBR material set with any
//! base-color images already decoded to RGBA. Nothing here touches the GPU,
//! which keeps the whole load callable from a worker thread.

use std::path::{Path, PathBuf};

use cgmath::{Matrix4, SquareMatrix};

use crate::error::{AssetError, AssetResult};

/// A decoded RGBA8 image.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// One mesh primitive group, flattened from the node hierarchy.
///
/// `transform` is the node's global transform (all ancestors applied), so
/// consumers can place the whole model with a single extra matrix.
#[derive(Debug)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub transform: Matrix4<f32>,
    /// Index into [`ModelData::materials`], if the primitive has one.
    pub material: Option<usize>,
}

/// PBR metallic-roughness material factors plus the optional base-color image.
#[derive(Debug)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub base_color_image: Option<ImageData>,
}

/// A fully parsed model, ready for GPU upload.
#[derive(Debug)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

/// Loads glTF and GLB models from a fixed asset root.
///
/// Stateless apart from the configured root; safe to share across threads
/// and reuse for any number of loads.
#[derive(Clone, Debug)]
pub struct GltfLoader {
    asset_root: PathBuf,
}

impl GltfLoader {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Loads and parses the model at `path` (relative to the asset root).
    ///
    /// External buffers and images are resolved relative to the model file;
    /// GLB-embedded buffers and images come from the binary chunk.
    pub fn load(&self, path: &str) -> AssetResult<ModelData> {
        let full_path = self.asset_root.join(path);
        log::info!("loading model '{}'", full_path.display());

        let bytes = read_file(&full_path)?;
        let gltf = gltf::Gltf::from_slice(&bytes).map_err(|source| AssetError::Gltf {
            path: full_path.clone(),
            source,
        })?;

        let base_dir = full_path.parent().unwrap_or(Path::new(".")).to_path_buf();

        // Buffer data: GLB blob or external .bin files next to the model.
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    if let Some(blob) = gltf.blob.as_deref() {
                        buffer_data.push(blob.to_vec());
                    }
                }
                gltf::buffer::Source::Uri(uri) => {
                    buffer_data.push(read_file(&base_dir.join(uri))?);
                }
            }
        }

        let mut materials = Vec::new();
        for material in gltf.materials() {
            let pbr = material.pbr_metallic_roughness();
            let base_color_image = match pbr.base_color_texture() {
                Some(info) => Some(decode_image(
                    &info.texture().source().source(),
                    &buffer_data,
                    &base_dir,
                    &full_path,
                )?),
                None => None,
            };
            let name = material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or(0)));
            materials.push(MaterialData {
                name,
                base_color: pbr.base_color_factor(),
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                base_color_image,
            });
        }

        // Pre-order walk of every scene, flattening meshes with their
        // accumulated node transforms.
        let mut meshes = Vec::new();
        for scene in gltf.scenes() {
            for node in scene.nodes() {
                collect_meshes(&node, Matrix4::identity(), &buffer_data, &mut meshes);
            }
        }

        if meshes.is_empty() {
            return Err(AssetError::NoMeshes(full_path));
        }

        let name = full_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        log::info!(
            "loaded model '{}': {} meshes, {} materials",
            name,
            meshes.len(),
            materials.len()
        );

        Ok(ModelData {
            name,
            meshes,
            materials,
        })
    }
}

fn read_file(path: &Path) -> AssetResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_image(
    source: &gltf::image::Source,
    buffer_data: &[Vec<u8>],
    base_dir: &Path,
    model_path: &Path,
) -> AssetResult<ImageData> {
    let (bytes, path, mime_type) = match source {
        gltf::image::Source::View { view, mime_type } => {
            let buffer = &buffer_data[view.buffer().index()];
            let bytes = buffer[view.offset()..view.offset() + view.length()].to_vec();
            (bytes, model_path.to_path_buf(), Some(*mime_type))
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            let path = base_dir.join(uri);
            (read_file(&path)?, path, *mime_type)
        }
    };

    let decoded = match mime_type.and_then(image_format_from_mime) {
        Some(format) => image::load_from_memory_with_format(&bytes, format),
        None => image::load_from_memory(&bytes),
    }
    .map_err(|source| AssetError::Image { path, source })?;

    let rgba = decoded.to_rgba8();
    Ok(ImageData {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

fn image_format_from_mime(mime_type: &str) -> Option<image::ImageFormat> {
    match mime_type {
        "image/png" => Some(image::ImageFormat::Png),
        "image/jpeg" => Some(image::ImageFormat::Jpeg),
        _ => None,
    }
}

fn collect_meshes(
    node: &gltf::scene::Node,
    parent_transform: Matrix4<f32>,
    buffer_data: &[Vec<u8>],
    out: &mut Vec<MeshData>,
) {
    let transform = parent_transform * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffer_data[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .map(|iter| iter.collect())
                .unwrap_or_default();
            if positions.is_empty() {
                continue;
            }

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(iter) => iter.collect(),
                None => averaged_face_normals(&positions, &indices),
            };

            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

            out.push(MeshData {
                name: mesh.name().unwrap_or("unnamed_mesh").to_string(),
                positions,
                normals,
                tex_coords,
                indices,
                transform,
                material: primitive.material().index(),
            });
        }
    }

    for child in node.children() {
        collect_meshes(&child, transform, buffer_data, out);
    }
}

/// Computes smooth per-vertex normals by averaging face normals, for
/// primitives that ship without a NORMAL attribute.
fn averaged_face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];

    for triangle in indices.chunks(3) {
        if triangle.len() < 3 {
            continue;
        }
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let v0 = positions[i0];
        let v1 = positions[i1];
        let v2 = positions[i2];

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &i in &[i0, i1, i2] {
            normals[i][0] += face[0];
            normals[i][1] += face[1];
            normals[i][2] += face[2];
        }
    }

    for normal in &mut normals {
        let length =
            (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if length > 0.0 {
            normal[0] /= length;
            normal[1] /= length;
            normal[2] /= length;
        }
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let loader = GltfLoader::new("does/not/exist");
        let err = loader.load("missing.gltf").unwrap_err();
        match &err {
            AssetError::Io { path, .. } => {
                assert!(path.ends_with("missing.gltf"), "got {}", path.display());
            }
            other => panic!("expected Io error, got {other}"),
        }
        assert!(err.path().ends_with("missing.gltf"));
    }

    #[test]
    fn face_normals_point_out_of_a_triangle() {
        // Counter-clockwise triangle in the XY plane faces +Z.
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let indices = [0, 1, 2];
        let normals = averaged_face_normals(&positions, &indices);
        for normal in normals {
            assert!((normal[0]).abs() < 1e-6);
            assert!((normal[1]).abs() < 1e-6);
            assert!((normal[2] - 1.0).abs() < 1e-6);
        }
    }
}
