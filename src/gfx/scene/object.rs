//! Objects and meshes
//!
//! An [`Object`] is one loaded model: a flat list of meshes (each carrying
//! the node transform it was flattened from), plus the placement that
//! positions the whole model in the scene.

use cgmath::Matrix4;
use wgpu::util::DeviceExt;
use wgpu::Device;

use crate::assets::gltf::{MeshData, ModelData};
use crate::gfx::resources::material::MaterialId;

use super::placement::Placement;
use super::vertex::Vertex3D;

pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    pub vertex_count: u32,
    pub index_count: u32,
    /// Node transform baked in during glTF flattening. The effective model
    /// matrix is `placement * local_transform`.
    pub local_transform: Matrix4<f32>,
    pub material_id: Option<MaterialId>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    transform_buffer: Option<wgpu::Buffer>,
    transform_bind_group: Option<wgpu::BindGroup>,
}

impl Mesh {
    pub fn new(
        name: &str,
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        tex_coords: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        let vertices: Vec<Vertex3D> = positions
            .into_iter()
            .zip(normals)
            .zip(tex_coords)
            .map(|((position, normal), tex_coords)| Vertex3D {
                position,
                normal,
                tex_coords,
            })
            .collect();

        Self {
            name: name.to_string(),
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            vertices,
            indices,
            local_transform: cgmath::SquareMatrix::identity(),
            material_id: None,
            vertex_buffer: None,
            index_buffer: None,
            transform_buffer: None,
            transform_bind_group: None,
        }
    }

    fn from_data(data: MeshData, material_id: Option<MaterialId>) -> Self {
        let transform = data.transform;
        let mut mesh = Self::new(
            &data.name,
            data.positions,
            data.normals,
            data.tex_coords,
            data.indices,
        );
        mesh.local_transform = transform;
        mesh.material_id = material_id;
        mesh
    }

    /// Uploads vertex/index buffers and the per-mesh transform uniform.
    fn init_gpu_resources(
        &mut self,
        device: &Device,
        transform_layout: &wgpu::BindGroupLayout,
        model_matrix: Matrix4<f32>,
    ) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let matrix: [[f32; 4]; 4] = model_matrix.into();
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Transform Buffer", self.name)),
            contents: bytemuck::cast_slice(&matrix),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Transform Bind Group", self.name)),
            layout: transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        self.transform_buffer = Some(transform_buffer);
        self.transform_bind_group = Some(transform_bind_group);
    }

    fn write_transform(&self, queue: &wgpu::Queue, model_matrix: Matrix4<f32>) {
        if let Some(buffer) = &self.transform_buffer {
            let matrix: [[f32; 4]; 4] = model_matrix.into();
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&matrix));
        }
    }
}

pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub placement: Placement,
    pub visible: bool,
}

impl Object {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            placement: Placement::default(),
            visible: true,
        }
    }

    /// Builds an object from parsed model data.
    ///
    /// `material_ids` maps the model's material indices to the ids they were
    /// registered under in the material library.
    pub fn from_model(data: ModelData, placement: Placement, material_ids: &[MaterialId]) -> Self {
        let name = data.name;
        let meshes = data
            .meshes
            .into_iter()
            .map(|mesh| {
                let material_id = mesh.material.and_then(|idx| material_ids.get(idx).cloned());
                Mesh::from_data(mesh, material_id)
            })
            .collect();

        let mut object = Self::new(&name, meshes);
        object.placement = placement;
        object
    }

    pub fn init_gpu_resources(&mut self, device: &Device, transform_layout: &wgpu::BindGroupLayout) {
        let placement_matrix = self.placement.matrix();
        for mesh in &mut self.meshes {
            let model_matrix = placement_matrix * mesh.local_transform;
            mesh.init_gpu_resources(device, transform_layout, model_matrix);
        }
    }

    /// Re-writes every mesh's model matrix. Call after mutating `placement`.
    pub fn update_transforms(&self, queue: &wgpu::Queue) {
        let placement_matrix = self.placement.matrix();
        for mesh in &self.meshes {
            mesh.write_transform(queue, placement_matrix * mesh.local_transform);
        }
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let (Some(vertex_buffer), Some(index_buffer), Some(transform_bind_group)) = (
            &mesh.vertex_buffer,
            &mesh.index_buffer,
            &mesh.transform_bind_group,
        ) else {
            return; // Skip drawing if not uploaded
        };

        self.set_bind_group(1, transform_bind_group, &[]);
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    fn triangle_mesh() -> MeshData {
        MeshData {
            name: "tri".to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            tex_coords: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
            transform: cgmath::SquareMatrix::identity(),
            material: Some(0),
        }
    }

    #[test]
    fn object_keeps_its_placement() {
        let data = ModelData {
            name: "model".to_string(),
            meshes: vec![triangle_mesh()],
            materials: vec![],
        };
        let placement = Placement::at(-5.0, 0.0, 0.0)
            .with_rotation(Deg(0.0), Deg(90.0), Deg(0.0))
            .with_scale(1.0);
        let object = Object::from_model(data, placement, &["model/mat".to_string()]);

        assert_eq!(object.placement, placement);
        assert_eq!(object.meshes.len(), 1);
        assert_eq!(
            object.meshes[0].material_id.as_deref(),
            Some("model/mat")
        );
    }

    #[test]
    fn mesh_counts_follow_input() {
        let mesh = Mesh::from_data(triangle_mesh(), None);
        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.index_count, 3);
        assert!(mesh.material_id.is_none());
    }
}
