//! Material system for PBR rendering
//!
//! Materials are stored centrally in [`MaterialManager`] and meshes reference
//! them by id. The debug panel mutates the roughness/metallic factors through
//! the manager; [`Material::update_gpu_resources`] syncs changes to the GPU.

use std::collections::HashMap;
use std::sync::Arc;
use wgpu::Device;

use crate::assets::gltf::{ImageData, MaterialData};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::environment::EnvironmentMap;
use super::texture_resource::TextureResource;

/// Material ID for referencing materials
pub type MaterialId = String;

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    /// 1.0 when the material has the shared environment map assigned.
    pub env_strength: f32,
    _padding: f32,
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Material bind group management
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        MaterialBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(
        &mut self,
        device: &Device,
        ubo: &MaterialUBO,
        base_color: &TextureResource,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(&base_color.view)
                .sampler(&base_color.sampler)
                .create(device, "Material Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

/// Material definition with PBR properties
///
/// Contains material factors, the optional base-color image, and a non-owning
/// reference to the shared environment map.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    base_color_image: Option<ImageData>,
    environment: Option<Arc<EnvironmentMap>>,

    // GPU resources - created lazily once a device is available
    base_color_texture: Option<TextureResource>,
    material_ubo: Option<MaterialUBO>,
    material_bindings: Option<MaterialBindings>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            base_color_image: None,
            environment: None,
            base_color_texture: None,
            material_ubo: None,
            material_bindings: None,
        }
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Creates a material from parsed glTF material data.
    pub fn from_data(id: &str, data: MaterialData) -> Self {
        let mut material = Self::new(id, data.base_color, data.metallic, data.roughness);
        material.base_color_image = data.base_color_image;
        material
    }

    /// Hands this material the shared environment map reference.
    ///
    /// The material observes the map, it does not own it; the reflection
    /// term is enabled on the next GPU sync.
    pub fn set_environment(&mut self, environment: Arc<EnvironmentMap>) {
        self.environment = Some(environment);
    }

    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    /// Updates GPU resources for this material
    ///
    /// Must be called after material properties change to sync with GPU.
    pub fn update_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        if self.material_ubo.is_none() {
            self.material_ubo = Some(MaterialUBO::new(device));
        }

        if self.base_color_texture.is_none() {
            let texture = match &self.base_color_image {
                Some(image) => TextureResource::create_from_rgba_data(
                    device,
                    queue,
                    &image.rgba,
                    image.width,
                    image.height,
                    &format!("{} Base Color", self.name),
                ),
                None => TextureResource::create_white_pixel(device, queue),
            };
            self.base_color_texture = Some(texture);
        }

        if self.material_bindings.is_none() {
            let mut bindings = MaterialBindings::new(device);
            bindings.create_bind_group(
                device,
                self.material_ubo.as_ref().expect("ubo created above"),
                self.base_color_texture.as_ref().expect("texture created above"),
            );
            self.material_bindings = Some(bindings);
        }

        let uniform_data = MaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            env_strength: if self.environment.is_some() { 1.0 } else { 0.0 },
            _padding: 0.0,
        };

        if let Some(ubo) = &mut self.material_ubo {
            ubo.update_content(queue, uniform_data);
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.material_bindings
            .as_ref()
            .and_then(|bindings| bindings.bind_group.as_ref())
    }
}

/// Manages all materials in the engine
///
/// Centralized storage for all materials. Meshes reference materials by id
/// rather than storing material data directly.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let mut manager = Self {
            materials: HashMap::new(),
            default_material_id: "default".to_string(),
        };

        manager
            .materials
            .insert("default".to_string(), Material::default());

        manager
    }

    /// Adds a material to the library
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Gets a material by ID
    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Gets a mutable material by ID
    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets the default material
    pub fn get_default_material(&self) -> &Material {
        self.materials
            .get(&self.default_material_id)
            .expect("default material always exists")
    }

    /// Gets material for a mesh with fallback to default
    ///
    /// Handles meshes with no material assigned as well as dangling ids.
    pub fn get_material_for_mesh(&self, material_id: Option<&MaterialId>) -> &Material {
        match material_id {
            Some(id) => self
                .get_material(id)
                .unwrap_or_else(|| self.get_default_material()),
            None => self.get_default_material(),
        }
    }

    /// Lists all material IDs, sorted for stable display order.
    pub fn list_materials(&self) -> Vec<MaterialId> {
        let mut ids: Vec<MaterialId> = self.materials.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Iterates over all materials mutably.
    pub fn materials_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        self.materials.values_mut()
    }

    /// Updates GPU resources for all materials
    ///
    /// Should be called once per frame; unchanged materials are a no-op.
    pub fn update_all_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue);
        }
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_are_clamped_to_unit_range() {
        let material = Material::new("m", [1.0; 4], 1.5, -0.5);
        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.0);
    }

    #[test]
    fn unknown_material_falls_back_to_default() {
        let manager = MaterialManager::new();
        let id = "nope".to_string();
        let material = manager.get_material_for_mesh(Some(&id));
        assert_eq!(material.name, "Default");
    }

    #[test]
    fn listing_is_sorted_and_contains_default() {
        let mut manager = MaterialManager::new();
        manager.add_material(Material::new("zzz", [1.0; 4], 0.0, 0.5));
        manager.add_material(Material::new("aaa", [1.0; 4], 0.0, 0.5));

        let ids = manager.list_materials();
        assert_eq!(ids, vec!["aaa", "default", "zzz"]);
    }
}
