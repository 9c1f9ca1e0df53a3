//! Global uniform bindings for camera and lighting
//!
//! Manages the per-frame uniform buffer shared by every object: camera
//! matrices plus the ambient and directional light terms. Bound to slot 0
//! in all render pipelines.

use cgmath::InnerSpace;

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    gfx::scene::scene::LightingConfig,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the Globals struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    // Camera data (matches CameraUniform)
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],

    // Light data
    ambient_color: [f32; 3],
    ambient_intensity: f32,
    sun_color: [f32; 3],
    sun_intensity: f32,
    /// Unit vector pointing from the scene toward the light.
    sun_direction: [f32; 3],
    _padding: f32,
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera and lighting data
///
/// Should be called each frame before rendering.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    lighting: LightingConfig,
) {
    // A directional light "positioned" somewhere shines toward the origin,
    // so the direction toward the light is just the normalized position.
    let sun_direction = if lighting.sun_position.magnitude2() > 0.0 {
        lighting.sun_position.normalize()
    } else {
        cgmath::Vector3::unit_y()
    };

    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        ambient_color: lighting.ambient_color,
        ambient_intensity: lighting.ambient_intensity,
        sun_color: lighting.sun_color,
        sun_intensity: lighting.sun_intensity,
        sun_direction: sun_direction.into(),
        _padding: 0.0,
    };

    ubo.update_content(queue, content);
}

/// Manages bind group layouts and bind groups for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Creates a new global bindings manager
    ///
    /// Sets up the bind group layout for global uniforms but doesn't
    /// create the actual bind group until `create_bind_group()` is called.
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // Global uniforms (camera + lights)
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group with the provided uniform buffer
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    /// Returns the bind group layout
    ///
    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Returns the bind group for rendering
    ///
    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}
