//! WGPU-based rendering engine for the viewer
//!
//! Provides high-level rendering functionality built on top of wgpu:
//! surface and device management, pipeline setup, depth testing, the
//! sky-box and PBR passes, and the UI overlay seam.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use cgmath::SquareMatrix;

use crate::gfx::{
    camera::camera_utils::CameraUniform,
    resources::{
        environment::EnvironmentMap,
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        texture_resource::TextureResource,
    },
    scene::{object::DrawMesh, scene::LightingConfig, scene::Scene},
};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

/// Uniforms for the sky-box pass.
///
/// MUST match the SkyUniforms struct in skybox.wgsl exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SkyUniform {
    inv_view_proj: [[f32; 4]; 4],
    view_position: [f32; 4],
}

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles all low-level graphics operations including:
/// - Surface and device management
/// - Pipeline creation and management
/// - Depth buffer handling
/// - Environment cube-map bindings shared by the sky-box and PBR passes
/// - UI overlay rendering
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,

    // Sky-box resources
    sky_ubo: UniformBuffer<SkyUniform>,
    sky_bind_group: wgpu::BindGroup,

    // Environment cube map, shared with the scene through an Arc
    environment_layout: BindGroupLayoutWithDesc,
    environment_bind_group: wgpu::BindGroup,

    // Per-mesh transform layout, shared with object GPU setup
    transform_bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu with default settings, creates the depth buffer and
    /// a placeholder environment, and sets up the sky-box and PBR pipelines.
    ///
    /// # Panics
    /// Panics if unable to create wgpu adapter or device
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 4096,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        // Global uniforms: camera + lights, bound at slot 0 everywhere.
        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        // Per-mesh transform layout, bound at slot 1.
        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Material layout (slot 2) taken from the material system so the
        // pipeline matches whatever bind groups materials create.
        let temp_material_bindings =
            crate::gfx::resources::material::MaterialBindings::new(&device);
        let material_bind_group_layout = temp_material_bindings.bind_group_layouts().clone();

        // Environment cube map (slot 3 in the PBR pass, slot 1 in the sky
        // pass). A 1x1 placeholder is bound until the real map arrives.
        let environment_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Environment Bind Group Layout");

        let placeholder = EnvironmentMap::placeholder(&device, &queue);
        let environment_bind_group = BindGroupBuilder::new(&environment_layout)
            .texture(&placeholder.view)
            .sampler(&placeholder.sampler)
            .create(&device, "Environment Bind Group");

        // Sky-box uniforms.
        let sky_ubo = UniformBuffer::<SkyUniform>::new(&device);
        let sky_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(&device, "Sky Bind Group Layout");
        let sky_bind_group = BindGroupBuilder::new(&sky_layout)
            .resource(sky_ubo.binding_resource())
            .create(&device, "Sky Bind Group");

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("pbr", include_str!("pbr.wgsl"));
        pipeline_manager.load_shader("sky", include_str!("skybox.wgsl"));

        // Sky-box pass: fullscreen triangle at the far plane, no depth write.
        pipeline_manager.register_pipeline(
            "Sky",
            PipelineConfig::default()
                .with_label("SKY")
                .with_shader("sky")
                .with_bind_group_layouts(vec![
                    sky_layout.layout.clone(),
                    environment_layout.layout.clone(),
                ])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_write(false)
                .with_depth_compare(wgpu::CompareFunction::LessEqual)
                .with_cull_mode(None)
                .with_no_vertex_buffers(),
        );

        // Main PBR pass.
        pipeline_manager.register_pipeline(
            "PBR",
            PipelineConfig::default()
                .with_label("PBR")
                .with_shader("pbr")
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    transform_bind_group_layout.clone(),
                    material_bind_group_layout,
                    environment_layout.layout.clone(),
                ]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            sky_ubo,
            sky_bind_group,
            environment_layout,
            environment_bind_group,
            transform_bind_group_layout,
        }
    }

    /// Swaps in the loaded environment cube map.
    ///
    /// The sky-box and every material reflection sample this map from the
    /// next frame on.
    pub fn set_environment(&mut self, environment: &Arc<EnvironmentMap>) {
        self.environment_bind_group = BindGroupBuilder::new(&self.environment_layout)
            .texture(&environment.view)
            .sampler(&environment.sampler)
            .create(&self.device, "Environment Bind Group");
    }

    /// Updates camera, lighting, and sky uniforms
    ///
    /// Should be called each frame before [`RenderEngine::render_frame`].
    pub fn update(&mut self, camera_uniform: CameraUniform, lighting: LightingConfig) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform, lighting);

        let view_proj = cgmath::Matrix4::from(camera_uniform.view_proj);
        let inv_view_proj = view_proj
            .invert()
            .unwrap_or_else(cgmath::Matrix4::identity);
        self.sky_ubo.update_content(
            &self.queue,
            SkyUniform {
                inv_view_proj: inv_view_proj.into(),
                view_position: camera_uniform.view_position,
            },
        );
    }

    /// Renders a frame with optional UI overlay
    ///
    /// Performs the sky-box pass, the main PBR pass over every visible
    /// object, and finally the UI overlay callback if one is provided.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure and retry next frame.
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::error!("Failed to acquire surface texture: {}", e);
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.12,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Background first; scene geometry overwrites it wherever the
            // depth test passes.
            if let Some(sky_pipeline) = self.pipeline_manager.get_pipeline("Sky") {
                render_pass.set_pipeline(sky_pipeline);
                render_pass.set_bind_group(0, &self.sky_bind_group, &[]);
                render_pass.set_bind_group(1, &self.environment_bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline("PBR") {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);
                render_pass.set_bind_group(3, &self.environment_bind_group, &[]);

                for object in scene.objects.iter() {
                    if !object.visible {
                        continue;
                    }
                    for mesh in &object.meshes {
                        let material = scene.material_for_mesh(mesh);
                        if let Some(material_bind_group) = material.get_bind_group() {
                            render_pass.set_bind_group(2, material_bind_group, &[]);
                            render_pass.draw_mesh(mesh);
                        } else {
                            log::debug!(
                                "skipping '{}' - material '{}' has no GPU resources",
                                mesh.name,
                                material.name
                            );
                        }
                    }
                }
            }
        }

        // UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Convenience method for rendering without UI
    pub fn render_frame_simple(&mut self, scene: &Scene) {
        self.render_frame(
            scene,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        );
    }

    /// Resizes the render engine surface and recreates the depth buffer
    ///
    /// Zero-sized dimensions are ignored; resizing to the current size is a
    /// no-op apart from the surface reconfigure.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;

        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Returns reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns reference to the wgpu command queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Layout for per-mesh transform bind groups, needed when uploading
    /// object GPU resources.
    pub fn transform_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.transform_bind_group_layout
    }
}
