//! Application shell and event loop
//!
//! Wires the window, render engine, UI, and scene together, and drives the
//! asynchronous model loads. Loads run on worker threads and report back
//! through the winit event-loop proxy, so every completion continuation
//! (placement, material registration, scene insertion) runs on the
//! event-loop thread. Completions may arrive in any order but never
//! overlap.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use cgmath::{Vector3, Zero};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowAttributes},
};

use crate::assets::{CubeMapData, CubeMapLoader, GltfLoader, ModelData};
use crate::error::AssetError;
use crate::gfx::{
    camera::{
        camera_controller::CameraController, camera_utils::CameraManager, orbit_camera::OrbitCamera,
    },
    geometry,
    rendering::render_engine::RenderEngine,
    resources::environment::EnvironmentMap,
    resources::material::Material,
    scene::{Light, Object, Placement, Scene},
};
use crate::ui::{BindingRegistry, UiManager};

/// UI callback type: builds the debug panel each frame.
pub type UiCallback = Box<dyn Fn(&imgui::Ui, &mut Scene, &BindingRegistry) + Send + Sync>;

/// Render resolution is capped at twice the logical size regardless of how
/// dense the monitor actually is.
const MAX_PIXEL_RATIO: f64 = 2.0;

/// One queued model load: the resource path and where the model goes.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub path: String,
    pub placement: Placement,
}

/// Events delivered from worker threads back into the event loop.
pub enum AppEvent {
    ModelLoaded {
        request: ModelRequest,
        result: Result<ModelData, AssetError>,
    },
    EnvironmentLoaded(Result<CubeMapData, AssetError>),
}

pub struct VitrineApp {
    event_loop: Option<EventLoop<AppEvent>>,
    app_state: AppState,
    ui_callback: Option<UiCallback>,
}

struct AppState {
    proxy: EventLoopProxy<AppEvent>,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    registry: BindingRegistry,
    ui_callback: Option<UiCallback>,
    model_loader: GltfLoader,
    environment_dir: Option<PathBuf>,
    pending_models: Vec<ModelRequest>,
    last_frame: Instant,
}

impl VitrineApp {
    /// Create a new viewer application with default settings
    pub async fn new() -> Self {
        let event_loop = EventLoop::<AppEvent>::with_user_event()
            .build()
            .expect("Failed to create event loop");
        let proxy = event_loop.create_proxy();

        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.bounds.min_distance = Some(0.5);
        let controller = CameraController::new(0.005, 0.1);
        let scene = Scene::new(CameraManager::new(camera, controller));

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                proxy,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                registry: BindingRegistry::new(),
                ui_callback: None,
                model_loader: GltfLoader::new("assets"),
                environment_dir: None,
                pending_models: Vec::new(),
                last_frame: Instant::now(),
            },
            ui_callback: None,
        }
    }

    /// Set UI callback
    pub fn set_ui<F>(&mut self, ui_fn: F)
    where
        F: Fn(&imgui::Ui, &mut Scene, &BindingRegistry) + Send + Sync + 'static,
    {
        self.ui_callback = Some(Box::new(ui_fn));
    }

    /// Changes the asset root all relative resource paths resolve against.
    pub fn set_asset_root(&mut self, root: impl Into<PathBuf>) {
        self.app_state.model_loader = GltfLoader::new(root);
    }

    /// Configures the cube-map directory (relative to the asset root). The
    /// six face files are loaded when the app starts.
    pub fn set_environment(&mut self, dir: impl Into<PathBuf>) {
        self.app_state.environment_dir = Some(dir.into());
    }

    /// Queues a model load. All queued loads are dispatched concurrently at
    /// startup and land in the scene in whatever order they finish.
    pub fn load_model(&mut self, path: &str, placement: Placement) {
        self.app_state.pending_models.push(ModelRequest {
            path: path.to_string(),
            placement,
        });
    }

    pub fn add_light(&mut self, light: Light) {
        self.app_state.scene.add_light(light);
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        self.app_state.ui_callback = self.ui_callback.take();

        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }
}

impl AppState {
    /// Spawns every queued load on its own worker thread. Results come back
    /// as [`AppEvent`]s; nothing blocks the event loop.
    fn dispatch_loads(&mut self) {
        if let Some(dir) = self.environment_dir.take() {
            let loader = CubeMapLoader::new(self.model_loader.asset_root().join(dir));
            let proxy = self.proxy.clone();
            std::thread::spawn(move || {
                let result = loader.load();
                let _ = proxy.send_event(AppEvent::EnvironmentLoaded(result));
            });
        }

        let requests: Vec<ModelRequest> = self.pending_models.drain(..).collect();
        log::info!("dispatching {} model loads", requests.len());
        for request in requests {
            let loader = self.model_loader.clone();
            let proxy = self.proxy.clone();
            std::thread::spawn(move || {
                let result = loader.load(&request.path);
                let _ = proxy.send_event(AppEvent::ModelLoaded { request, result });
            });
        }
    }

    /// Continuation for a successful model load: placement, environment
    /// sharing, panel registration, scene insertion.
    fn insert_model(&mut self, data: ModelData, request: ModelRequest) {
        let Some(engine) = self.render_engine.as_ref() else {
            return;
        };

        let index = self.scene.add_model(data, request.placement);

        // Pre-order over the flattened meshes: two sliders per mesh that
        // carries a material.
        let material_ids: Vec<_> = self.scene.objects[index]
            .meshes
            .iter()
            .filter_map(|mesh| mesh.material_id.clone())
            .collect();
        for id in &material_ids {
            self.registry.register_material(id);
        }

        let (device, queue) = (engine.device(), engine.queue());
        if let Some(object) = self.scene.get_object_mut(index) {
            object.init_gpu_resources(device, engine.transform_bind_group_layout());
        }
        self.scene.update_materials(device, queue);

        log::info!(
            "model '{}' added to scene ({} tunable parameters registered)",
            request.path,
            material_ids.len() * 2
        );
    }

    /// Failure continuation: log the failing path and park a visibly wrong
    /// placeholder cube at the intended placement so the slot is not
    /// silently empty.
    fn insert_placeholder(&mut self, request: &ModelRequest) {
        let Some(engine) = self.render_engine.as_ref() else {
            return;
        };

        let material_id = format!("{}/placeholder", request.path);
        let mut material = Material::new(&material_id, [0.9, 0.1, 0.6, 1.0], 0.0, 0.9);
        if let Some(environment) = self.scene.environment() {
            material.set_environment(environment.clone());
        }
        self.scene.material_manager.add_material(material);

        let mut mesh = geometry::generate_cube("placeholder_cube");
        mesh.material_id = Some(material_id.clone());
        let mut object = Object::new(&format!("{} (missing)", request.path), vec![mesh]);
        object.placement = request.placement;

        let (device, queue) = (engine.device(), engine.queue());
        object.init_gpu_resources(device, engine.transform_bind_group_layout());
        let index = self.scene.add_object(object);
        self.scene.update_materials(device, queue);
        self.registry.register_material(&material_id);

        log::warn!(
            "substituted placeholder cube for '{}' (object #{})",
            request.path,
            index
        );
    }
}

impl ApplicationHandler<AppEvent> for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("vitrine")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) =
                capped_surface_size(window_handle.inner_size(), window_handle.scale_factor());

            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            });

            self.scene
                .camera_manager
                .camera
                .resize_projection(width, height);

            let ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
            );

            self.ui_manager = Some(ui_manager);
            self.render_engine = Some(renderer);
            self.last_frame = Instant::now();

            self.dispatch_loads();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::EnvironmentLoaded(Ok(data)) => {
                if let Some(engine) = self.render_engine.as_mut() {
                    let environment =
                        Arc::new(EnvironmentMap::from_data(engine.device(), engine.queue(), &data));
                    engine.set_environment(&environment);
                    self.scene.set_environment(environment);
                    log::info!("environment cube map ready ({}px faces)", data.size);
                }
            }
            AppEvent::EnvironmentLoaded(Err(error)) => {
                // The scene keeps the placeholder background.
                log::error!(
                    "environment map failed to load ('{}'): {}",
                    error.path().display(),
                    error
                );
            }
            AppEvent::ModelLoaded { request, result } => {
                match result {
                    Ok(data) => self.insert_model(data, request),
                    Err(error) => {
                        log::error!(
                            "model load failed ('{}'): {}",
                            error.path().display(),
                            error
                        );
                        self.insert_placeholder(&request);
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(window, &ui_event) {
                // UI consumed the event - request redraw and return early
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(size) => {
                let (width, height) = capped_surface_size(size, window.scale_factor());
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_frame.elapsed();
                self.last_frame = Instant::now();

                // Controls advance before anything is rendered this tick.
                self.scene.camera_manager.update(dt);
                self.scene.update();
                render_engine
                    .update(self.scene.camera_manager.camera.uniform, self.scene.lighting());

                // Build the UI before the render pass so slider edits land
                // in this frame's material upload.
                if let (Some(ui_manager), Some(ui_callback)) =
                    (self.ui_manager.as_mut(), &self.ui_callback)
                {
                    let scene = &mut self.scene;
                    let registry = &self.registry;
                    ui_manager.update_logic(window, |ui| ui_callback(ui, scene, registry));
                }
                self.scene
                    .update_materials(render_engine.device(), render_engine.queue());

                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    render_engine.render_frame(
                        &self.scene,
                        Some(|device: &wgpu::Device,
                              queue: &wgpu::Queue,
                              encoder: &mut wgpu::CommandEncoder,
                              color_attachment: &wgpu::TextureView| {
                            ui_manager.render_display_only(device, queue, encoder, color_attachment);
                        }),
                    );
                } else {
                    render_engine.render_frame_simple(&self.scene);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        // Check if UI wants to capture input before processing camera events
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_input() {
                return;
            }
        }

        self.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

/// Caps the render resolution at [`MAX_PIXEL_RATIO`] times the logical size.
///
/// On a 1x or 2x display this is the physical size unchanged; denser
/// displays render at 2x and let the compositor upscale.
fn capped_surface_size(size: PhysicalSize<u32>, scale_factor: f64) -> (u32, u32) {
    if scale_factor <= MAX_PIXEL_RATIO {
        return (size.width, size.height);
    }
    let ratio = MAX_PIXEL_RATIO / scale_factor;
    (
        (size.width as f64 * ratio).round() as u32,
        (size.height as f64 * ratio).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_passes_through_at_normal_density() {
        let size = PhysicalSize::new(1200, 800);
        assert_eq!(capped_surface_size(size, 1.0), (1200, 800));
        assert_eq!(capped_surface_size(size, 2.0), (1200, 800));
    }

    #[test]
    fn surface_size_is_capped_on_dense_displays() {
        // 3x display: physical 3600x2400 for a 1200x800 logical window,
        // capped to the 2x equivalent.
        let size = PhysicalSize::new(3600, 2400);
        assert_eq!(capped_surface_size(size, 3.0), (2400, 1600));
    }

    #[test]
    fn surface_size_cap_is_deterministic() {
        let size = PhysicalSize::new(2880, 1800);
        let once = capped_surface_size(size, 4.0);
        let twice = capped_surface_size(size, 4.0);
        assert_eq!(once, twice);
    }
}
