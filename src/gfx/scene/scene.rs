use std::sync::Arc;

use cgmath::Vector3;
use wgpu::Device;

use crate::assets::gltf::ModelData;
use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::environment::EnvironmentMap,
    resources::material::{Material, MaterialId, MaterialManager},
};

use super::object::{Mesh, Object};
use super::placement::Placement;

/// A light source in the scene.
///
/// The viewer carries exactly the two kinds the showcase composition uses:
/// a scene-wide ambient term and one directional key light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vector3<f32>,
    },
}

/// Flattened lighting state consumed by the global uniform buffer.
#[derive(Debug, Clone, Copy)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_position: Vector3<f32>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.0,
            sun_color: [1.0, 1.0, 1.0],
            sun_intensity: 0.0,
            sun_position: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Main scene containing objects, lights, materials, and camera.
///
/// Objects and lights only ever get appended; the environment map is set
/// once and shared by reference with every material that opts in.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
    pub material_manager: MaterialManager,
    environment: Option<Arc<EnvironmentMap>>,
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            lights: Vec::new(),
            material_manager: MaterialManager::new(),
            environment: None,
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    /// Inserts a parsed model into the scene.
    ///
    /// Registers the model's materials in the material library under
    /// `<object>/<material>` ids, assigns the shared environment map to each
    /// of them, and appends the object. Returns the index of the new object.
    pub fn add_model(&mut self, mut data: ModelData, placement: Placement) -> usize {
        let object_name = self.ensure_unique_name(&data.name);
        data.name = object_name.clone();

        let mut material_ids: Vec<MaterialId> = Vec::new();
        for material_data in data.materials.drain(..) {
            let id = format!("{}/{}", object_name, material_data.name);
            let mut material = Material::from_data(&id, material_data);
            if let Some(environment) = &self.environment {
                material.set_environment(environment.clone());
            }
            self.material_manager.add_material(material);
            material_ids.push(id);
        }

        let object = Object::from_model(data, placement, &material_ids);
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Appends a ready-made object (used for placeholder geometry).
    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Collapses the light list into the per-frame lighting state: the first
    /// ambient light and the first directional light win.
    pub fn lighting(&self) -> LightingConfig {
        let mut config = LightingConfig::default();
        let mut have_ambient = false;
        let mut have_sun = false;
        for light in &self.lights {
            match *light {
                Light::Ambient { color, intensity } if !have_ambient => {
                    config.ambient_color = color;
                    config.ambient_intensity = intensity;
                    have_ambient = true;
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                } if !have_sun => {
                    config.sun_color = color;
                    config.sun_intensity = intensity;
                    config.sun_position = position;
                    have_sun = true;
                }
                _ => {}
            }
        }
        config
    }

    /// Sets the shared environment map and hands the reference to every
    /// material already in the library. Materials added later pick it up in
    /// [`Scene::add_model`].
    pub fn set_environment(&mut self, environment: Arc<EnvironmentMap>) {
        for material in self.material_manager.materials_mut() {
            material.set_environment(environment.clone());
        }
        self.environment = Some(environment);
    }

    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    /// Gets the material for rendering a mesh, falling back to the default
    /// material when none is assigned.
    pub fn material_for_mesh(&self, mesh: &Mesh) -> &Material {
        self.material_manager
            .get_material_for_mesh(mesh.material_id.as_ref())
    }

    /// Syncs material GPU resources. Cheap when nothing changed.
    pub fn update_materials(&mut self, device: &Device, queue: &wgpu::Queue) {
        self.material_manager.update_all_gpu_resources(device, queue);
    }

    // UI helper methods

    /// Gets all object names for UI display
    pub fn get_object_names(&self) -> Vec<String> {
        self.objects.iter().map(|obj| obj.name.clone()).collect()
    }

    /// Gets mutable reference to an object by index
    pub fn get_object_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.objects.get_mut(index)
    }

    fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{
        camera_controller::CameraController, camera_utils::CameraManager,
        orbit_camera::OrbitCamera,
    };

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0), 1.0);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller))
    }

    fn model(name: &str) -> ModelData {
        ModelData {
            name: name.to_string(),
            meshes: vec![crate::assets::gltf::MeshData {
                name: "mesh".to_string(),
                positions: vec![[0.0; 3]; 3],
                normals: vec![[0.0, 0.0, 1.0]; 3],
                tex_coords: vec![[0.0; 2]; 3],
                indices: vec![0, 1, 2],
                transform: cgmath::SquareMatrix::identity(),
                material: Some(0),
            }],
            materials: vec![crate::assets::gltf::MaterialData {
                name: "mat".to_string(),
                base_color: [1.0; 4],
                metallic: 0.5,
                roughness: 0.5,
                base_color_image: None,
            }],
        }
    }

    #[test]
    fn three_models_land_exactly_once_each() {
        let mut scene = test_scene();
        // Completion order is arbitrary; insertion order just follows it.
        scene.add_model(model("truck"), Placement::at(-5.0, 0.0, 0.0));
        scene.add_model(model("brick"), Placement::default());
        scene.add_model(model("plate"), Placement::at(5.0, 0.0, 0.0));

        assert_eq!(scene.objects.len(), 3);
        let names = scene.get_object_names();
        assert_eq!(names.len(), 3);
        for name in &names {
            assert_eq!(names.iter().filter(|n| *n == name).count(), 1);
        }
    }

    #[test]
    fn duplicate_model_names_stay_distinct() {
        let mut scene = test_scene();
        scene.add_model(model("brick"), Placement::default());
        scene.add_model(model("brick"), Placement::at(5.0, 0.0, 0.0));

        let names = scene.get_object_names();
        assert_eq!(names[0], "brick");
        assert_eq!(names[1], "brick (1)");
    }

    #[test]
    fn lighting_takes_first_of_each_kind() {
        let mut scene = test_scene();
        scene.add_light(Light::Ambient {
            color: [1.0, 1.0, 1.0],
            intensity: 0.2,
        });
        scene.add_light(Light::Directional {
            color: [1.0, 1.0, 1.0],
            intensity: 2.0,
            position: Vector3::new(0.0, 5.0, 5.0),
        });

        let lighting = scene.lighting();
        assert_eq!(lighting.ambient_intensity, 0.2);
        assert_eq!(lighting.sun_intensity, 2.0);
        assert_eq!(lighting.sun_position, Vector3::new(0.0, 5.0, 5.0));
        assert_eq!(scene.lights.len(), 2);
    }

    #[test]
    fn model_materials_are_registered_per_object() {
        let mut scene = test_scene();
        scene.add_model(model("brick"), Placement::default());

        let mesh = &scene.objects[0].meshes[0];
        assert_eq!(mesh.material_id.as_deref(), Some("brick/mat"));
        let material = scene.material_for_mesh(mesh);
        assert_eq!(material.name, "brick/mat");
        assert_eq!(material.metallic, 0.5);
    }
}
