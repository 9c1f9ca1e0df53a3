// src/ui/panel.rs
//! Material tuning panel
//!
//! The panel shows one slider per registered material binding. Bindings are
//! registered as models finish loading and only ever accumulate; the
//! registry references materials by id and never owns them.

use crate::gfx::resources::material::{Material, MaterialId};
use crate::gfx::scene::scene::Scene;

/// A material parameter exposed to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunableParam {
    Roughness,
    Metalness,
}

impl TunableParam {
    pub fn label(&self) -> &'static str {
        match self {
            TunableParam::Roughness => "roughness",
            TunableParam::Metalness => "metalness",
        }
    }

    fn get(&self, material: &Material) -> f32 {
        match self {
            TunableParam::Roughness => material.roughness,
            TunableParam::Metalness => material.metallic,
        }
    }

    fn apply(&self, material: &mut Material, value: f32) {
        match self {
            TunableParam::Roughness => material.roughness = value,
            TunableParam::Metalness => material.metallic = value,
        }
    }
}

/// One slider registration: which material, which parameter, what range.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialBinding {
    pub material: MaterialId,
    pub param: TunableParam,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

/// The panel's registry of tunable parameters.
///
/// Grows monotonically; there is no removal path. Display order follows
/// registration order, which follows model completion order.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<MaterialBinding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one tunable parameter for a material.
    pub fn register(&mut self, material: &MaterialId, param: TunableParam) {
        self.bindings.push(MaterialBinding {
            material: material.clone(),
            param,
            min: 0.0,
            max: 1.0,
            step: 0.01,
        });
    }

    /// Registers the standard pair of sliders for a mesh's material.
    pub fn register_material(&mut self, material: &MaterialId) {
        self.register(material, TunableParam::Roughness);
        self.register(material, TunableParam::Metalness);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialBinding> {
        self.bindings.iter()
    }

    /// Bindings grouped by material, preserving first-registration order.
    pub fn grouped(&self) -> Vec<(&MaterialId, Vec<&MaterialBinding>)> {
        let mut groups: Vec<(&MaterialId, Vec<&MaterialBinding>)> = Vec::new();
        for binding in &self.bindings {
            match groups.iter_mut().find(|(id, _)| *id == &binding.material) {
                Some((_, bindings)) => bindings.push(binding),
                None => groups.push((&binding.material, vec![binding])),
            }
        }
        groups
    }
}

/// Snaps a slider value to the binding's step granularity.
fn quantize(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Draws the material tuning panel.
///
/// One collapsing section per material, one slider per binding. Slider
/// changes are written straight back into the material library; the GPU
/// sync happens in the per-frame material update.
pub fn material_panel(ui: &imgui::Ui, scene: &mut Scene, registry: &BindingRegistry) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Materials")
        .size([360.0, 480.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            if registry.is_empty() {
                ui.text("No materials loaded yet");
                return;
            }

            for (material_id, bindings) in registry.grouped() {
                if !ui.collapsing_header(material_id, imgui::TreeNodeFlags::DEFAULT_OPEN) {
                    continue;
                }

                let Some(material) = scene.material_manager.get_material_mut(material_id)
                else {
                    continue;
                };

                for binding in bindings {
                    let mut value = binding.param.get(material);
                    let label = format!("{}##{}", binding.param.label(), material_id);
                    if ui.slider(&label, binding.min, binding.max, &mut value) {
                        let value =
                            quantize(value, binding.step).clamp(binding.min, binding.max);
                        binding.param.apply(material, value);
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_material_adds_exactly_two_bindings() {
        let mut registry = BindingRegistry::new();
        let id = "brick/mat".to_string();
        registry.register_material(&id);

        assert_eq!(registry.len(), 2);
        let params: Vec<TunableParam> = registry.iter().map(|b| b.param).collect();
        assert_eq!(params, vec![TunableParam::Roughness, TunableParam::Metalness]);
        for binding in registry.iter() {
            assert_eq!(binding.min, 0.0);
            assert_eq!(binding.max, 1.0);
            assert_eq!(binding.step, 0.01);
        }
    }

    #[test]
    fn registry_only_grows() {
        let mut registry = BindingRegistry::new();
        let first = "a/mat".to_string();
        let second = "b/mat".to_string();

        registry.register_material(&first);
        let after_first = registry.len();
        registry.register_material(&second);

        assert_eq!(registry.len(), after_first + 2);
        // Earlier registrations stay where they were.
        assert_eq!(registry.iter().next().unwrap().material, first);
    }

    #[test]
    fn grouping_preserves_first_seen_order() {
        let mut registry = BindingRegistry::new();
        let truck = "truck/paint".to_string();
        let brick = "brick/clay".to_string();
        registry.register_material(&truck);
        registry.register_material(&brick);
        registry.register(&truck, TunableParam::Roughness);

        let groups = registry.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, &truck);
        assert_eq!(groups[0].1.len(), 3);
        assert_eq!(groups[1].0, &brick);
    }

    #[test]
    fn quantize_snaps_to_step() {
        assert!((quantize(0.123, 0.01) - 0.12).abs() < 1e-6);
        assert!((quantize(0.999, 0.01) - 1.0).abs() < 1e-6);
        assert_eq!(quantize(0.5, 0.0), 0.5);
    }
}
