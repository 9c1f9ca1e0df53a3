//! The showcase composition: an environment cube map, three concurrently
//! loaded models, two lights, and the material tuning panel.

use vitrine::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut app = vitrine::default();

    app.set_environment("textures");

    app.load_model(
        "models/red_brick_2k.gltf/red_brick_2k.gltf",
        Placement::default().with_scale(2.0),
    );
    app.load_model(
        "models/blue_metal_plate_2k.gltf/blue_metal_plate_2k.gltf",
        Placement::at(5.0, 0.0, 0.0),
    );
    app.load_model(
        "models/milkTruckGLB/CesiumMilkTruck.glb",
        Placement::at(-5.0, 0.0, 0.0).with_rotation(Deg(0.0), Deg(90.0), Deg(0.0)),
    );

    app.add_light(Light::Ambient {
        color: [1.0, 1.0, 1.0],
        intensity: 0.2,
    });
    app.add_light(Light::Directional {
        color: [1.0, 1.0, 1.0],
        intensity: 2.0,
        position: Vector3::new(0.0, 5.0, 5.0),
    });

    app.set_ui(|ui, scene, registry| {
        material_panel(ui, scene, registry);
    });

    app.run()
}
