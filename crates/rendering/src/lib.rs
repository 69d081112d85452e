use bevy::prelude::*;

pub mod building_render;
pub mod camera;
pub mod indicator_render;
pub mod terrain_render;

use building_render::BuildingModelCache;
use simulation::SimulationUpdateSet;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildingModelCache>()
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    setup_lighting,
                    terrain_render::spawn_terrain_tiles,
                )
                    .chain()
                    .after(simulation::world_init::init_world),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan_keyboard,
                    camera::camera_rotate_keyboard,
                    camera::camera_zoom,
                    camera::apply_iso_camera,
                )
                    .chain()
                    .in_set(SimulationUpdateSet::Input),
            )
            .add_systems(
                Update,
                (
                    terrain_render::update_terrain_tiles,
                    building_render::spawn_building_meshes,
                    building_render::update_building_meshes,
                    building_render::cleanup_orphan_building_meshes,
                    indicator_render::sync_indicator_meshes,
                )
                    .in_set(SimulationUpdateSet::Visual),
            );
    }
}

/// Soft sky fill plus one shadow-casting sun, low enough that the
/// placeholder boxes read as 3D from the isometric angle.
fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.85, 0.9, 1.0),
        brightness: 350.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 9000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
