use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use simulation::building_data::BuildingType;
use simulation::buildings::BuildingInstance;
use simulation::config::{CELL_SIZE, DEFAULT_MODEL_HEIGHT};
use simulation::effects::{DisplayNode, IndicatorRack};

/// Placeholder model standing in for a building instance entity.
#[derive(Component)]
pub struct BuildingMesh3d {
    pub tracked_entity: Entity,
    /// Model height at scale 1, used to keep the base on the ground.
    pub height: f32,
}

/// Footprint and height of the placeholder box, in world units.
fn model_size(building: BuildingType) -> Vec3 {
    let cell = CELL_SIZE;
    match building {
        BuildingType::Road => Vec3::new(cell * 0.98, 0.04, cell * 0.98),
        BuildingType::Park | BuildingType::HeroPark => Vec3::new(cell * 0.9, 0.08, cell * 0.9),
        BuildingType::House | BuildingType::Police | BuildingType::FireStation => {
            Vec3::new(cell * 0.6, DEFAULT_MODEL_HEIGHT * 0.75, cell * 0.6)
        }
        BuildingType::WindPower | BuildingType::WaterTower => {
            Vec3::new(cell * 0.25, DEFAULT_MODEL_HEIGHT * 1.25, cell * 0.25)
        }
        BuildingType::SunPower => Vec3::new(cell * 0.8, 0.15, cell * 0.6),
        _ => Vec3::new(cell * 0.75, DEFAULT_MODEL_HEIGHT, cell * 0.75),
    }
}

fn model_color(building: BuildingType) -> Color {
    match building {
        BuildingType::Road => Color::srgb(0.25, 0.25, 0.28),
        BuildingType::House => Color::srgb(0.93, 0.78, 0.55),
        BuildingType::House2 => Color::srgb(0.85, 0.62, 0.48),
        BuildingType::Shop => Color::srgb(0.38, 0.6, 0.86),
        BuildingType::Factory => Color::srgb(0.55, 0.5, 0.45),
        BuildingType::NukeFactory => Color::srgb(0.7, 0.75, 0.3),
        BuildingType::SunPower => Color::srgb(0.15, 0.22, 0.45),
        BuildingType::WindPower => Color::srgb(0.95, 0.95, 0.95),
        BuildingType::FireStation => Color::srgb(0.85, 0.2, 0.18),
        BuildingType::Hospital => Color::srgb(0.92, 0.92, 0.96),
        BuildingType::Police => Color::srgb(0.2, 0.3, 0.65),
        BuildingType::HeroPark => Color::srgb(0.25, 0.55, 0.3),
        BuildingType::Park => Color::srgb(0.3, 0.7, 0.35),
        BuildingType::WaterTower => Color::srgb(0.45, 0.7, 0.85),
    }
}

/// Mesh and material per building type, created on first use.
#[derive(Resource, Default)]
pub struct BuildingModelCache {
    models: HashMap<BuildingType, (Handle<Mesh>, Handle<StandardMaterial>)>,
}

impl BuildingModelCache {
    pub fn get_or_create(
        &mut self,
        building: BuildingType,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> (Handle<Mesh>, Handle<StandardMaterial>) {
        self.models
            .entry(building)
            .or_insert_with(|| {
                let size = model_size(building);
                (
                    meshes.add(Cuboid::new(size.x, size.y, size.z)),
                    materials.add(StandardMaterial {
                        base_color: model_color(building),
                        perceptual_roughness: 0.8,
                        ..default()
                    }),
                )
            })
            .clone()
    }
}

pub fn spawn_building_meshes(
    mut commands: Commands,
    instances: Query<(Entity, &BuildingInstance, &IndicatorRack), Added<BuildingInstance>>,
    existing: Query<&BuildingMesh3d>,
    mut cache: ResMut<BuildingModelCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if instances.is_empty() {
        return;
    }
    let tracked: HashSet<Entity> = existing.iter().map(|m| m.tracked_entity).collect();

    for (entity, instance, rack) in &instances {
        if tracked.contains(&entity) {
            continue;
        }
        let (mesh, material) = cache.get_or_create(instance.building, &mut meshes, &mut materials);
        let height = model_size(instance.building).y;
        commands.spawn((
            BuildingMesh3d {
                tracked_entity: entity,
                height,
            },
            Mesh3d(mesh),
            MeshMaterial3d(material),
            model_transform(instance, rack, height),
        ));
    }
}

fn model_transform(instance: &BuildingInstance, rack: &IndicatorRack, height: f32) -> Transform {
    let scale = rack.model_scale();
    let base = rack.world_position();
    Transform::from_translation(base + Vec3::Y * height * 0.5 * scale)
        .with_rotation(Quat::from_rotation_y(instance.direction.yaw_radians()))
        .with_scale(Vec3::splat(scale))
}

/// Follow scale pulses and orientation changes of the tracked instance.
pub fn update_building_meshes(
    instances: Query<(&BuildingInstance, &IndicatorRack), Changed<IndicatorRack>>,
    mut models: Query<(&BuildingMesh3d, &mut Transform)>,
) {
    for (model, mut transform) in &mut models {
        if let Ok((instance, rack)) = instances.get(model.tracked_entity) {
            *transform = model_transform(instance, rack, model.height);
        }
    }
}

/// Remove models whose building instance has been despawned.
pub fn cleanup_orphan_building_meshes(
    mut commands: Commands,
    models: Query<(Entity, &BuildingMesh3d)>,
    instances: Query<(), With<BuildingInstance>>,
) {
    for (entity, model) in &models {
        if instances.get(model.tracked_entity).is_err() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_types_are_lower_than_default_model() {
        for building in [BuildingType::Road, BuildingType::Park, BuildingType::SunPower] {
            assert!(model_size(building).y < DEFAULT_MODEL_HEIGHT, "{building:?}");
        }
    }

    #[test]
    fn test_models_fit_inside_a_cell() {
        for building in BuildingType::ALL {
            let size = model_size(building);
            assert!(size.x <= CELL_SIZE && size.z <= CELL_SIZE, "{building:?}");
        }
    }
}
