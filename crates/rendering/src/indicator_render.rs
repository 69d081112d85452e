//! Mirrors each building's `IndicatorRack` into mesh entities.
//!
//! Billboards become unlit quads turned by the indicator's facing yaw;
//! outlines become a back-faced shell around the placeholder model. Opacity
//! tweens drive the material alpha. Meshes are despawned once their
//! indicator is detached or the building instance goes away.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::render::render_resource::Face;

use simulation::config::{CELL_SIZE, DEFAULT_MODEL_HEIGHT};
use simulation::effects::{
    DisplayNode, EffectKind, Indicator, IndicatorId, IndicatorRack, IndicatorVisual,
};

#[derive(Component)]
pub struct IndicatorMesh {
    pub tracked_entity: Entity,
    pub id: IndicatorId,
    material: Handle<StandardMaterial>,
    base_color: Srgba,
}

/// Icon tint per billboard kind: green for good news, red for trouble.
fn icon_color(icon: EffectKind) -> Srgba {
    match icon {
        EffectKind::Powerup | EffectKind::PowerBuff => Srgba::rgb(1.0, 0.85, 0.1),
        EffectKind::MissPower => Srgba::rgb(0.95, 0.6, 0.05),
        EffectKind::HumanBuff | EffectKind::Happy => Srgba::rgb(0.3, 0.85, 0.4),
        EffectKind::CoinBuff => Srgba::rgb(1.0, 0.75, 0.2),
        EffectKind::Upgrade => Srgba::rgb(0.2, 0.7, 1.0),
        EffectKind::PollutionDownBuff | EffectKind::PollutionLowerBuff => {
            Srgba::rgb(0.55, 0.85, 0.55)
        }
        EffectKind::PollutionUpBuff => Srgba::rgb(0.45, 0.4, 0.35),
        EffectKind::MissRoad | EffectKind::MissPopulation => Srgba::rgb(0.9, 0.25, 0.2),
        EffectKind::OverPopulation | EffectKind::Angry => Srgba::rgb(0.85, 0.1, 0.1),
        EffectKind::HumanDeBuff | EffectKind::Sad => Srgba::rgb(0.4, 0.45, 0.8),
        EffectKind::Scale | EffectKind::Outline => Srgba::WHITE,
    }
}

fn base_color(visual: &IndicatorVisual) -> Srgba {
    match visual {
        IndicatorVisual::Billboard { icon, .. } => icon_color(*icon),
        IndicatorVisual::Outline { color, .. } => *color,
    }
}

fn with_alpha(color: Srgba, opacity: f32) -> Color {
    Color::Srgba(color.with_alpha(opacity.clamp(0.0, 1.0)))
}

fn indicator_transform(rack: &IndicatorRack, indicator: &Indicator) -> Transform {
    let origin = rack.world_position();
    match indicator.visual {
        IndicatorVisual::Billboard { .. } => Transform::from_translation(origin + indicator.offset)
            .with_rotation(Quat::from_rotation_y(indicator.facing_yaw)),
        IndicatorVisual::Outline { .. } => {
            let scale = rack.model_scale();
            Transform::from_translation(origin + Vec3::Y * DEFAULT_MODEL_HEIGHT * 0.5 * scale)
                .with_scale(Vec3::splat(scale))
        }
    }
}

fn indicator_mesh(visual: &IndicatorVisual) -> Mesh {
    match *visual {
        IndicatorVisual::Billboard { size, .. } => Rectangle::new(size, size).into(),
        IndicatorVisual::Outline { thickness, .. } => {
            let edge = CELL_SIZE * 0.75 + thickness * 2.0;
            Cuboid::new(edge, DEFAULT_MODEL_HEIGHT + thickness * 2.0, edge).into()
        }
    }
}

fn spawn_indicator(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    tracked_entity: Entity,
    rack: &IndicatorRack,
    id: IndicatorId,
    indicator: &Indicator,
) {
    let color = base_color(&indicator.visual);
    let cull_mode = match indicator.visual {
        IndicatorVisual::Billboard { .. } => None,
        IndicatorVisual::Outline { .. } => Some(Face::Front),
    };
    let material = materials.add(StandardMaterial {
        base_color: with_alpha(color, indicator.opacity),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        double_sided: cull_mode.is_none(),
        cull_mode,
        ..default()
    });
    commands.spawn((
        IndicatorMesh {
            tracked_entity,
            id,
            material: material.clone(),
            base_color: color,
        },
        Mesh3d(meshes.add(indicator_mesh(&indicator.visual))),
        MeshMaterial3d(material),
        indicator_transform(rack, indicator),
    ));
}

/// Keep indicator meshes in step with every rack: spawn new ones, move and
/// fade existing ones, drop the ones whose indicator is gone.
pub fn sync_indicator_meshes(
    mut commands: Commands,
    racks: Query<(Entity, &IndicatorRack)>,
    mut existing: Query<(Entity, &IndicatorMesh, &mut Transform)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut by_key: HashMap<(Entity, IndicatorId), Entity> =
        HashMap::with_capacity(existing.iter().len());
    for (entity, mesh, _) in &existing {
        by_key.insert((mesh.tracked_entity, mesh.id), entity);
    }

    for (rack_entity, rack) in &racks {
        for (id, indicator) in rack.iter() {
            let Some(mesh_entity) = by_key.remove(&(rack_entity, id)) else {
                spawn_indicator(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    rack_entity,
                    rack,
                    id,
                    indicator,
                );
                continue;
            };
            let Ok((_, mesh, mut transform)) = existing.get_mut(mesh_entity) else {
                continue;
            };
            *transform = indicator_transform(rack, indicator);
            if let Some(material) = materials.get_mut(&mesh.material) {
                material.base_color = with_alpha(mesh.base_color, indicator.opacity);
            }
        }
    }

    // Whatever is left belongs to a detached indicator or a despawned building.
    for (_, mesh_entity) in by_key {
        commands.entity(mesh_entity).despawn();
    }
}
