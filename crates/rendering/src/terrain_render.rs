use bevy::prelude::*;

use simulation::config::CELL_SIZE;
use simulation::grid::{GridPos, Terrain, TileGrid};

/// One ground quad per tile.
#[derive(Component)]
pub struct TerrainTile {
    pub pos: GridPos,
    pub terrain: Terrain,
}

/// Shared materials, one per terrain kind.
#[derive(Resource)]
pub struct TerrainMaterials {
    pub grass: Handle<StandardMaterial>,
    pub ground: Handle<StandardMaterial>,
}

impl TerrainMaterials {
    fn get(&self, terrain: Terrain) -> Handle<StandardMaterial> {
        match terrain {
            Terrain::Grass => self.grass.clone(),
            Terrain::Ground => self.ground.clone(),
        }
    }
}

pub fn spawn_terrain_tiles(
    mut commands: Commands,
    grid: Res<TileGrid>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let palette = TerrainMaterials {
        grass: materials.add(StandardMaterial {
            base_color: Color::srgb(0.36, 0.62, 0.29),
            perceptual_roughness: 0.95,
            ..default()
        }),
        ground: materials.add(StandardMaterial {
            base_color: Color::srgb(0.58, 0.47, 0.34),
            perceptual_roughness: 0.95,
            ..default()
        }),
    };
    // Slightly under a full cell so tile seams stay visible.
    let mesh = meshes.add(Plane3d::default().mesh().size(CELL_SIZE * 0.96, CELL_SIZE * 0.96));

    for (pos, tile) in grid.iter() {
        commands.spawn((
            TerrainTile {
                pos,
                terrain: tile.terrain,
            },
            Mesh3d(mesh.clone()),
            MeshMaterial3d(palette.get(tile.terrain)),
            Transform::from_translation(grid.grid_to_world(pos)),
        ));
    }
    commands.insert_resource(palette);
}

/// Swap tile materials when the grid's terrain changes (build clears grass,
/// demolishing an empty tile restores it).
pub fn update_terrain_tiles(
    grid: Res<TileGrid>,
    palette: Option<Res<TerrainMaterials>>,
    mut tiles: Query<(&mut TerrainTile, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    if !grid.is_changed() {
        return;
    }
    let Some(palette) = palette else {
        return;
    };
    for (mut tile, mut material) in &mut tiles {
        let Some(current) = grid.get(tile.pos).map(|t| t.terrain) else {
            continue;
        };
        if current != tile.terrain {
            tile.terrain = current;
            material.0 = palette.get(current);
        }
    }
}
