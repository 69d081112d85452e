// =============================================================================
// World seeding: the starting city is a single factory in the middle of the
// grid.
// =============================================================================

use bevy::prelude::*;

use crate::building_data::{BuildingCatalog, BuildingType};
use crate::grid::{GridPos, Terrain, TileGrid};

/// Marker resource that, when present, causes `init_world` to skip seeding.
/// Used by the test harness to start with a blank grid.
#[derive(Resource)]
pub struct SkipWorldInit;

pub const STARTING_FACTORY: GridPos = GridPos::new(8, 8);

/// Put the starting buildings on `grid` without charging for them.
pub fn seed_world(grid: &mut TileGrid, catalog: &BuildingCatalog) {
    let Some(detail) = catalog.level(BuildingType::Factory, 1).cloned() else {
        warn!("No level 1 data for Factory, starting with an empty city");
        return;
    };
    if let Some(tile) = grid.get_mut(STARTING_FACTORY) {
        tile.terrain = Terrain::Ground;
        tile.building = Some(BuildingType::Factory);
        tile.level = 1;
        tile.output_factor = detail.output_factor;
        tile.detail = Some(detail);
    }
}

pub fn init_world(
    mut grid: ResMut<TileGrid>,
    catalog: Res<BuildingCatalog>,
    skip: Option<Res<SkipWorldInit>>,
) {
    if skip.is_some() {
        return;
    }
    seed_world(&mut grid, &catalog);
    info!(
        "Seeded starting factory at ({}, {})",
        STARTING_FACTORY.x, STARTING_FACTORY.y
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_places_factory() {
        let catalog = BuildingCatalog::builtin().unwrap();
        let mut grid = TileGrid::default();
        seed_world(&mut grid, &catalog);
        let tile = grid.get(STARTING_FACTORY).unwrap();
        assert_eq!(tile.building, Some(BuildingType::Factory));
        assert_eq!(tile.terrain, Terrain::Ground);
        assert_eq!(grid.iter().filter(|(_, t)| t.is_occupied()).count(), 1);
    }

    #[test]
    fn test_seed_with_empty_catalog_is_noop() {
        let mut grid = TileGrid::default();
        seed_world(&mut grid, &BuildingCatalog::default());
        assert!(grid.iter().all(|(_, t)| !t.is_occupied()));
    }
}
