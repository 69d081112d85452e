//! Builder methods for placing buildings and adjusting city state.

use crate::building_data::{BuildingCatalog, BuildingType};
use crate::city_state::{CityState, InteractionMode};
use crate::grid::{Direction, GridPos, Terrain, TileGrid};
use crate::rotation::RotationConfig;

use super::TestCity;

impl TestCity {
    // -----------------------------------------------------------------------
    // Grid and city setup
    // -----------------------------------------------------------------------

    /// Put a level 1 building straight onto the grid, skipping placement
    /// rules and cost.
    pub fn with_building(self, x: i32, y: i32, building: BuildingType) -> Self {
        self.with_building_level(x, y, building, 1)
    }

    pub fn with_building_level(mut self, x: i32, y: i32, building: BuildingType, level: u8) -> Self {
        let world = self.app.world_mut();
        let detail = world
            .resource::<BuildingCatalog>()
            .level(building, level)
            .cloned();
        let mut grid = world.resource_mut::<TileGrid>();
        if let Some(tile) = grid.get_mut(GridPos::new(x, y)) {
            tile.terrain = Terrain::Ground;
            tile.building = Some(building);
            tile.level = level;
            tile.direction = Direction::East;
            tile.output_factor = detail.as_ref().map_or(1.0, |d| d.output_factor);
            tile.detail = detail;
        }
        self
    }

    /// A straight run of road tiles from (x0,y) to (x1,y), inclusive.
    pub fn with_road(mut self, x0: i32, x1: i32, y: i32) -> Self {
        for x in x0.min(x1)..=x0.max(x1) {
            self = self.with_building(x, y, BuildingType::Road);
        }
        self
    }

    pub fn with_credits(mut self, credits: f64) -> Self {
        self.app.world_mut().resource_mut::<CityState>().credits = credits;
        self
    }

    pub fn with_mode(mut self, mode: InteractionMode) -> Self {
        self.app.world_mut().resource_mut::<CityState>().mode = mode;
        self
    }

    pub fn with_rotation_config(mut self, config: RotationConfig) -> Self {
        self.app.world_mut().insert_resource(config);
        self
    }
}
