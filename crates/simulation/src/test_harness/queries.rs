//! Query and simulation-tick methods for `TestCity`.

use bevy::prelude::*;

use crate::actions::CityAction;
use crate::buildings::{BuildingIndex, BuildingInstance};
use crate::city_state::{CityState, CityTotals};
use crate::effects::IndicatorRack;
use crate::grid::{GridPos, Tile, TileGrid};
use crate::status::StatusKind;
use crate::TickCounter;

use super::TestCity;

impl TestCity {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by executing the `FixedUpdate` schedule
    /// directly, bypassing Bevy's virtual time.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
            std::thread::yield_now();
        }
    }

    /// Queue a player action; it is applied on the next tick.
    pub fn send_action(&mut self, action: CityAction) {
        self.app.world_mut().send_event(action);
    }

    /// Queue an action and run one tick.
    pub fn act(&mut self, action: CityAction) {
        self.send_action(action);
        self.tick(1);
    }

    // -----------------------------------------------------------------------
    // Queries (note: Bevy's World::query() requires &mut World)
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn grid(&self) -> &TileGrid {
        self.app.world().resource::<TileGrid>()
    }

    pub fn tile(&self, x: i32, y: i32) -> &Tile {
        self.grid()
            .get(GridPos::new(x, y))
            .unwrap_or_else(|| panic!("({x}, {y}) is outside the grid"))
    }

    pub fn city(&self) -> &CityState {
        self.app.world().resource::<CityState>()
    }

    pub fn totals(&self) -> &CityTotals {
        self.app.world().resource::<CityTotals>()
    }

    pub fn tick_count(&self) -> u64 {
        self.app.world().resource::<TickCounter>().0
    }

    /// Number of live building instances.
    pub fn building_count(&mut self) -> usize {
        self.app
            .world_mut()
            .query::<&BuildingInstance>()
            .iter(self.app.world())
            .count()
    }

    pub fn entity_at(&self, x: i32, y: i32) -> Option<Entity> {
        self.app
            .world()
            .resource::<BuildingIndex>()
            .get(GridPos::new(x, y))
    }

    pub fn instance_at(&self, x: i32, y: i32) -> Option<&BuildingInstance> {
        let entity = self.entity_at(x, y)?;
        self.app.world().get::<BuildingInstance>(entity)
    }

    pub fn rack_at(&self, x: i32, y: i32) -> Option<&IndicatorRack> {
        let entity = self.entity_at(x, y)?;
        self.app.world().get::<IndicatorRack>(entity)
    }

    /// Indicators attached to the building at (x, y); 0 when none stands there.
    pub fn indicator_count_at(&self, x: i32, y: i32) -> usize {
        self.rack_at(x, y).map_or(0, |rack| rack.len())
    }

    pub fn displayed_status_at(&self, x: i32, y: i32) -> Option<StatusKind> {
        self.instance_at(x, y)?.displayed_status()
    }

    /// Kinds currently holding for the building at (x, y), buffs first.
    pub fn statuses_at(&self, x: i32, y: i32) -> Vec<StatusKind> {
        self.instance_at(x, y).map_or_else(Vec::new, |instance| {
            let sets = instance.status_sets();
            sets.buffs
                .iter()
                .chain(&sets.debuffs)
                .map(|s| s.kind)
                .collect()
        })
    }
}
