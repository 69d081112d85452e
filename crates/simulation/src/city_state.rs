use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::building_data::{BuildingCatalog, BuildingType, Language};
use crate::config::STARTING_CREDITS;
use crate::grid::TileGrid;
use crate::modifiers::TileOutputs;

/// What a click on the map does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Inspect buildings. Upgrade prompts only show in this mode.
    Select,
    #[default]
    Build,
    Demolish,
    Relocate,
}

/// Global player-facing state.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct CityState {
    pub credits: f64,
    pub mode: InteractionMode,
    pub game_day: u32,
    /// 0..=100.
    pub stability: f64,
    /// Stability change applied at the next day rollover.
    pub stability_change_rate: f64,
    pub language: Language,
}

impl Default for CityState {
    fn default() -> Self {
        Self {
            credits: STARTING_CREDITS,
            mode: InteractionMode::default(),
            game_day: 1,
            stability: 100.0,
            stability_change_rate: 0.0,
            language: Language::default(),
        }
    }
}

impl CityState {
    pub fn can_afford(&self, amount: f64) -> bool {
        self.credits >= amount
    }
}

/// City-wide aggregates derived from the grid every tick.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityTotals {
    pub daily_income: f64,
    /// Housing capacity of residential buildings.
    pub max_population: f64,
    /// Jobs on offer.
    pub total_jobs: f64,
    pub population: f64,
    pub max_power: f64,
    pub power_usage: f64,
    pub pollution: f64,
    /// Non-road buildings.
    pub building_count: u32,
    /// Hospitals, police and fire stations.
    pub service_count: u32,
}

impl CityTotals {
    pub fn compute(grid: &TileGrid, catalog: &BuildingCatalog) -> Self {
        let mut totals = Self::default();
        for (pos, tile) in grid.iter() {
            let Some(building) = tile.building else {
                continue;
            };
            let outputs = TileOutputs::at(grid, catalog, pos);
            totals.daily_income += outputs.income;
            totals.max_power += outputs.power;
            totals.pollution += outputs.pollution;
            totals.max_population += outputs.max_population;
            totals.total_jobs += outputs.jobs;
            totals.power_usage += outputs.power_usage;

            if building != BuildingType::Road {
                totals.building_count += 1;
            }
            if building.is_public_service() {
                totals.service_count += 1;
            }
        }
        totals.population = (totals.max_population * 1.5).min(totals.total_jobs);
        totals
    }

    pub fn has_power_deficit(&self) -> bool {
        self.power_usage > self.max_power
    }
}

pub fn refresh_city_totals(
    grid: Res<TileGrid>,
    catalog: Res<BuildingCatalog>,
    mut totals: ResMut<CityTotals>,
) {
    let fresh = CityTotals::compute(&grid, &catalog);
    if *totals != fresh {
        *totals = fresh;
    }
}
