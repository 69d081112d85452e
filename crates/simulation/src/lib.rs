use bevy::prelude::*;

pub mod actions;
pub mod building_data;
pub mod buildings;
pub mod catalog_error;
pub mod city_state;
pub mod config;
pub mod effects;
pub mod grid;
pub mod interactions;
pub mod modifiers;
pub mod rotation;
pub mod simulation_sets;
pub mod spatial_query;
pub mod stability;
pub mod status;
pub mod world_init;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::{SimulationSet, SimulationUpdateSet};

use actions::{apply_city_actions, CityAction};
use building_data::BuildingCatalog;
use buildings::{sync_building_instances, tick_building_status, BuildingIndex, ViewerPosition};
use city_state::{refresh_city_totals, CityState, CityTotals};
use config::SIM_TICK_HZ;
use effects::EffectRegistry;
use grid::TileGrid;
use rotation::RotationConfig;
use stability::{advance_day_cycle, DayTimer, StabilityConfig};

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

fn load_catalog() -> BuildingCatalog {
    match BuildingCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load built-in building catalog, starting empty: {e}");
            BuildingCatalog::default()
        }
    }
}

fn validate_effect_registry(registry: Res<EffectRegistry>, catalog: Res<BuildingCatalog>) {
    registry.validate_catalog(&catalog);
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(SIM_TICK_HZ))
            .insert_resource(load_catalog())
            .insert_resource(EffectRegistry::with_defaults())
            .init_resource::<TickCounter>()
            .init_resource::<TileGrid>()
            .init_resource::<CityState>()
            .init_resource::<CityTotals>()
            .init_resource::<BuildingIndex>()
            .init_resource::<ViewerPosition>()
            .init_resource::<RotationConfig>()
            .init_resource::<StabilityConfig>()
            .init_resource::<DayTimer>()
            .add_event::<CityAction>();

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        )
        .configure_sets(
            Update,
            (SimulationUpdateSet::Input, SimulationUpdateSet::Visual).chain(),
        );

        app.add_systems(
            Startup,
            (world_init::init_world, validate_effect_registry),
        )
        .add_systems(
            FixedUpdate,
            (tick_counter, apply_city_actions, sync_building_instances)
                .chain()
                .in_set(SimulationSet::PreSim),
        )
        .add_systems(
            FixedUpdate,
            (refresh_city_totals, tick_building_status)
                .chain()
                .in_set(SimulationSet::Simulation),
        )
        .add_systems(
            FixedUpdate,
            advance_day_cycle.in_set(SimulationSet::PostSim),
        );
    }
}
