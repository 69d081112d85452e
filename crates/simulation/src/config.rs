use crate::building_data::BuildingType;

/// The city is a square grid of `GRID_SIZE` x `GRID_SIZE` tiles.
pub const GRID_SIZE: usize = 17;
/// World units per tile edge. The grid is centred on the world origin.
pub const CELL_SIZE: f32 = 1.0;

/// Fixed simulation step. `FixedUpdate` runs at 10 Hz.
pub const SIM_TICK_HZ: f64 = 10.0;
pub const SIM_TICK_MS: u32 = 100;

/// One in-game day lasts five seconds of simulation time (50 ticks).
pub const DAY_LENGTH_MS: u32 = 5_000;

pub const STARTING_CREDITS: f64 = 3_000.0;

/// Fraction of a level's cost handed back on demolition.
pub const REFUND_RATIO: f64 = 0.7;
pub const RELOCATE_COST: f64 = 100.0;

/// Building types that may be placed without an adjacent road.
pub const FREE_PLACEMENT_TYPES: [BuildingType; 3] = [
    BuildingType::Road,
    BuildingType::Park,
    BuildingType::WindPower,
];

/// Height of the placeholder building model, used to stack billboards above it.
pub const DEFAULT_MODEL_HEIGHT: f32 = 0.8;
