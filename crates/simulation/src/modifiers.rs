//! Effective numeric outputs: the cached base value of a tile adjusted by the
//! building type's configured modifiers.
//!
//! Everything here reads the grid and catalog and never mutates them, so the
//! same world always yields the same numbers regardless of call order.

use bevy::prelude::*;

use crate::building_data::{Attribute, BuildingCatalog, BuildingType, Category};
use crate::grid::{GridPos, TileGrid};

/// Effective value of `attribute` for a `building` at `level` sitting on `pos`.
///
/// `base * (1 + Σ effect)`, clamped to be non-negative. Unknown levels log a
/// warning and yield 0; a tile with no detail snapshot yields 0.
pub fn compute_effective_value(
    grid: &TileGrid,
    catalog: &BuildingCatalog,
    building: BuildingType,
    level: u8,
    pos: GridPos,
    attribute: Attribute,
) -> f64 {
    if catalog.level(building, level).is_none() {
        warn!("No level data for {building:?} level {level}, treating {attribute:?} as 0");
        return 0.0;
    }

    let Some(base) = grid
        .get(pos)
        .and_then(|t| t.detail.as_ref())
        .map(|d| d.attribute(attribute))
    else {
        return 0.0;
    };

    let modifiers = catalog.modifiers(building, attribute);
    if modifiers.is_empty() {
        return base;
    }

    let total: f64 = modifiers.iter().map(|m| m.contribution(grid, pos)).sum();
    (base * (1.0 + total)).max(0.0)
}

/// Effective value for whatever occupies `pos`; 0 for empty tiles.
pub fn effective_building_value(
    grid: &TileGrid,
    catalog: &BuildingCatalog,
    pos: GridPos,
    attribute: Attribute,
) -> f64 {
    match grid.get(pos) {
        Some(tile) => match tile.building {
            Some(building) => {
                compute_effective_value(grid, catalog, building, tile.level, pos, attribute)
            }
            None => 0.0,
        },
        None => 0.0,
    }
}

/// What one occupied tile contributes to the city-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TileOutputs {
    pub income: f64,
    pub power: f64,
    pub pollution: f64,
    /// Housing capacity; 0 unless the building is residential.
    pub max_population: f64,
    /// Jobs on offer, unmodified.
    pub jobs: f64,
    pub power_usage: f64,
}

impl TileOutputs {
    /// Outputs of whatever occupies `pos`; all zero for empty tiles.
    pub fn at(grid: &TileGrid, catalog: &BuildingCatalog, pos: GridPos) -> Self {
        let Some(tile) = grid.get(pos) else {
            return Self::default();
        };
        let Some(building) = tile.building else {
            return Self::default();
        };
        let effective = |attribute: Attribute| {
            compute_effective_value(grid, catalog, building, tile.level, pos, attribute)
        };
        let detail = tile.detail.as_ref();
        let residential = detail.is_some_and(|d| d.category == Category::Residential);

        Self {
            income: effective(Attribute::CoinOutput),
            power: effective(Attribute::PowerOutput),
            pollution: effective(Attribute::Pollution),
            max_population: if residential {
                effective(Attribute::MaxPopulation)
            } else {
                0.0
            },
            jobs: detail.map_or(0.0, |d| d.population),
            power_usage: detail.map_or(0.0, |d| d.power_usage),
        }
    }
}
