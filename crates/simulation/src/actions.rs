//! Player actions against the grid.
//!
//! Each action validates fully before touching anything, so a rejected
//! action leaves the grid and credits exactly as they were. Building
//! instances pick up the changes on the next reconcile pass.

use std::fmt;

use bevy::prelude::*;

use crate::building_data::{BuildingCatalog, BuildingType};
use crate::city_state::{CityState, InteractionMode};
use crate::config::{FREE_PLACEMENT_TYPES, RELOCATE_COST};
use crate::grid::{Direction, GridPos, Terrain, TileGrid};

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum CityAction {
    Build { pos: GridPos, building: BuildingType },
    Demolish { pos: GridPos },
    Relocate { from: GridPos, to: GridPos },
    Upgrade { pos: GridPos },
    Rotate { pos: GridPos },
    SetMode(InteractionMode),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionOutcome {
    Built { building: BuildingType, cost: f64 },
    Demolished { building: BuildingType, refund: f64 },
    /// An empty tile was turned back into grass.
    Cleared,
    Relocated { building: BuildingType },
    Upgraded { building: BuildingType, level: u8, cost: f64 },
    Rotated { direction: Direction },
    ModeChanged(InteractionMode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionError {
    OutOfBounds(GridPos),
    Occupied(GridPos),
    /// Only free-placement types may be built away from roads.
    NeedsRoad(GridPos),
    InsufficientFunds { needed: f64, available: f64 },
    NoBuilding(GridPos),
    MaxLevel { building: BuildingType, level: u8 },
    RoadCannotRotate,
    UnknownLevel { building: BuildingType, level: u8 },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::OutOfBounds(p) => write!(f, "({}, {}) is outside the city", p.x, p.y),
            ActionError::Occupied(p) => write!(f, "({}, {}) is already occupied", p.x, p.y),
            ActionError::NeedsRoad(p) => {
                write!(f, "({}, {}) needs an adjacent road", p.x, p.y)
            }
            ActionError::InsufficientFunds { needed, available } => {
                write!(f, "Insufficient funds: need {needed}, have {available}")
            }
            ActionError::NoBuilding(p) => write!(f, "No building at ({}, {})", p.x, p.y),
            ActionError::MaxLevel { building, level } => {
                write!(f, "{building:?} is already at its maximum level {level}")
            }
            ActionError::RoadCannotRotate => write!(f, "Roads cannot be rotated"),
            ActionError::UnknownLevel { building, level } => {
                write!(f, "No level data for {building:?} level {level}")
            }
        }
    }
}

impl std::error::Error for ActionError {}

/// Whether `building` may go on `pos`: in bounds, empty, and either a
/// free-placement type or next to a road on cleared ground.
pub fn can_place(grid: &TileGrid, pos: GridPos, building: BuildingType) -> Result<(), ActionError> {
    let tile = grid.get(pos).ok_or(ActionError::OutOfBounds(pos))?;
    if tile.is_occupied() {
        return Err(ActionError::Occupied(pos));
    }
    if FREE_PLACEMENT_TYPES.contains(&building) {
        return Ok(());
    }
    let has_road = grid.neighbors4(pos).any(|n| {
        grid.get(n).is_some_and(|t| {
            t.terrain == Terrain::Ground && t.building == Some(BuildingType::Road)
        })
    });
    if has_road {
        Ok(())
    } else {
        Err(ActionError::NeedsRoad(pos))
    }
}

fn charge(city: &mut CityState, amount: f64) -> Result<(), ActionError> {
    if !city.can_afford(amount) {
        return Err(ActionError::InsufficientFunds {
            needed: amount,
            available: city.credits,
        });
    }
    city.credits -= amount;
    Ok(())
}

pub fn build(
    grid: &mut TileGrid,
    catalog: &BuildingCatalog,
    city: &mut CityState,
    pos: GridPos,
    building: BuildingType,
) -> Result<ActionOutcome, ActionError> {
    can_place(grid, pos, building)?;
    let detail = catalog
        .level(building, 1)
        .cloned()
        .ok_or(ActionError::UnknownLevel { building, level: 1 })?;
    let cost = detail.cost;
    charge(city, cost)?;

    let tile = grid.get_mut(pos).ok_or(ActionError::OutOfBounds(pos))?;
    tile.terrain = Terrain::Ground;
    tile.building = Some(building);
    tile.level = 1;
    tile.direction = Direction::East;
    tile.output_factor = 1.0;
    tile.detail = Some(detail);
    Ok(ActionOutcome::Built { building, cost })
}

pub fn demolish(
    grid: &mut TileGrid,
    catalog: &BuildingCatalog,
    city: &mut CityState,
    pos: GridPos,
) -> Result<ActionOutcome, ActionError> {
    let tile = grid.get_mut(pos).ok_or(ActionError::OutOfBounds(pos))?;
    let Some(building) = tile.building else {
        tile.terrain = Terrain::Grass;
        return Ok(ActionOutcome::Cleared);
    };
    let refund = catalog.refund(building, tile.level);
    tile.clear_building();
    city.credits += refund;
    Ok(ActionOutcome::Demolished { building, refund })
}

pub fn relocate(
    grid: &mut TileGrid,
    city: &mut CityState,
    from: GridPos,
    to: GridPos,
) -> Result<ActionOutcome, ActionError> {
    let source = grid.get(from).ok_or(ActionError::OutOfBounds(from))?.clone();
    let building = source.building.ok_or(ActionError::NoBuilding(from))?;
    if from == to {
        return Err(ActionError::Occupied(to));
    }
    can_place(grid, to, building)?;
    charge(city, RELOCATE_COST)?;

    let old_terrain = grid.get(to).map_or(Terrain::Grass, |t| t.terrain);
    if let Some(dest) = grid.get_mut(to) {
        *dest = source;
    }
    if let Some(src) = grid.get_mut(from) {
        src.clear_building();
        src.terrain = old_terrain;
    }
    Ok(ActionOutcome::Relocated { building })
}

pub fn upgrade(
    grid: &mut TileGrid,
    catalog: &BuildingCatalog,
    city: &mut CityState,
    pos: GridPos,
) -> Result<ActionOutcome, ActionError> {
    let tile = grid.get(pos).ok_or(ActionError::OutOfBounds(pos))?;
    let building = tile.building.ok_or(ActionError::NoBuilding(pos))?;
    let level = tile.level;
    if catalog.level(building, level).is_none() {
        return Err(ActionError::UnknownLevel { building, level });
    }
    let next = catalog
        .next_level(building, level)
        .ok_or(ActionError::MaxLevel { building, level })?;
    let detail = catalog
        .level(building, next)
        .cloned()
        .ok_or(ActionError::UnknownLevel {
            building,
            level: next,
        })?;
    let cost = detail.cost;
    charge(city, cost)?;

    let tile = grid.get_mut(pos).ok_or(ActionError::OutOfBounds(pos))?;
    tile.level = next;
    tile.output_factor = detail.output_factor;
    tile.detail = Some(detail);
    Ok(ActionOutcome::Upgraded {
        building,
        level: next,
        cost,
    })
}

pub fn rotate(grid: &mut TileGrid, pos: GridPos) -> Result<ActionOutcome, ActionError> {
    let tile = grid.get_mut(pos).ok_or(ActionError::OutOfBounds(pos))?;
    match tile.building {
        None => Err(ActionError::NoBuilding(pos)),
        Some(BuildingType::Road) => Err(ActionError::RoadCannotRotate),
        Some(_) => {
            tile.direction = tile.direction.rotated();
            Ok(ActionOutcome::Rotated {
                direction: tile.direction,
            })
        }
    }
}

pub fn apply_action(
    action: CityAction,
    grid: &mut TileGrid,
    catalog: &BuildingCatalog,
    city: &mut CityState,
) -> Result<ActionOutcome, ActionError> {
    match action {
        CityAction::Build { pos, building } => build(grid, catalog, city, pos, building),
        CityAction::Demolish { pos } => demolish(grid, catalog, city, pos),
        CityAction::Relocate { from, to } => relocate(grid, city, from, to),
        CityAction::Upgrade { pos } => upgrade(grid, catalog, city, pos),
        CityAction::Rotate { pos } => rotate(grid, pos),
        CityAction::SetMode(mode) => {
            city.mode = mode;
            Ok(ActionOutcome::ModeChanged(mode))
        }
    }
}

pub fn apply_city_actions(
    mut events: EventReader<CityAction>,
    mut grid: ResMut<TileGrid>,
    catalog: Res<BuildingCatalog>,
    mut city: ResMut<CityState>,
) {
    for &action in events.read() {
        match apply_action(action, &mut grid, &catalog, &mut city) {
            Ok(ActionOutcome::Built { building, cost }) => {
                let name = catalog.display_name(building, 1, city.language);
                info!("Placed {name} for {cost} credits");
            }
            Ok(ActionOutcome::Demolished { building, refund }) => {
                info!("Demolished {building:?}, refunded {refund}");
            }
            Ok(ActionOutcome::Relocated { building }) => {
                info!("Relocated {building:?} for {RELOCATE_COST} credits");
            }
            Ok(ActionOutcome::Upgraded {
                building,
                level,
                cost,
            }) => {
                let name = catalog.display_name(building, level, city.language);
                info!("Upgraded to {name} for {cost} credits");
            }
            Ok(_) => {}
            Err(e) => info!("{action:?} rejected: {e}"),
        }
    }
}
