//! Neighbourhood lookups over the tile grid.
//!
//! Both queries scan the square of Chebyshev radius `range` around `center`,
//! skipping the centre tile itself. Positions off the grid have no tile and
//! never match.

use crate::building_data::BuildingType;
use crate::grid::{GridPos, TileGrid};

fn neighbourhood(center: GridPos, range: u32) -> impl Iterator<Item = GridPos> {
    let r = range as i32;
    (-r..=r)
        .flat_map(move |dx| (-r..=r).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .map(move |(dx, dy)| center.offset(dx, dy))
}

/// Number of tiles within `range` of `center` holding one of `targets`.
pub fn count_targets_in_range(
    grid: &TileGrid,
    center: GridPos,
    targets: &[BuildingType],
    range: u32,
) -> u32 {
    neighbourhood(center, range)
        .filter(|&pos| grid.get(pos).is_some_and(|t| t.holds(targets)))
        .count() as u32
}

/// Whether `targets` are present within `range` of `center`.
///
/// With `require_all_kinds` unset, any single match is enough and the scan
/// stops there. With it set, every distinct kind in `targets` must be found
/// at least once.
pub fn has_targets_in_range(
    grid: &TileGrid,
    center: GridPos,
    targets: &[BuildingType],
    range: u32,
    require_all_kinds: bool,
) -> bool {
    if targets.is_empty() {
        return false;
    }

    let mut buildings = neighbourhood(center, range).filter_map(|pos| grid.building_at(pos));

    if !require_all_kinds {
        return buildings.any(|b| targets.contains(&b));
    }

    let mut found: Vec<BuildingType> = Vec::with_capacity(targets.len());
    for building in buildings {
        if targets.contains(&building) && !found.contains(&building) {
            found.push(building);
            if targets.iter().all(|t| found.contains(t)) {
                return true;
            }
        }
    }
    false
}
