use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::building_data::{BuildingType, LevelDetail};
use crate::config::{CELL_SIZE, GRID_SIZE};

/// Integer tile coordinate. Signed so neighbourhood scans can step off the
/// grid edge without wrapping; such positions simply have no tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Grass,
    /// Cleared ground; roads and buildings sit on it.
    Ground,
}

/// Building orientation in 90 degree steps (0 = east, 1 = south, 2 = west, 3 = north).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    East,
    South,
    West,
    North,
}

impl Direction {
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Direction::East,
            1 => Direction::South,
            2 => Direction::West,
            _ => Direction::North,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Direction::East => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::North => 3,
        }
    }

    /// Next orientation clockwise.
    pub fn rotated(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn yaw_radians(self) -> f32 {
        self.index() as f32 * FRAC_PI_2
    }
}

/// One grid cell of the persisted city state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub building: Option<BuildingType>,
    /// 0 when empty, otherwise the building level (starting at 1).
    pub level: u8,
    pub direction: Direction,
    /// Cached level data of the occupying building.
    pub detail: Option<LevelDetail>,
    pub output_factor: f32,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            terrain: Terrain::Grass,
            building: None,
            level: 0,
            direction: Direction::East,
            detail: None,
            output_factor: 1.0,
        }
    }
}

impl Tile {
    pub fn is_occupied(&self) -> bool {
        self.building.is_some()
    }

    pub fn holds(&self, targets: &[BuildingType]) -> bool {
        self.building.is_some_and(|b| targets.contains(&b))
    }

    /// Remove the building but keep the terrain.
    pub fn clear_building(&mut self) {
        self.building = None;
        self.level = 0;
        self.direction = Direction::East;
        self.detail = None;
        self.output_factor = 1.0;
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    size: usize,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(GRID_SIZE)
    }
}

impl TileGrid {
    pub fn new(size: usize) -> Self {
        Self {
            tiles: vec![Tile::default(); size * size],
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    // Column-major so `iter` walks x rows, then y within a row.
    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.x as usize * self.size + pos.y as usize)
    }

    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        self.index(pos).map(|i| &mut self.tiles[i])
    }

    pub fn building_at(&self, pos: GridPos) -> Option<BuildingType> {
        self.get(pos).and_then(|t| t.building)
    }

    /// All tiles in grid order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Tile)> + '_ {
        let size = self.size;
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            let pos = GridPos::new((i / size) as i32, (i % size) as i32);
            (pos, tile)
        })
    }

    /// In-bounds cardinal neighbours.
    pub fn neighbors4(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        [(0, 1), (1, 0), (0, -1), (-1, 0)]
            .into_iter()
            .map(move |(dx, dy)| pos.offset(dx, dy))
            .filter(|p| self.in_bounds(*p))
    }

    /// World-space centre of a tile on the ground plane (XZ).
    pub fn grid_to_world(&self, pos: GridPos) -> Vec3 {
        let half = (self.size / 2) as f32;
        Vec3::new(
            (pos.x as f32 - half) * CELL_SIZE,
            0.0,
            (pos.y as f32 - half) * CELL_SIZE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_has_no_tile() {
        let grid = TileGrid::new(GRID_SIZE);
        assert!(grid.get(GridPos::new(-1, 0)).is_none());
        assert!(grid.get(GridPos::new(0, GRID_SIZE as i32)).is_none());
        assert!(grid.get(GridPos::new(16, 16)).is_some());
    }

    #[test]
    fn test_iter_walks_rows_in_x_order() {
        let grid = TileGrid::new(3);
        let order: Vec<GridPos> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(order[0], GridPos::new(0, 0));
        assert_eq!(order[1], GridPos::new(0, 1));
        assert_eq!(order[3], GridPos::new(1, 0));
        assert_eq!(order.len(), 9);
    }

    #[test]
    fn test_neighbors4_at_corner() {
        let grid = TileGrid::new(GRID_SIZE);
        assert_eq!(grid.neighbors4(GridPos::new(0, 0)).count(), 2);
        assert_eq!(grid.neighbors4(GridPos::new(8, 8)).count(), 4);
    }

    #[test]
    fn test_grid_centred_on_origin() {
        let grid = TileGrid::new(GRID_SIZE);
        assert_eq!(grid.grid_to_world(GridPos::new(8, 8)), Vec3::ZERO);
        assert_eq!(
            grid.grid_to_world(GridPos::new(0, 16)),
            Vec3::new(-8.0, 0.0, 8.0)
        );
    }

    #[test]
    fn test_direction_wraps() {
        assert_eq!(Direction::North.rotated(), Direction::East);
        assert_eq!(Direction::from_index(6), Direction::West);
    }

    #[test]
    fn test_clear_building_keeps_terrain() {
        let mut tile = Tile {
            terrain: Terrain::Ground,
            building: Some(BuildingType::House),
            level: 2,
            ..Default::default()
        };
        tile.clear_building();
        assert_eq!(tile.terrain, Terrain::Ground);
        assert!(!tile.is_occupied());
        assert_eq!(tile.level, 0);
    }
}
