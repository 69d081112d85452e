//! Assertion helpers for `TestCity` scenarios.

use crate::building_data::BuildingType;
use crate::status::StatusKind;

use super::TestCity;

impl TestCity {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_credits(&self, expected: f64) {
        let credits = self.city().credits;
        assert!(
            (credits - expected).abs() < 1e-6,
            "Expected {expected} credits, got {credits}"
        );
    }

    pub fn assert_building(&self, x: i32, y: i32, expected: BuildingType) {
        let found = self.tile(x, y).building;
        assert_eq!(
            found,
            Some(expected),
            "Expected {expected:?} at ({x}, {y}), found {found:?}"
        );
    }

    pub fn assert_empty(&self, x: i32, y: i32) {
        let found = self.tile(x, y).building;
        assert!(found.is_none(), "Expected ({x}, {y}) empty, found {found:?}");
    }

    pub fn assert_has_status(&self, x: i32, y: i32, kind: StatusKind) {
        let statuses = self.statuses_at(x, y);
        assert!(
            statuses.contains(&kind),
            "Expected {kind:?} at ({x}, {y}), statuses are {statuses:?}"
        );
    }

    pub fn assert_lacks_status(&self, x: i32, y: i32, kind: StatusKind) {
        let statuses = self.statuses_at(x, y);
        assert!(
            !statuses.contains(&kind),
            "Did not expect {kind:?} at ({x}, {y}), statuses are {statuses:?}"
        );
    }

    /// Every instance is backed by its tile and every occupied tile has one.
    pub fn assert_instances_match_grid(&mut self) {
        let occupied: Vec<_> = self
            .grid()
            .iter()
            .filter(|(_, t)| t.is_occupied())
            .map(|(p, _)| p)
            .collect();
        assert_eq!(
            self.building_count(),
            occupied.len(),
            "instance count differs from occupied tiles"
        );
        for pos in occupied {
            let instance = self
                .instance_at(pos.x, pos.y)
                .unwrap_or_else(|| panic!("no instance at ({}, {})", pos.x, pos.y));
            assert!(
                instance.matches_tile(self.tile(pos.x, pos.y)),
                "stale instance at ({}, {})",
                pos.x,
                pos.y
            );
        }
    }
}
