//! Declarative per-type interaction config: numeric modifiers and
//! range-driven status effects, deserialized from `data/interactions.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::building_data::{Attribute, BuildingType};
use crate::effects::EffectDescriptor;
use crate::grid::{GridPos, TileGrid};
use crate::spatial_query::{count_targets_in_range, has_targets_in_range};
use crate::status::StatusKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionConfig {
    pub modifiers: BTreeMap<Attribute, Vec<Modifier>>,
    pub status_effects: Vec<StatusEffectConfig>,
}

/// How a modifier turns neighbours into effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierMode {
    /// Each target kind is checked on its own; `effect` applies once if any
    /// of them is in range.
    #[default]
    AnyPresent,
    /// Matching neighbours are counted. Stackable modifiers apply once per
    /// neighbour up to `max_stacks` (0 means no cap); otherwise once.
    #[serde(rename_all = "camelCase")]
    Counted {
        #[serde(default)]
        stackable: bool,
        #[serde(default)]
        max_stacks: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub targets: Vec<BuildingType>,
    pub range: u32,
    /// Fractional multiplier, e.g. 0.1 for +10 %.
    pub effect: f64,
    #[serde(default)]
    pub mode: ModifierMode,
}

impl Modifier {
    /// Contribution of this modifier for a building at `pos`.
    pub fn contribution(&self, grid: &TileGrid, pos: GridPos) -> f64 {
        match self.mode {
            ModifierMode::AnyPresent => {
                let present = self.targets.iter().any(|target| {
                    has_targets_in_range(grid, pos, std::slice::from_ref(target), self.range, false)
                });
                if present {
                    self.effect
                } else {
                    0.0
                }
            }
            ModifierMode::Counted {
                stackable,
                max_stacks,
            } => {
                let count = count_targets_in_range(grid, pos, &self.targets, self.range);
                if count == 0 {
                    return 0.0;
                }
                let stacks = if stackable {
                    count.min(max_stacks.filter(|&cap| cap > 0).unwrap_or(count))
                } else {
                    1
                };
                self.effect * f64::from(stacks)
            }
        }
    }
}

fn default_range() -> u32 {
    1
}

/// Neighbourhood predicate used by configured status effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeCondition {
    pub targets: Vec<BuildingType>,
    #[serde(default = "default_range")]
    pub range: u32,
    /// Every listed kind must be present, not just one of them.
    #[serde(default)]
    pub require_all_kinds: bool,
    /// Holds when the targets are absent instead.
    #[serde(default)]
    pub inverse: bool,
}

impl RangeCondition {
    pub fn holds(&self, grid: &TileGrid, pos: GridPos) -> bool {
        has_targets_in_range(grid, pos, &self.targets, self.range, self.require_all_kinds)
            != self.inverse
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectConfig {
    pub status: StatusKind,
    pub condition: RangeCondition,
    pub effect: EffectDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;

    fn place(grid: &mut TileGrid, x: i32, y: i32, building: BuildingType) {
        if let Some(tile) = grid.get_mut(GridPos::new(x, y)) {
            tile.building = Some(building);
            tile.level = 1;
        }
    }

    fn counted(effect: f64, stackable: bool, max_stacks: Option<u32>) -> Modifier {
        Modifier {
            targets: vec![BuildingType::Shop],
            range: 2,
            effect,
            mode: ModifierMode::Counted {
                stackable,
                max_stacks,
            },
        }
    }

    #[test]
    fn test_counted_respects_max_stacks() {
        let mut grid = TileGrid::default();
        let center = GridPos::new(8, 8);
        let modifier = counted(0.1, true, Some(2));

        place(&mut grid, 8, 9, BuildingType::Shop);
        assert!((modifier.contribution(&grid, center) - 0.1).abs() < 1e-9);

        place(&mut grid, 9, 9, BuildingType::Shop);
        assert!((modifier.contribution(&grid, center) - 0.2).abs() < 1e-9);

        place(&mut grid, 7, 7, BuildingType::Shop);
        place(&mut grid, 7, 8, BuildingType::Shop);
        place(&mut grid, 10, 10, BuildingType::Shop);
        assert!((modifier.contribution(&grid, center) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_counted_without_cap_uses_full_count() {
        let mut grid = TileGrid::default();
        for y in 9..12 {
            place(&mut grid, 8, y, BuildingType::Shop);
        }
        let modifier = counted(0.1, true, None);
        // (8, 11) is out of range 2
        assert!((modifier.contribution(&grid, GridPos::new(8, 8)) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_zero_max_stacks_means_uncapped() {
        let mut grid = TileGrid::default();
        place(&mut grid, 8, 9, BuildingType::Shop);
        place(&mut grid, 9, 9, BuildingType::Shop);
        place(&mut grid, 7, 8, BuildingType::Shop);
        let modifier = counted(0.1, true, Some(0));
        assert!((modifier.contribution(&grid, GridPos::new(8, 8)) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_non_stackable_applies_once() {
        let mut grid = TileGrid::default();
        place(&mut grid, 8, 9, BuildingType::Shop);
        place(&mut grid, 8, 10, BuildingType::Shop);
        let modifier = counted(0.25, false, None);
        assert!((modifier.contribution(&grid, GridPos::new(8, 8)) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_any_present_applies_once_for_many_kinds() {
        let mut grid = TileGrid::default();
        place(&mut grid, 8, 9, BuildingType::Park);
        place(&mut grid, 9, 8, BuildingType::HeroPark);
        let modifier = Modifier {
            targets: vec![BuildingType::Park, BuildingType::HeroPark],
            range: 1,
            effect: 0.2,
            mode: ModifierMode::AnyPresent,
        };
        assert!((modifier.contribution(&grid, GridPos::new(8, 8)) - 0.2).abs() < 1e-9);
        assert_eq!(modifier.contribution(&grid, GridPos::new(2, 2)), 0.0);
    }

    #[test]
    fn test_inverse_condition() {
        let mut grid = TileGrid::default();
        let condition = RangeCondition {
            targets: vec![BuildingType::House],
            range: 3,
            require_all_kinds: false,
            inverse: true,
        };
        assert!(condition.holds(&grid, GridPos::new(8, 8)));
        place(&mut grid, 10, 10, BuildingType::House);
        assert!(!condition.holds(&grid, GridPos::new(8, 8)));
    }

    #[test]
    fn test_parse_counted_mode_from_json() {
        let json = r#"{
            "modifiers": {
                "coinOutput": [
                    { "targets": ["shop"], "range": 2, "effect": 0.1,
                      "mode": { "counted": { "stackable": true, "maxStacks": 3 } } }
                ]
            },
            "statusEffects": [
                { "status": "COIN_BUFF",
                  "condition": { "targets": ["house"] },
                  "effect": { "type": "coinBuff", "offsetY": 0.9 } }
            ]
        }"#;
        let config: InteractionConfig = serde_json::from_str(json).unwrap();
        let modifier = &config.modifiers[&Attribute::CoinOutput][0];
        assert_eq!(
            modifier.mode,
            ModifierMode::Counted {
                stackable: true,
                max_stacks: Some(3)
            }
        );
        let status = &config.status_effects[0];
        assert_eq!(status.status, StatusKind::CoinBuff);
        assert_eq!(status.condition.range, 1);
        assert_eq!(status.effect.kind, EffectKind::CoinBuff);
        assert_eq!(status.effect.params.offset_y, Some(0.9));
    }
}
