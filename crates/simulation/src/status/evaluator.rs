use bevy::prelude::*;

use crate::city_state::InteractionMode;

use super::{ActiveStatus, RuleContext, StatusKind, StatusRule, StatusSets};

fn rule_holds(rule: &StatusRule, ctx: &RuleContext<'_>) -> bool {
    match rule.holds(ctx) {
        Ok(holds) => holds,
        Err(e) => {
            warn!(
                "{:?} rule for {:?} at ({}, {}) failed: {e}",
                rule.kind, ctx.building, ctx.pos.x, ctx.pos.y
            );
            false
        }
    }
}

/// Decide which statuses hold for one building this tick.
///
/// While selecting, an eligible upgrade is the only status shown and nothing
/// else is evaluated. Otherwise every other rule runs; a kind that holds
/// more than once keeps its first rule's effect.
pub fn evaluate_statuses(rules: &[StatusRule], ctx: &RuleContext<'_>) -> StatusSets {
    if ctx.city.mode == InteractionMode::Select {
        if let Some(rule) = rules.iter().find(|r| r.kind == StatusKind::Upgrade) {
            if rule_holds(rule, ctx) {
                return StatusSets {
                    buffs: vec![ActiveStatus {
                        kind: StatusKind::Upgrade,
                        effect: rule.effect.clone(),
                    }],
                    debuffs: Vec::new(),
                };
            }
        }
    }

    let mut sets = StatusSets::default();
    let mut seen: Vec<StatusKind> = Vec::new();
    for rule in rules.iter().filter(|r| r.kind != StatusKind::Upgrade) {
        if seen.contains(&rule.kind) || !rule_holds(rule, ctx) {
            continue;
        }
        seen.push(rule.kind);
        sets.push(ActiveStatus {
            kind: rule.kind,
            effect: rule.effect.clone(),
        });
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building_data::{BuildingCatalog, BuildingType};
    use crate::city_state::{CityState, CityTotals};
    use crate::effects::{EffectDescriptor, EffectKind};
    use crate::grid::{GridPos, TileGrid};
    use crate::status::RuleError;

    struct World {
        grid: TileGrid,
        catalog: BuildingCatalog,
        city: CityState,
        totals: CityTotals,
    }

    impl World {
        fn new(mode: InteractionMode) -> Self {
            Self {
                grid: TileGrid::default(),
                catalog: BuildingCatalog::builtin().unwrap(),
                city: CityState {
                    mode,
                    ..Default::default()
                },
                totals: CityTotals::default(),
            }
        }

        fn ctx(&self) -> RuleContext<'_> {
            RuleContext {
                building: BuildingType::House,
                level: 1,
                pos: GridPos::new(8, 8),
                grid: &self.grid,
                catalog: &self.catalog,
                city: &self.city,
                totals: &self.totals,
            }
        }
    }

    fn always(kind: StatusKind, effect: EffectKind) -> StatusRule {
        StatusRule::custom(kind, EffectDescriptor::new(effect), |_| Ok(true))
    }

    #[test]
    fn test_upgrade_exclusive_in_select_mode() {
        let world = World::new(InteractionMode::Select);
        let rules = vec![
            always(StatusKind::MissingRoad, EffectKind::MissRoad),
            always(StatusKind::CoinBuff, EffectKind::CoinBuff),
            always(StatusKind::Upgrade, EffectKind::Upgrade),
        ];
        let sets = evaluate_statuses(&rules, &world.ctx());
        assert!(sets.debuffs.is_empty());
        assert_eq!(sets.buffs.len(), 1);
        assert_eq!(sets.buffs[0].kind, StatusKind::Upgrade);
    }

    #[test]
    fn test_upgrade_ignored_outside_select_mode() {
        let world = World::new(InteractionMode::Build);
        let rules = vec![
            always(StatusKind::Upgrade, EffectKind::Upgrade),
            always(StatusKind::CoinBuff, EffectKind::CoinBuff),
        ];
        let sets = evaluate_statuses(&rules, &world.ctx());
        let kinds: Vec<_> = sets.buffs.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StatusKind::CoinBuff]);
    }

    #[test]
    fn test_failing_rule_does_not_stop_others() {
        let world = World::new(InteractionMode::Build);
        let rules = vec![
            StatusRule::custom(
                StatusKind::Sad,
                EffectDescriptor::new(EffectKind::Sad),
                |ctx| {
                    Err(RuleError::MissingLevel {
                        building: ctx.building,
                        level: ctx.level,
                    })
                },
            ),
            always(StatusKind::MissingPower, EffectKind::MissPower),
        ];
        let sets = evaluate_statuses(&rules, &world.ctx());
        let kinds: Vec<_> = sets.debuffs.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StatusKind::MissingPower]);
    }

    #[test]
    fn test_duplicate_kinds_keep_first_effect() {
        let world = World::new(InteractionMode::Build);
        let rules = vec![
            always(StatusKind::OverPopulation, EffectKind::OverPopulation),
            always(StatusKind::OverPopulation, EffectKind::Angry),
        ];
        let sets = evaluate_statuses(&rules, &world.ctx());
        assert_eq!(sets.debuffs.len(), 1);
        assert_eq!(sets.debuffs[0].effect.kind, EffectKind::OverPopulation);
    }

    #[test]
    fn test_lone_house_misses_road() {
        let world = World::new(InteractionMode::Build);
        let rules = crate::status::rules_for(BuildingType::House, &world.catalog);
        let sets = evaluate_statuses(&rules, &world.ctx());
        assert!(sets.debuffs.iter().any(|s| s.kind == StatusKind::MissingRoad));
    }
}
