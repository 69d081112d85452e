use std::fmt;
use std::sync::Arc;

use crate::building_data::{Attribute, BuildingCatalog, BuildingType};
use crate::city_state::{CityState, CityTotals};
use crate::effects::{EffectDescriptor, EffectKind};
use crate::grid::{GridPos, TileGrid};
use crate::interactions::RangeCondition;
use crate::modifiers::compute_effective_value;
use crate::spatial_query::count_targets_in_range;

use super::StatusKind;

/// Everything a status predicate may look at.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub building: BuildingType,
    pub level: u8,
    pub pos: GridPos,
    pub grid: &'a TileGrid,
    pub catalog: &'a BuildingCatalog,
    pub city: &'a CityState,
    pub totals: &'a CityTotals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleError {
    /// The building's level has no catalog entry.
    MissingLevel { building: BuildingType, level: u8 },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::MissingLevel { building, level } => {
                write!(f, "No level data for {building:?} level {level}")
            }
        }
    }
}

impl std::error::Error for RuleError {}

pub type Predicate = Arc<dyn Fn(&RuleContext<'_>) -> Result<bool, RuleError> + Send + Sync>;

#[derive(Clone)]
pub enum Condition {
    Range(RangeCondition),
    Custom(Predicate),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Range(range) => f.debug_tuple("Range").field(range).finish(),
            Condition::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusRule {
    pub kind: StatusKind,
    pub condition: Condition,
    pub effect: EffectDescriptor,
}

impl StatusRule {
    pub fn range(kind: StatusKind, condition: RangeCondition, effect: EffectDescriptor) -> Self {
        Self {
            kind,
            condition: Condition::Range(condition),
            effect,
        }
    }

    pub fn custom(
        kind: StatusKind,
        effect: EffectDescriptor,
        predicate: impl Fn(&RuleContext<'_>) -> Result<bool, RuleError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            condition: Condition::Custom(Arc::new(predicate)),
            effect,
        }
    }

    pub fn holds(&self, ctx: &RuleContext<'_>) -> Result<bool, RuleError> {
        match &self.condition {
            Condition::Range(range) => Ok(range.holds(ctx.grid, ctx.pos)),
            Condition::Custom(predicate) => predicate(ctx),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

fn missing_road() -> StatusRule {
    StatusRule::range(
        StatusKind::MissingRoad,
        RangeCondition {
            targets: vec![BuildingType::Road],
            range: 1,
            require_all_kinds: false,
            inverse: true,
        },
        EffectDescriptor::new(EffectKind::MissRoad),
    )
}

fn missing_power(offset_y: f32) -> StatusRule {
    StatusRule::custom(
        StatusKind::MissingPower,
        EffectDescriptor::new(EffectKind::MissPower).with_offset_y(offset_y),
        |ctx| Ok(ctx.totals.has_power_deficit()),
    )
}

fn over_population(offset_y: f32) -> StatusRule {
    StatusRule::custom(
        StatusKind::OverPopulation,
        EffectDescriptor::new(EffectKind::OverPopulation).with_offset_y(offset_y),
        |ctx| Ok(ctx.totals.population > ctx.totals.max_population),
    )
}

fn upgrade(offset_y: f32) -> StatusRule {
    StatusRule::custom(
        StatusKind::Upgrade,
        EffectDescriptor::new(EffectKind::Upgrade).with_offset_y(offset_y),
        |ctx| {
            if ctx.catalog.level(ctx.building, ctx.level).is_none() {
                return Err(RuleError::MissingLevel {
                    building: ctx.building,
                    level: ctx.level,
                });
            }
            Ok(match ctx.catalog.next_level(ctx.building, ctx.level) {
                Some(next) => ctx.city.credits >= ctx.catalog.cost(ctx.building, next),
                None => false,
            })
        },
    )
}

fn power_boost() -> StatusRule {
    let effect = EffectDescriptor::new(EffectKind::Powerup).with_offset_y(0.6);
    StatusRule::custom(StatusKind::PowerBoost, effect, |ctx| {
        if ctx.catalog.level(ctx.building, ctx.level).is_none() {
            return Err(RuleError::MissingLevel {
                building: ctx.building,
                level: ctx.level,
            });
        }
        let output = compute_effective_value(
            ctx.grid,
            ctx.catalog,
            ctx.building,
            ctx.level,
            ctx.pos,
            Attribute::PowerOutput,
        );
        Ok(output > 0.0)
    })
}

fn crowded_reactor() -> StatusRule {
    StatusRule::custom(
        StatusKind::OverPopulation,
        EffectDescriptor::new(EffectKind::OverPopulation).with_offset_y(0.8),
        |ctx| {
            let houses = count_targets_in_range(
                ctx.grid,
                ctx.pos,
                &[BuildingType::House, BuildingType::House2],
                3,
            );
            Ok(houses > 2)
        },
    )
}

/// Rule list for a building type, in evaluation order: the shared road
/// check, then catalog-configured statuses, then type-specific rules.
pub fn rules_for(building: BuildingType, catalog: &BuildingCatalog) -> Vec<StatusRule> {
    use BuildingType as B;

    let configured = || {
        catalog
            .status_effects(building)
            .iter()
            .map(|c| StatusRule::range(c.status, c.condition.clone(), c.effect.clone()))
    };

    let mut rules = Vec::new();
    match building {
        B::Road | B::Park | B::WaterTower => {}
        B::WindPower => rules.push(power_boost()),
        _ => {
            rules.push(missing_road());
            rules.extend(configured());
            match building {
                B::House => {
                    rules.push(missing_power(0.8));
                    rules.push(over_population(0.8));
                    rules.push(upgrade(0.8));
                }
                B::Shop => {
                    rules.push(missing_power(0.7));
                    rules.push(upgrade(0.7));
                }
                B::Factory => rules.push(missing_power(0.6)),
                B::FireStation | B::Hospital | B::Police => rules.push(missing_power(0.7)),
                B::NukeFactory => rules.push(crowded_reactor()),
                B::SunPower => rules.push(power_boost()),
                _ => {}
            }
        }
    }
    rules
}
