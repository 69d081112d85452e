//! Per-building status conditions: what they are, how they are decided and
//! how the results are grouped for display.

mod evaluator;
mod rules;

pub use evaluator::evaluate_statuses;
pub use rules::{rules_for, Condition, Predicate, RuleContext, RuleError, StatusRule};

use serde::{Deserialize, Serialize};

use crate::effects::EffectDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    MissingRoad,
    MissingPower,
    MissingPopulation,
    OverPopulation,
    MissingPollution,
    Sad,
    EfficiencyBoost,
    PowerBoost,
    EconomyBoost,
    PopulationBoost,
    CoinBuff,
    HumanBuff,
    Upgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Buff,
    Debuff,
}

impl StatusKind {
    /// Fixed buff/debuff classification of every kind.
    pub fn category(self) -> StatusCategory {
        match self {
            StatusKind::MissingRoad
            | StatusKind::MissingPower
            | StatusKind::MissingPopulation
            | StatusKind::OverPopulation
            | StatusKind::MissingPollution
            | StatusKind::Sad
            | StatusKind::EfficiencyBoost => StatusCategory::Debuff,
            StatusKind::PowerBoost
            | StatusKind::EconomyBoost
            | StatusKind::PopulationBoost
            | StatusKind::CoinBuff
            | StatusKind::HumanBuff
            | StatusKind::Upgrade => StatusCategory::Buff,
        }
    }
}

/// A status that currently holds, with the effect that presents it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    pub effect: EffectDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSets {
    pub buffs: Vec<ActiveStatus>,
    pub debuffs: Vec<ActiveStatus>,
}

fn sorted_kinds(list: &[ActiveStatus]) -> Vec<StatusKind> {
    let mut kinds: Vec<StatusKind> = list.iter().map(|s| s.kind).collect();
    kinds.sort();
    kinds
}

impl StatusSets {
    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty() && self.debuffs.is_empty()
    }

    /// Whether both sets hold the same kinds, ignoring order.
    pub fn same_kinds(&self, other: &StatusSets) -> bool {
        sorted_kinds(&self.buffs) == sorted_kinds(&other.buffs)
            && sorted_kinds(&self.debuffs) == sorted_kinds(&other.debuffs)
    }

    /// Debuffs when there are any, otherwise buffs.
    pub fn dominant(&self) -> &[ActiveStatus] {
        if self.debuffs.is_empty() {
            &self.buffs
        } else {
            &self.debuffs
        }
    }

    fn push(&mut self, status: ActiveStatus) {
        match status.kind.category() {
            StatusCategory::Buff => self.buffs.push(status),
            StatusCategory::Debuff => self.debuffs.push(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;

    fn active(kind: StatusKind) -> ActiveStatus {
        ActiveStatus {
            kind,
            effect: EffectDescriptor::new(EffectKind::Happy),
        }
    }

    #[test]
    fn test_category_lists() {
        assert_eq!(StatusKind::EfficiencyBoost.category(), StatusCategory::Debuff);
        assert_eq!(StatusKind::MissingPollution.category(), StatusCategory::Debuff);
        assert_eq!(StatusKind::Upgrade.category(), StatusCategory::Buff);
        assert_eq!(StatusKind::PowerBoost.category(), StatusCategory::Buff);
    }

    #[test]
    fn test_same_kinds_ignores_order() {
        let mut a = StatusSets::default();
        a.push(active(StatusKind::MissingRoad));
        a.push(active(StatusKind::Sad));
        let mut b = StatusSets::default();
        b.push(active(StatusKind::Sad));
        b.push(active(StatusKind::MissingRoad));
        assert!(a.same_kinds(&b));

        b.push(active(StatusKind::CoinBuff));
        assert!(!a.same_kinds(&b));
    }

    #[test]
    fn test_debuffs_dominate() {
        let mut sets = StatusSets::default();
        sets.push(active(StatusKind::CoinBuff));
        assert_eq!(sets.dominant()[0].kind, StatusKind::CoinBuff);
        sets.push(active(StatusKind::MissingPower));
        assert_eq!(sets.dominant().len(), 1);
        assert_eq!(sets.dominant()[0].kind, StatusKind::MissingPower);
    }

    #[test]
    fn test_screaming_snake_names() {
        let kind: StatusKind = serde_json::from_str("\"OVER_POPULATION\"").unwrap();
        assert_eq!(kind, StatusKind::OverPopulation);
    }
}
