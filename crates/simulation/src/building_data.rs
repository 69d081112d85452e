//! Static per-type building tables.
//!
//! Level data and interaction tables ship as JSON under `data/` and are
//! embedded at compile time. [`BuildingCatalog::builtin`] parses and validates
//! both once at startup; everything downstream reads the catalog resource.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog_error::CatalogError;
use crate::config::REFUND_RATIO;
use crate::effects::EffectKind;
use crate::interactions::{InteractionConfig, Modifier, StatusEffectConfig};

const BUILDINGS_JSON: &str = include_str!("../data/buildings.json");
const INTERACTIONS_JSON: &str = include_str!("../data/interactions.json");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Road,
    House,
    House2,
    Shop,
    Factory,
    NukeFactory,
    SunPower,
    WindPower,
    FireStation,
    Hospital,
    Police,
    HeroPark,
    Park,
    WaterTower,
}

impl BuildingType {
    pub const ALL: [BuildingType; 14] = [
        BuildingType::Road,
        BuildingType::House,
        BuildingType::House2,
        BuildingType::Shop,
        BuildingType::Factory,
        BuildingType::NukeFactory,
        BuildingType::SunPower,
        BuildingType::WindPower,
        BuildingType::FireStation,
        BuildingType::Hospital,
        BuildingType::Police,
        BuildingType::HeroPark,
        BuildingType::Park,
        BuildingType::WaterTower,
    ];

    /// Hospitals, police and fire stations raise city stability.
    pub fn is_public_service(self) -> bool {
        matches!(
            self,
            BuildingType::Hospital | BuildingType::Police | BuildingType::FireStation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Infrastructure,
    Residential,
    Commercial,
    Industrial,
    Power,
    Service,
    Leisure,
}

/// Numeric attributes of a level that the modifier pipeline can adjust.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    CoinOutput,
    PowerOutput,
    PowerUsage,
    Pollution,
    MaxPopulation,
    /// Jobs offered by the building.
    Population,
}

/// UI language for player-facing names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayName {
    pub en: String,
    pub zh: String,
}

impl DisplayName {
    /// Name in `language`, or `None` when the table leaves it blank.
    pub fn get(&self, language: Language) -> Option<&str> {
        let name = match language {
            Language::En => &self.en,
            Language::Zh => &self.zh,
        };
        (!name.is_empty()).then_some(name.as_str())
    }
}

/// Static attributes of one building level. A copy is cached on the tile as
/// its detail snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelDetail {
    pub cost: f64,
    pub coin_output: f64,
    pub power_output: f64,
    pub power_usage: f64,
    pub pollution: f64,
    pub max_population: f64,
    pub population: f64,
    pub category: Category,
    pub display_name: DisplayName,
    pub next_level: Option<u8>,
    #[serde(default = "default_output_factor")]
    pub output_factor: f32,
}

fn default_output_factor() -> f32 {
    1.0
}

impl LevelDetail {
    pub fn attribute(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::CoinOutput => self.coin_output,
            Attribute::PowerOutput => self.power_output,
            Attribute::PowerUsage => self.power_usage,
            Attribute::Pollution => self.pollution,
            Attribute::MaxPopulation => self.max_population,
            Attribute::Population => self.population,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildingSpec {
    pub levels: BTreeMap<u8, LevelDetail>,
    #[serde(skip)]
    pub interactions: InteractionConfig,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BuildingCatalog {
    specs: BTreeMap<BuildingType, BuildingSpec>,
}

impl BuildingCatalog {
    /// The tables embedded in the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILDINGS_JSON, INTERACTIONS_JSON)
    }

    pub fn from_json(buildings: &str, interactions: &str) -> Result<Self, CatalogError> {
        let specs: BTreeMap<BuildingType, BuildingSpec> = serde_json::from_str(buildings)?;
        let interactions: BTreeMap<BuildingType, InteractionConfig> =
            serde_json::from_str(interactions)?;

        let mut catalog = Self { specs };
        for (building, config) in interactions {
            let Some(spec) = catalog.specs.get_mut(&building) else {
                return Err(CatalogError::UnknownInteractionTarget { building });
            };
            spec.interactions = config;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (&building, spec) in &self.specs {
            if !spec.levels.contains_key(&1) {
                return Err(CatalogError::MissingFirstLevel { building });
            }
            for (&level, detail) in &spec.levels {
                if let Some(next) = detail.next_level {
                    if !spec.levels.contains_key(&next) {
                        return Err(CatalogError::BrokenNextLevel {
                            building,
                            level,
                            next,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn insert_level(&mut self, building: BuildingType, level: u8, detail: LevelDetail) {
        self.specs
            .entry(building)
            .or_default()
            .levels
            .insert(level, detail);
    }

    pub fn set_interactions(&mut self, building: BuildingType, config: InteractionConfig) {
        self.specs.entry(building).or_default().interactions = config;
    }

    pub fn building_types(&self) -> impl Iterator<Item = BuildingType> + '_ {
        self.specs.keys().copied()
    }

    pub fn level(&self, building: BuildingType, level: u8) -> Option<&LevelDetail> {
        self.specs.get(&building)?.levels.get(&level)
    }

    /// The level an upgrade would move to, if the table has one.
    pub fn next_level(&self, building: BuildingType, level: u8) -> Option<u8> {
        let next = self.level(building, level)?.next_level?;
        self.level(building, next).map(|_| next)
    }

    /// Cost of a level, 0 when the table has no such level.
    pub fn cost(&self, building: BuildingType, level: u8) -> f64 {
        self.level(building, level).map_or(0.0, |d| d.cost)
    }

    pub fn refund(&self, building: BuildingType, level: u8) -> f64 {
        self.cost(building, level) * REFUND_RATIO
    }

    /// Player-facing name such as "House Lv.2". Falls back to the type name
    /// when the level is unknown or has no name in `language`.
    pub fn display_name(&self, building: BuildingType, level: u8, language: Language) -> String {
        match self
            .level(building, level)
            .and_then(|d| d.display_name.get(language))
        {
            Some(name) => format!("{name} Lv.{level}"),
            None => format!("{building:?} Lv.{level}"),
        }
    }

    pub fn modifiers(&self, building: BuildingType, attribute: Attribute) -> &[Modifier] {
        self.specs
            .get(&building)
            .and_then(|s| s.interactions.modifiers.get(&attribute))
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn status_effects(&self, building: BuildingType) -> &[StatusEffectConfig] {
        self.specs
            .get(&building)
            .map_or(&[][..], |s| s.interactions.status_effects.as_slice())
    }

    /// Every effect kind referenced by configured status effects.
    pub fn referenced_effect_kinds(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.specs
            .values()
            .flat_map(|s| s.interactions.status_effects.iter())
            .map(|s| s.effect.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = BuildingCatalog::builtin().expect("builtin tables parse");
        for building in BuildingType::ALL {
            assert!(
                catalog.level(building, 1).is_some(),
                "{building:?} has no level 1"
            );
        }
    }

    #[test]
    fn test_next_level_chain() {
        let catalog = BuildingCatalog::builtin().unwrap();
        assert_eq!(catalog.next_level(BuildingType::House, 1), Some(2));
        assert_eq!(catalog.next_level(BuildingType::Factory, 1), None);
    }

    #[test]
    fn test_refund_is_seventy_percent() {
        let catalog = BuildingCatalog::builtin().unwrap();
        let cost = catalog.cost(BuildingType::Shop, 1);
        assert!((catalog.refund(BuildingType::Shop, 1) - cost * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_missing_level_costs_nothing() {
        let catalog = BuildingCatalog::default();
        assert_eq!(catalog.cost(BuildingType::House, 7), 0.0);
        assert!(catalog.modifiers(BuildingType::House, Attribute::CoinOutput).is_empty());
    }

    #[test]
    fn test_broken_next_level_rejected() {
        let buildings = r#"{ "house": { "levels": { "1": { "cost": 10, "nextLevel": 3 } } } }"#;
        let err = BuildingCatalog::from_json(buildings, "{}").unwrap_err();
        assert!(matches!(err, CatalogError::BrokenNextLevel { next: 3, .. }));
    }

    #[test]
    fn test_interactions_for_unknown_type_rejected() {
        let buildings = r#"{ "house": { "levels": { "1": { "cost": 10 } } } }"#;
        let interactions = r#"{ "shop": { "statusEffects": [] } }"#;
        let err = BuildingCatalog::from_json(buildings, interactions).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownInteractionTarget {
                building: BuildingType::Shop
            }
        ));
    }

    #[test]
    fn test_output_factor_defaults_to_one() {
        let buildings = r#"{ "park": { "levels": { "1": { "cost": 5 } } } }"#;
        let catalog = BuildingCatalog::from_json(buildings, "{}").unwrap();
        assert_eq!(catalog.level(BuildingType::Park, 1).unwrap().output_factor, 1.0);
    }
}
