use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::building_data::{BuildingCatalog, BuildingType};
use crate::city_state::{CityState, CityTotals};
use crate::config::{DEFAULT_MODEL_HEIGHT, SIM_TICK_MS};
use crate::effects::{DisplayNode, EffectRegistry, FrameContext, IndicatorRack};
use crate::grid::{Direction, GridPos, Tile, TileGrid};
use crate::rotation::{RotationConfig, StatusRotation};
use crate::status::{evaluate_statuses, rules_for, RuleContext, StatusKind, StatusRule, StatusSets};

/// Read-only world state a building looks at while it updates.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub grid: &'a TileGrid,
    pub catalog: &'a BuildingCatalog,
    pub city: &'a CityState,
    pub totals: &'a CityTotals,
}

/// Runtime state of the building standing on one tile. Replaced wholesale
/// whenever the tile's type, level or orientation changes.
#[derive(Component, Debug)]
pub struct BuildingInstance {
    pub building: BuildingType,
    pub level: u8,
    pub direction: Direction,
    pub pos: GridPos,
    rules: Vec<StatusRule>,
    sets: StatusSets,
    rotation: StatusRotation,
}

impl BuildingInstance {
    pub fn new(
        building: BuildingType,
        level: u8,
        direction: Direction,
        pos: GridPos,
        catalog: &BuildingCatalog,
    ) -> Self {
        Self {
            building,
            level,
            direction,
            pos,
            rules: rules_for(building, catalog),
            sets: StatusSets::default(),
            rotation: StatusRotation::default(),
        }
    }

    pub fn from_tile(pos: GridPos, tile: &Tile, catalog: &BuildingCatalog) -> Option<Self> {
        let building = tile.building?;
        Some(Self::new(building, tile.level, tile.direction, pos, catalog))
    }

    /// Whether this instance still describes what stands on `tile`.
    pub fn matches_tile(&self, tile: &Tile) -> bool {
        tile.building == Some(self.building)
            && tile.level == self.level
            && tile.direction == self.direction
    }

    pub fn rules(&self) -> &[StatusRule] {
        &self.rules
    }

    pub fn status_sets(&self) -> &StatusSets {
        &self.sets
    }

    pub fn rotation(&self) -> &StatusRotation {
        &self.rotation
    }

    pub fn displayed_status(&self) -> Option<StatusKind> {
        self.rotation.displayed()
    }

    pub fn context<'a>(&self, world: WorldView<'a>) -> RuleContext<'a> {
        RuleContext {
            building: self.building,
            level: self.level,
            pos: self.pos,
            grid: world.grid,
            catalog: world.catalog,
            city: world.city,
            totals: world.totals,
        }
    }

    /// Re-evaluate statuses, restart the rotation if the kinds changed, then
    /// advance the rotation by one tick.
    pub fn update(
        &mut self,
        world: WorldView<'_>,
        node: &mut dyn DisplayNode,
        registry: &EffectRegistry,
        config: &RotationConfig,
        frame: &FrameContext,
    ) {
        let fresh = evaluate_statuses(&self.rules, &self.context(world));
        if !fresh.same_kinds(&self.sets) {
            self.sets = fresh;
            self.rotation.restart(&self.sets, node, registry, config);
        }
        self.rotation.step(node, registry, config, frame);
    }

    /// Release every effect now; nothing stays attached to `node`.
    pub fn teardown(
        &mut self,
        node: &mut dyn DisplayNode,
        registry: &EffectRegistry,
        config: &RotationConfig,
    ) {
        self.rotation.cleanup(node, registry, config);
        self.sets = StatusSets::default();
    }
}

/// Building entity per occupied tile, in grid order.
#[derive(Resource, Debug, Default)]
pub struct BuildingIndex {
    entities: BTreeMap<GridPos, Entity>,
}

impl BuildingIndex {
    pub fn get(&self, pos: GridPos) -> Option<Entity> {
        self.entities.get(&pos).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, Entity)> + '_ {
        self.entities.iter().map(|(p, e)| (*p, *e))
    }
}

/// Camera position used to turn billboards towards the viewer.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ViewerPosition(pub Option<Vec3>);

/// Keep one `BuildingInstance` entity per occupied tile.
///
/// Instances whose tile no longer matches (emptied, replaced, upgraded,
/// rotated) have their effects torn down before the entity is despawned;
/// tiles without an instance get a fresh one.
pub fn sync_building_instances(
    mut commands: Commands,
    grid: Res<TileGrid>,
    catalog: Res<BuildingCatalog>,
    registry: Res<EffectRegistry>,
    config: Res<RotationConfig>,
    mut index: ResMut<BuildingIndex>,
    mut instances: Query<(&mut BuildingInstance, &mut IndicatorRack)>,
) {
    let mut stale = Vec::new();
    for (&pos, &entity) in &index.entities {
        let Ok((mut instance, mut rack)) = instances.get_mut(entity) else {
            stale.push(pos);
            continue;
        };
        let still_valid = grid.get(pos).is_some_and(|t| instance.matches_tile(t));
        if !still_valid {
            instance.teardown(&mut *rack, &registry, &config);
            commands.entity(entity).despawn();
            stale.push(pos);
        }
    }
    for pos in stale {
        index.entities.remove(&pos);
    }

    for (pos, tile) in grid.iter() {
        if index.entities.contains_key(&pos) {
            continue;
        }
        let Some(instance) = BuildingInstance::from_tile(pos, tile, &catalog) else {
            continue;
        };
        let rack = IndicatorRack::new(grid.grid_to_world(pos), DEFAULT_MODEL_HEIGHT);
        let entity = commands.spawn((instance, rack)).id();
        index.entities.insert(pos, entity);
    }
}

/// Evaluate statuses and step rotations for every building, in grid order.
#[allow(clippy::too_many_arguments)]
pub fn tick_building_status(
    grid: Res<TileGrid>,
    catalog: Res<BuildingCatalog>,
    city: Res<CityState>,
    totals: Res<CityTotals>,
    registry: Res<EffectRegistry>,
    config: Res<RotationConfig>,
    viewer: Res<ViewerPosition>,
    index: Res<BuildingIndex>,
    mut instances: Query<(&mut BuildingInstance, &mut IndicatorRack)>,
) {
    let world = WorldView {
        grid: &grid,
        catalog: &catalog,
        city: &city,
        totals: &totals,
    };
    let frame = FrameContext {
        dt_ms: SIM_TICK_MS,
        viewer: viewer.0,
    };
    for (_, entity) in index.iter() {
        if let Ok((mut instance, mut rack)) = instances.get_mut(entity) {
            instance.update(world, &mut *rack, &registry, &config, &frame);
        }
    }
}
