//! Schedule phases.
//!
//! A fixed tick runs `PreSim`, `Simulation` and `PostSim` in that order:
//! player actions land on the grid and building instances are reconciled
//! first, then aggregates are refreshed and every building updates its
//! statuses, and finally the day clock advances. Per-frame work in `Update`
//! is split into `Input` (camera) and `Visual` (mesh mirroring).

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Apply `CityAction`s, spawn/replace/despawn building instances.
    PreSim,
    /// `CityTotals`, then status evaluation and rotation in grid order.
    Simulation,
    /// Day rollover.
    PostSim,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationUpdateSet {
    Input,
    /// Reads simulation state only.
    Visual,
}
