//! # TestCity: headless harness for whole-plugin tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `SimulationPlugin` so
//! scenarios can place buildings, send player actions and step the fixed
//! schedule without a window or renderer.

mod assertions;
mod queries;
mod setup;

use bevy::app::App;
use bevy::prelude::*;

use crate::world_init::SkipWorldInit;
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin`.
///
/// Use builder methods to set up the grid and city state, then call `tick()`
/// to advance the simulation and query the resulting ECS state.
pub struct TestCity {
    app: App,
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCity {
    /// An **empty** 17x17 grass grid with default city state. The starting
    /// factory is NOT placed.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Insert the marker BEFORE SimulationPlugin so init_world skips.
        app.insert_resource(SkipWorldInit);
        app.add_plugins(SimulationPlugin);
        // Run one update so Startup systems execute.
        app.update();
        Self { app }
    }

    /// A city seeded the way a new game starts.
    pub fn with_starting_city() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.update();
        Self { app }
    }
}
