//! Visual effects attached to a building's display node.
//!
//! An [`EffectHandler`] knows how to bring one kind of effect up on a
//! [`DisplayNode`], animate it each tick and take it down again. Handlers are
//! looked up by [`EffectKind`] in the [`EffectRegistry`]; the rotation
//! controller only ever talks to the trait.

mod billboard;
mod display_node;
mod outline;
mod pulse;
mod registry;
mod teardown;
mod tween;

pub use billboard::BillboardEffect;
pub use display_node::{DisplayNode, Indicator, IndicatorId, IndicatorRack, IndicatorVisual};
pub use outline::OutlineEffect;
pub use pulse::PulseEffect;
pub use registry::{EffectRegistry, RegistryError};
pub use teardown::Teardown;
pub use tween::{Ease, Repeat, Tween};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Fade-in time for freshly attached indicators.
pub const FADE_IN_MS: u32 = 500;
/// Bob period for billboards.
pub const BOB_MS: u32 = 2_500;
/// Faster bob used by the upgrade arrow.
pub const UPGRADE_BOB_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Pulses the building model itself.
    Scale,
    /// Coloured shell around the building.
    Outline,
    Powerup,
    PowerBuff,
    MissPower,
    HumanBuff,
    HumanDeBuff,
    MissPopulation,
    OverPopulation,
    PollutionUpBuff,
    PollutionDownBuff,
    PollutionLowerBuff,
    CoinBuff,
    Upgrade,
    Happy,
    Sad,
    Angry,
    MissRoad,
}

impl EffectKind {
    /// Kinds drawn as a floating icon above the building.
    pub const BILLBOARDS: [EffectKind; 16] = [
        EffectKind::Powerup,
        EffectKind::PowerBuff,
        EffectKind::MissPower,
        EffectKind::HumanBuff,
        EffectKind::HumanDeBuff,
        EffectKind::MissPopulation,
        EffectKind::OverPopulation,
        EffectKind::PollutionUpBuff,
        EffectKind::PollutionDownBuff,
        EffectKind::PollutionLowerBuff,
        EffectKind::CoinBuff,
        EffectKind::Upgrade,
        EffectKind::Happy,
        EffectKind::Sad,
        EffectKind::Angry,
        EffectKind::MissRoad,
    ];

    pub fn is_billboard(self) -> bool {
        !matches!(self, EffectKind::Scale | EffectKind::Outline)
    }
}

/// Optional tuning for an effect. Each handler reads the fields it knows
/// and falls back to its own defaults for the rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectParams {
    /// Height above the model top for billboards.
    pub offset_y: Option<f32>,
    /// Billboard size in world units.
    pub scale: Option<f32>,
    /// Pulse amplitude as a fraction of the model scale.
    pub amount: Option<f32>,
    /// Animation period in milliseconds.
    pub duration: Option<u32>,
    /// Outline colour as a hex string.
    pub color: Option<String>,
    pub thickness: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(flatten)]
    pub params: EffectParams,
}

impl EffectDescriptor {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            params: EffectParams::default(),
        }
    }

    pub fn with_offset_y(mut self, offset_y: f32) -> Self {
        self.params.offset_y = Some(offset_y);
        self
    }
}

/// Runtime state of an attached effect, handed back to its handler on every
/// call. Opaque to the rotation controller.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectHandle {
    pub kind: EffectKind,
    pub indicator: Option<IndicatorId>,
    pub fade_in: Option<Tween>,
    pub motion: Option<Tween>,
    pub base_offset: Vec3,
    /// Model scale to put back when the effect goes away.
    pub restore_scale: Option<f32>,
}

impl EffectHandle {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            indicator: None,
            fade_in: None,
            motion: None,
            base_offset: Vec3::ZERO,
            restore_scale: None,
        }
    }
}

/// Per-tick inputs shared by every handler update.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    pub dt_ms: u32,
    /// Camera position, when a camera exists.
    pub viewer: Option<Vec3>,
}

pub trait EffectHandler: Send + Sync {
    /// Attach the effect. `None` means nothing could be shown.
    fn activate(&self, node: &mut dyn DisplayNode, params: &EffectParams) -> Option<EffectHandle>;

    /// Advance animation by one tick.
    fn update(&self, node: &mut dyn DisplayNode, handle: &mut EffectHandle, frame: &FrameContext);

    /// Start the animated removal. The returned teardown releases everything
    /// the handle owns once it has run for `duration_ms`.
    fn deactivate(
        &self,
        node: &mut dyn DisplayNode,
        handle: EffectHandle,
        duration_ms: u32,
    ) -> Teardown;

    /// Quick fade used when swapping to another status.
    fn fade_out(
        &self,
        node: &mut dyn DisplayNode,
        handle: EffectHandle,
        duration_ms: u32,
    ) -> Teardown {
        self.deactivate(node, handle, duration_ms)
    }
}
