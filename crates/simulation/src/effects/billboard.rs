use bevy::prelude::*;

use super::{
    DisplayNode, Ease, EffectHandle, EffectHandler, EffectKind, EffectParams, FrameContext,
    Indicator, IndicatorVisual, Teardown, Tween, BOB_MS, FADE_IN_MS, UPGRADE_BOB_MS,
};

const DEFAULT_SIZE: f32 = 0.5;
const DEFAULT_OFFSET_Y: f32 = 0.3;
const BOB_HEIGHT: f32 = 0.15;

/// Floating status icon above the building. Fades in, bobs up and down and
/// turns to face the camera every tick.
#[derive(Debug, Clone, Copy)]
pub struct BillboardEffect {
    icon: EffectKind,
    bob_ms: u32,
}

impl BillboardEffect {
    pub fn new(icon: EffectKind) -> Self {
        let bob_ms = if icon == EffectKind::Upgrade {
            UPGRADE_BOB_MS
        } else {
            BOB_MS
        };
        Self { icon, bob_ms }
    }
}

/// Yaw that turns a +Z facing quad at `from` towards `to`.
fn yaw_towards(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    d.x.atan2(d.z)
}

impl EffectHandler for BillboardEffect {
    fn activate(&self, node: &mut dyn DisplayNode, params: &EffectParams) -> Option<EffectHandle> {
        let size = params.scale.unwrap_or(DEFAULT_SIZE);
        let offset = Vec3::Y * (node.height() + params.offset_y.unwrap_or(DEFAULT_OFFSET_Y));
        let id = node.attach(Indicator::new(
            IndicatorVisual::Billboard {
                icon: self.icon,
                size,
            },
            offset,
        ));

        let bob_ms = params.duration.unwrap_or(self.bob_ms);
        let mut handle = EffectHandle::new(self.icon);
        handle.indicator = Some(id);
        handle.base_offset = offset;
        handle.fade_in = Some(Tween::new(0.0, 1.0, FADE_IN_MS, Ease::QuadOut));
        handle.motion = Some(Tween::new(0.0, BOB_HEIGHT, bob_ms, Ease::SineInOut).yoyo());
        Some(handle)
    }

    fn update(&self, node: &mut dyn DisplayNode, handle: &mut EffectHandle, frame: &FrameContext) {
        let Some(id) = handle.indicator else {
            return;
        };
        let opacity = match handle.fade_in.as_mut() {
            Some(fade) => {
                let value = fade.advance(frame.dt_ms);
                if fade.is_finished() {
                    handle.fade_in = None;
                }
                value
            }
            None => 1.0,
        };
        let bob = handle
            .motion
            .as_mut()
            .map_or(0.0, |m| m.advance(frame.dt_ms));
        let origin = node.world_position();
        let base = handle.base_offset;

        if let Some(indicator) = node.indicator_mut(id) {
            indicator.opacity = opacity;
            indicator.offset = base + Vec3::Y * bob;
            if let Some(viewer) = frame.viewer {
                indicator.facing_yaw = yaw_towards(origin + indicator.offset, viewer);
            }
        }
    }

    fn deactivate(
        &self,
        node: &mut dyn DisplayNode,
        handle: EffectHandle,
        duration_ms: u32,
    ) -> Teardown {
        Teardown::fade(node, handle, duration_ms)
    }
}
