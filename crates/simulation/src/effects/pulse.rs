use super::{
    DisplayNode, Ease, EffectHandle, EffectHandler, EffectKind, EffectParams, FrameContext,
    Teardown, Tween,
};

const DEFAULT_AMOUNT: f32 = 0.1;
const DEFAULT_PERIOD_MS: u32 = 600;

/// Breathes the building model's scale in and out.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseEffect;

impl EffectHandler for PulseEffect {
    fn activate(&self, node: &mut dyn DisplayNode, params: &EffectParams) -> Option<EffectHandle> {
        let base = node.model_scale();
        let amount = params.amount.unwrap_or(DEFAULT_AMOUNT);
        let period = params.duration.unwrap_or(DEFAULT_PERIOD_MS);

        let mut handle = EffectHandle::new(EffectKind::Scale);
        handle.restore_scale = Some(base);
        handle.motion = Some(Tween::new(base, base * (1.0 + amount), period, Ease::SineInOut).yoyo());
        Some(handle)
    }

    fn update(&self, node: &mut dyn DisplayNode, handle: &mut EffectHandle, frame: &FrameContext) {
        if let Some(motion) = handle.motion.as_mut() {
            node.set_model_scale(motion.advance(frame.dt_ms));
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
