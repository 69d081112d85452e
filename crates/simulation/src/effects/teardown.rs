use super::{DisplayNode, Ease, EffectHandle, IndicatorId, Tween};

/// An effect on its way out: fades the indicator (or eases the model scale
/// back) and then releases it from the node. Once released, further calls do
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Teardown {
    indicator: Option<IndicatorId>,
    opacity: Option<Tween>,
    scale: Option<Tween>,
    restore_scale: Option<f32>,
    released: bool,
}

impl Teardown {
    /// Fade whatever `handle` owns to nothing over `duration_ms`.
    pub fn fade(node: &mut dyn DisplayNode, handle: EffectHandle, duration_ms: u32) -> Self {
        let opacity = handle.indicator.map(|id| {
            let current = node.indicator_mut(id).map_or(0.0, |ind| ind.opacity);
            Tween::new(current, 0.0, duration_ms, Ease::QuadIn)
        });
        let scale = handle
            .restore_scale
            .map(|target| Tween::new(node.model_scale(), target, duration_ms, Ease::QuadOut));
        Self {
            indicator: handle.indicator,
            opacity,
            scale,
            restore_scale: handle.restore_scale,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Advance the animation; returns `true` once everything is released.
    pub fn step(&mut self, node: &mut dyn DisplayNode, dt_ms: u32) -> bool {
        if self.released {
            return true;
        }
        let mut running = false;
        if let Some(tween) = self.opacity.as_mut() {
            let value = tween.advance(dt_ms);
            if let Some(ind) = self.indicator.and_then(|id| node.indicator_mut(id)) {
                ind.opacity = value;
            }
            running |= !tween.is_finished();
        }
        if let Some(tween) = self.scale.as_mut() {
            node.set_model_scale(tween.advance(dt_ms));
            running |= !tween.is_finished();
        }
        if !running {
            self.release(node);
        }
        self.released
    }

    /// Jump to the end of the animation and release.
    pub fn finish(&mut self, node: &mut dyn DisplayNode) {
        if let Some(tween) = self.opacity.as_mut() {
            tween.complete();
        }
        if let Some(tween) = self.scale.as_mut() {
            tween.complete();
        }
        self.release(node);
    }

    /// Stop the animation where it is and release immediately.
    pub fn kill(&mut self, node: &mut dyn DisplayNode) {
        self.opacity = None;
        self.scale = None;
        self.release(node);
    }

    fn release(&mut self, node: &mut dyn DisplayNode) {
        if self.released {
            return;
        }
        if let Some(id) = self.indicator.take() {
            node.detach(id);
        }
        if let Some(scale) = self.restore_scale.take() {
            node.set_model_scale(scale);
        }
        self.released = true;
    }
}
