use bevy::prelude::*;

use super::{
    DisplayNode, Ease, EffectHandle, EffectHandler, EffectKind, EffectParams, FrameContext,
    Indicator, IndicatorVisual, Teardown, Tween, FADE_IN_MS,
};

const DEFAULT_COLOR: &str = "#FFD700";
const DEFAULT_THICKNESS: f32 = 0.03;
const DEFAULT_PERIOD_MS: u32 = 1_000;

/// Coloured shell around the building whose thickness breathes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineEffect;

fn parse_color(params: &EffectParams) -> Srgba {
    let Some(hex) = params.color.as_deref() else {
        return Srgba::hex(DEFAULT_COLOR).unwrap_or(Srgba::WHITE);
    };
    match Srgba::hex(hex) {
        Ok(color) => color,
        Err(e) => {
            warn!("Bad outline colour {hex:?} ({e}), using {DEFAULT_COLOR}");
            Srgba::hex(DEFAULT_COLOR).unwrap_or(Srgba::WHITE)
        }
    }
}

impl EffectHandler for OutlineEffect {
    fn activate(&self, node: &mut dyn DisplayNode, params: &EffectParams) -> Option<EffectHandle> {
        let thickness = params.thickness.unwrap_or(DEFAULT_THICKNESS);
        let id = node.attach(Indicator::new(
            IndicatorVisual::Outline {
                color: parse_color(params),
                thickness,
            },
            Vec3::ZERO,
        ));

        let mut handle = EffectHandle::new(EffectKind::Outline);
        handle.indicator = Some(id);
        handle.fade_in = Some(Tween::new(0.0, 1.0, FADE_IN_MS, Ease::QuadOut));
        handle.motion = Some(
            Tween::new(
                thickness * 0.5,
                thickness,
                params.duration.unwrap_or(DEFAULT_PERIOD_MS),
                Ease::SineInOut,
            )
            .yoyo(),
        );
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
        let width = handle.motion.as_mut().map(|m| m.advance(frame.dt_ms));

        if let Some(indicator) = node.indicator_mut(id) {
            indicator.opacity = opacity;
            if let (IndicatorVisual::Outline { thickness, .. }, Some(width)) =
                (&mut indicator.visual, width)
            {
                *thickness = width;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::IndicatorRack;

    fn outline_color(rack: &IndicatorRack) -> Srgba {
        match rack.iter().next().map(|(_, ind)| ind.visual.clone()) {
            Some(IndicatorVisual::Outline { color, .. }) => color,
            other => panic!("expected outline, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_color() {
        let mut rack = IndicatorRack::new(Vec3::ZERO, 0.8);
        let params = EffectParams {
            color: Some("#ff0000".into()),
            ..Default::default()
        };
        OutlineEffect.activate(&mut rack, &params).unwrap();
        assert_eq!(outline_color(&rack), Srgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_bad_color_falls_back_to_gold() {
        let mut rack = IndicatorRack::new(Vec3::ZERO, 0.8);
        let params = EffectParams {
            color: Some("not-a-colour".into()),
            ..Default::default()
        };
        OutlineEffect.activate(&mut rack, &params).unwrap();
        assert_eq!(outline_color(&rack), Srgba::hex("#FFD700").unwrap());
    }

    #[test]
    fn test_thickness_animates() {
        let mut rack = IndicatorRack::new(Vec3::ZERO, 0.8);
        let params = EffectParams {
            thickness: Some(0.1),
            duration: Some(200),
            ..Default::default()
        };
        let mut handle = OutlineEffect.activate(&mut rack, &params).unwrap();
        let frame = FrameContext {
            dt_ms: 200,
            viewer: None,
        };
        OutlineEffect.update(&mut rack, &mut handle, &frame);
        match rack.iter().next().map(|(_, ind)| ind.visual.clone()) {
            Some(IndicatorVisual::Outline { thickness, .. }) => {
                assert!((thickness - 0.1).abs() < 1e-6)
            }
            other => panic!("expected outline, got {other:?}"),
        };
    }
}
