use bevy::prelude::*;

use super::EffectKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorId(u32);

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorVisual {
    /// Camera-facing icon.
    Billboard { icon: EffectKind, size: f32 },
    /// Shell drawn around the building model.
    Outline { color: Srgba, thickness: f32 },
}

/// A child visual hung off a display node. The rendering side mirrors these
/// into real meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub visual: IndicatorVisual,
    /// Offset from the node origin.
    pub offset: Vec3,
    pub opacity: f32,
    /// Rotation about +Y so the indicator faces the viewer.
    pub facing_yaw: f32,
}

impl Indicator {
    pub fn new(visual: IndicatorVisual, offset: Vec3) -> Self {
        Self {
            visual,
            offset,
            opacity: 0.0,
            facing_yaw: 0.0,
        }
    }
}

/// The attach point effects draw into.
pub trait DisplayNode {
    fn attach(&mut self, indicator: Indicator) -> IndicatorId;
    /// Returns `false` if `id` was not attached.
    fn detach(&mut self, id: IndicatorId) -> bool;
    fn indicator_mut(&mut self, id: IndicatorId) -> Option<&mut Indicator>;
    fn world_position(&self) -> Vec3;
    /// Height of the building model, for stacking icons on top of it.
    fn height(&self) -> f32;
    fn model_scale(&self) -> f32;
    fn set_model_scale(&mut self, scale: f32);
}

/// Per-building display node stored on the building entity.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct IndicatorRack {
    origin: Vec3,
    height: f32,
    model_scale: f32,
    next_id: u32,
    indicators: Vec<(IndicatorId, Indicator)>,
}

impl IndicatorRack {
    pub fn new(origin: Vec3, height: f32) -> Self {
        Self {
            origin,
            height,
            model_scale: 1.0,
            next_id: 0,
            indicators: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorId, &Indicator)> + '_ {
        self.indicators.iter().map(|(id, ind)| (*id, ind))
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }
}

impl DisplayNode for IndicatorRack {
    fn attach(&mut self, indicator: Indicator) -> IndicatorId {
        let id = IndicatorId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.indicators.push((id, indicator));
        id
    }

    fn detach(&mut self, id: IndicatorId) -> bool {
        let before = self.indicators.len();
        self.indicators.retain(|(i, _)| *i != id);
        self.indicators.len() != before
    }

    fn indicator_mut(&mut self, id: IndicatorId) -> Option<&mut Indicator> {
        self.indicators
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, ind)| ind)
    }

    fn world_position(&self) -> Vec3 {
        self.origin
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn model_scale(&self) -> f32 {
        self.model_scale
    }

    fn set_model_scale(&mut self, scale: f32) {
        self.model_scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billboard() -> Indicator {
        Indicator::new(
            IndicatorVisual::Billboard {
                icon: EffectKind::Sad,
                size: 0.5,
            },
            Vec3::Y,
        )
    }

    #[test]
    fn test_attach_detach() {
        let mut rack = IndicatorRack::new(Vec3::ZERO, 1.0);
        let a = rack.attach(billboard());
        let b = rack.attach(billboard());
        assert_ne!(a, b);
        assert_eq!(rack.len(), 2);
        assert!(rack.detach(a));
        assert!(!rack.detach(a));
        assert_eq!(rack.len(), 1);
        assert!(rack.indicator_mut(b).is_some());
        assert!(rack.indicator_mut(a).is_none());
    }
}
