//! Which single status a building presents, and when it changes.
//!
//! A building shows at most one effect. When several statuses hold, the
//! dominant list (debuffs over buffs) is cycled on a fixed interval. Swaps
//! fade the old effect out completely before the new one is activated, so two
//! effects never share the display node.

use bevy::prelude::*;

use crate::effects::{
    DisplayNode, EffectHandle, EffectKind, EffectRegistry, FrameContext, Teardown,
};
use crate::status::{ActiveStatus, StatusKind, StatusSets};

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationConfig {
    /// Time each status stays up while cycling.
    pub interval_ms: u32,
    /// Fade used when swapping between statuses.
    pub fade_out_ms: u32,
    /// Fade used when a status goes away for good.
    pub deactivate_ms: u32,
    /// Show debuffs instead of buffs whenever any debuff holds.
    pub debuff_priority: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_500,
            fade_out_ms: 200,
            deactivate_ms: 300,
            debuff_priority: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Idle,
    Displaying { kind: StatusKind, index: usize },
    Transitioning,
}

#[derive(Debug, Clone, PartialEq)]
struct Presented {
    kind: StatusKind,
    effect: EffectKind,
    /// `None` when no handler could show the effect.
    handle: Option<EffectHandle>,
}

/// Fading out the old effect; `target` is activated once it is gone.
#[derive(Debug, Clone, PartialEq)]
struct Transition {
    teardown: Teardown,
    target: usize,
    token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AdvanceTimer {
    interval_ms: u32,
    elapsed_ms: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRotation {
    display: Vec<ActiveStatus>,
    index: usize,
    timer: Option<AdvanceTimer>,
    current: Option<Presented>,
    transition: Option<Transition>,
    /// An effect fading away with nothing replacing it.
    retiring: Option<Teardown>,
    /// Bumped on every restart and cleanup; stale transitions are dropped.
    generation: u64,
}

fn release_handle(
    registry: &EffectRegistry,
    node: &mut dyn DisplayNode,
    presented: Presented,
    duration_ms: u32,
    swap: bool,
) -> Option<Teardown> {
    let handle = presented.handle?;
    Some(match registry.get(presented.effect) {
        Some(handler) if swap => handler.fade_out(node, handle, duration_ms),
        Some(handler) => handler.deactivate(node, handle, duration_ms),
        None => Teardown::fade(node, handle, duration_ms),
    })
}

impl StatusRotation {
    pub fn phase(&self) -> RotationPhase {
        if self.transition.is_some() {
            return RotationPhase::Transitioning;
        }
        match &self.current {
            Some(p) => RotationPhase::Displaying {
                kind: p.kind,
                index: self.index,
            },
            None => RotationPhase::Idle,
        }
    }

    pub fn displayed(&self) -> Option<StatusKind> {
        self.current.as_ref().map(|p| p.kind)
    }

    pub fn display_list(&self) -> &[ActiveStatus] {
        &self.display
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_cycling(&self) -> bool {
        self.timer.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current effect handle, if one is attached.
    pub fn handle(&self) -> Option<&EffectHandle> {
        self.current.as_ref().and_then(|p| p.handle.as_ref())
    }

    /// Start over from a new set of statuses.
    pub fn restart(
        &mut self,
        sets: &StatusSets,
        node: &mut dyn DisplayNode,
        registry: &EffectRegistry,
        config: &RotationConfig,
    ) {
        self.timer = None;
        self.generation = self.generation.wrapping_add(1);
        if let Some(mut transition) = self.transition.take() {
            transition.teardown.kill(node);
        }

        self.display = if config.debuff_priority {
            sets.dominant().to_vec()
        } else {
            sets.buffs.iter().chain(&sets.debuffs).cloned().collect()
        };
        self.index = 0;
        debug!(
            "Status rotation restart: {:?}",
            self.display.iter().map(|s| s.kind).collect::<Vec<_>>()
        );

        if self.display.is_empty() {
            if let Some(presented) = self.current.take() {
                if let Some(mut old) = self.retiring.take() {
                    old.kill(node);
                }
                self.retiring =
                    release_handle(registry, node, presented, config.deactivate_ms, false);
            }
            return;
        }

        self.display_at(0, node, registry, config);
        if self.display.len() > 1 {
            self.timer = Some(AdvanceTimer {
                interval_ms: config.interval_ms.max(1),
                elapsed_ms: 0,
            });
        }
    }

    fn display_at(
        &mut self,
        index: usize,
        node: &mut dyn DisplayNode,
        registry: &EffectRegistry,
        config: &RotationConfig,
    ) {
        let Some(target) = self.display.get(index) else {
            return;
        };
        if self.current.as_ref().is_some_and(|p| p.kind == target.kind) {
            self.index = index;
            return;
        }

        match self.current.take() {
            Some(presented) => {
                match release_handle(registry, node, presented, config.fade_out_ms, true) {
                    Some(teardown) => {
                        self.transition = Some(Transition {
                            teardown,
                            target: index,
                            token: self.generation,
                        });
                    }
                    None => self.activate(index, node, registry),
                }
            }
            None => self.activate(index, node, registry),
        }
    }

    fn activate(&mut self, index: usize, node: &mut dyn DisplayNode, registry: &EffectRegistry) {
        if let Some(mut old) = self.retiring.take() {
            old.kill(node);
        }
        let Some(status) = self.display.get(index) else {
            return;
        };
        let handle = match registry.get(status.effect.kind) {
            Some(handler) => handler.activate(node, &status.effect.params),
            None => {
                warn!(
                    "No effect handler for {:?}; {:?} will not be shown",
                    status.effect.kind, status.kind
                );
                None
            }
        };
        self.index = index;
        self.current = Some(Presented {
            kind: status.kind,
            effect: status.effect.kind,
            handle,
        });
    }

    fn advance(&mut self, node: &mut dyn DisplayNode, registry: &EffectRegistry, config: &RotationConfig) {
        if self.transition.is_some() || self.display.len() <= 1 {
            return;
        }
        let next = (self.index + 1) % self.display.len();
        self.display_at(next, node, registry, config);
    }

    /// One simulation tick: finish fades, fire the advance timer and animate
    /// the current effect.
    pub fn step(
        &mut self,
        node: &mut dyn DisplayNode,
        registry: &EffectRegistry,
        config: &RotationConfig,
        frame: &FrameContext,
    ) {
        if let Some(mut transition) = self.transition.take() {
            if transition.token != self.generation {
                transition.teardown.kill(node);
            } else if transition.teardown.step(node, frame.dt_ms) {
                self.activate(transition.target, node, registry);
            } else {
                self.transition = Some(transition);
            }
        }

        if let Some(teardown) = self.retiring.as_mut() {
            if teardown.step(node, frame.dt_ms) {
                self.retiring = None;
            }
        }

        let mut fires = 0;
        if let Some(timer) = self.timer.as_mut() {
            timer.elapsed_ms += frame.dt_ms;
            while timer.elapsed_ms >= timer.interval_ms {
                timer.elapsed_ms -= timer.interval_ms;
                fires += 1;
            }
        }
        for _ in 0..fires {
            self.advance(node, registry, config);
        }

        if let Some(presented) = self.current.as_mut() {
            if let (Some(handle), Some(handler)) =
                (presented.handle.as_mut(), registry.get(presented.effect))
            {
                handler.update(node, handle, frame);
            }
        }
    }

    /// Tear everything down now. Nothing stays attached to `node` afterwards.
    pub fn cleanup(
        &mut self,
        node: &mut dyn DisplayNode,
        registry: &EffectRegistry,
        config: &RotationConfig,
    ) {
        self.timer = None;
        self.generation = self.generation.wrapping_add(1);
        if let Some(mut transition) = self.transition.take() {
            transition.teardown.kill(node);
        }
        if let Some(mut teardown) = self.retiring.take() {
            teardown.kill(node);
        }
        if let Some(presented) = self.current.take() {
            if let Some(mut teardown) =
                release_handle(registry, node, presented, config.deactivate_ms, false)
            {
                teardown.finish(node);
            }
        }
        self.display.clear();
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::effects::{
        BillboardEffect, EffectDescriptor, EffectHandler, EffectParams, IndicatorRack,
    };

    struct Rig {
        rack: IndicatorRack,
        registry: EffectRegistry,
        config: RotationConfig,
        rotation: StatusRotation,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                rack: IndicatorRack::new(Vec3::ZERO, 0.8),
                registry: EffectRegistry::with_defaults(),
                config: RotationConfig::default(),
                rotation: StatusRotation::default(),
            }
        }

        fn restart(&mut self, sets: &StatusSets) {
            self.rotation
                .restart(sets, &mut self.rack, &self.registry, &self.config);
        }

        fn run_ms(&mut self, ms: u32) {
            let frame = FrameContext {
                dt_ms: 100,
                viewer: None,
            };
            for _ in 0..ms / 100 {
                self.rotation
                    .step(&mut self.rack, &self.registry, &self.config, &frame);
                assert!(self.rack.len() <= 1, "more than one indicator attached");
            }
        }
    }

    fn status(kind: StatusKind, effect: EffectKind) -> ActiveStatus {
        ActiveStatus {
            kind,
            effect: EffectDescriptor::new(effect),
        }
    }

    fn debuffs(list: &[(StatusKind, EffectKind)]) -> StatusSets {
        StatusSets {
            buffs: Vec::new(),
            debuffs: list.iter().map(|&(k, e)| status(k, e)).collect(),
        }
    }

    #[test]
    fn test_single_status_displays_without_timer() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[(StatusKind::MissingRoad, EffectKind::MissRoad)]));
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::MissingRoad));
        assert!(!rig.rotation.is_cycling());
        assert_eq!(rig.rack.len(), 1);
    }

    #[test]
    fn test_debuff_shown_over_buff() {
        let mut rig = Rig::new();
        let sets = StatusSets {
            buffs: vec![status(StatusKind::CoinBuff, EffectKind::CoinBuff)],
            debuffs: vec![status(StatusKind::Sad, EffectKind::Sad)],
        };
        rig.restart(&sets);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::Sad));
        assert_eq!(rig.rotation.display_list().len(), 1);
    }

    #[test]
    fn test_three_debuffs_cycle_back_to_first() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[
            (StatusKind::MissingRoad, EffectKind::MissRoad),
            (StatusKind::MissingPower, EffectKind::MissPower),
            (StatusKind::Sad, EffectKind::Sad),
        ]));
        assert!(rig.rotation.is_cycling());

        rig.run_ms(2_500);
        assert_eq!(rig.rotation.phase(), RotationPhase::Transitioning);
        rig.run_ms(200);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::MissingPower));

        rig.run_ms(2_300);
        rig.run_ms(200);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::Sad));

        rig.run_ms(2_300);
        rig.run_ms(200);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::MissingRoad));
        assert_eq!(rig.rotation.index(), 0);
    }

    #[test]
    fn test_swap_fades_before_activating() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[
            (StatusKind::MissingRoad, EffectKind::MissRoad),
            (StatusKind::Sad, EffectKind::Sad),
        ]));
        rig.run_ms(2_500);
        assert_eq!(rig.rack.len(), 1);
        assert_eq!(rig.rotation.displayed(), None);
        rig.run_ms(100);
        assert_eq!(rig.rotation.phase(), RotationPhase::Transitioning);
        rig.run_ms(100);
        assert_eq!(
            rig.rotation.phase(),
            RotationPhase::Displaying {
                kind: StatusKind::Sad,
                index: 1
            }
        );
        assert_eq!(rig.rack.len(), 1);
    }

    #[test]
    fn test_restart_mid_transition_kills_fade() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[
            (StatusKind::MissingRoad, EffectKind::MissRoad),
            (StatusKind::Sad, EffectKind::Sad),
        ]));
        rig.run_ms(2_500);
        assert_eq!(rig.rotation.phase(), RotationPhase::Transitioning);

        rig.restart(&debuffs(&[(StatusKind::MissingPower, EffectKind::MissPower)]));
        assert_eq!(rig.rack.len(), 1);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::MissingPower));
        rig.run_ms(1_000);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::MissingPower));
    }

    #[test]
    fn test_same_first_kind_keeps_handle() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[(StatusKind::Sad, EffectKind::Sad)]));
        rig.run_ms(300);
        let before = rig.rotation.handle().and_then(|h| h.indicator);

        rig.restart(&debuffs(&[
            (StatusKind::Sad, EffectKind::Sad),
            (StatusKind::MissingRoad, EffectKind::MissRoad),
        ]));
        assert_eq!(rig.rotation.handle().and_then(|h| h.indicator), before);
        assert!(rig.rotation.is_cycling());
    }

    #[test]
    fn test_empty_restart_fades_out_then_reactivation_is_clean() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[(StatusKind::Sad, EffectKind::Sad)]));
        rig.restart(&StatusSets::default());
        assert_eq!(rig.rotation.phase(), RotationPhase::Idle);
        assert_eq!(rig.rack.len(), 1);

        rig.restart(&debuffs(&[(StatusKind::MissingRoad, EffectKind::MissRoad)]));
        assert_eq!(rig.rack.len(), 1);

        rig.restart(&StatusSets::default());
        rig.run_ms(300);
        assert!(rig.rack.is_empty());
    }

    #[test]
    fn test_cleanup_is_synchronous() {
        let mut rig = Rig::new();
        rig.restart(&debuffs(&[
            (StatusKind::MissingRoad, EffectKind::MissRoad),
            (StatusKind::Sad, EffectKind::Sad),
        ]));
        rig.run_ms(2_600);
        rig.rotation
            .cleanup(&mut rig.rack, &rig.registry, &rig.config);
        assert!(rig.rack.is_empty());
        assert_eq!(rig.rotation.phase(), RotationPhase::Idle);
        assert!(!rig.rotation.is_cycling());
        rig.run_ms(5_000);
        assert!(rig.rack.is_empty());
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Activate(EffectKind),
        FadeOut(EffectKind, u32),
        Deactivate(EffectKind, u32),
    }

    /// Billboard that logs every lifecycle call it receives.
    struct RecordingEffect {
        icon: EffectKind,
        inner: BillboardEffect,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl RecordingEffect {
        fn new(icon: EffectKind, calls: &Arc<Mutex<Vec<Call>>>) -> Self {
            Self {
                icon,
                inner: BillboardEffect::new(icon),
                calls: Arc::clone(calls),
            }
        }

        fn log(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl EffectHandler for RecordingEffect {
        fn activate(
            &self,
            node: &mut dyn DisplayNode,
            params: &EffectParams,
        ) -> Option<EffectHandle> {
            self.log(Call::Activate(self.icon));
            self.inner.activate(node, params)
        }

        fn update(&self, node: &mut dyn DisplayNode, handle: &mut EffectHandle, frame: &FrameContext) {
            self.inner.update(node, handle, frame);
        }

        fn deactivate(
            &self,
            node: &mut dyn DisplayNode,
            handle: EffectHandle,
            duration_ms: u32,
        ) -> Teardown {
            self.log(Call::Deactivate(self.icon, duration_ms));
            Teardown::fade(node, handle, duration_ms)
        }

        fn fade_out(
            &self,
            node: &mut dyn DisplayNode,
            handle: EffectHandle,
            duration_ms: u32,
        ) -> Teardown {
            self.log(Call::FadeOut(self.icon, duration_ms));
            Teardown::fade(node, handle, duration_ms)
        }
    }

    #[test]
    fn test_swaps_fade_out_and_removals_deactivate() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EffectRegistry::default();
        for icon in [EffectKind::MissRoad, EffectKind::Sad] {
            registry
                .register(icon, RecordingEffect::new(icon, &calls))
                .unwrap();
        }
        let mut rig = Rig::new();
        rig.registry = registry;

        rig.restart(&debuffs(&[
            (StatusKind::MissingRoad, EffectKind::MissRoad),
            (StatusKind::Sad, EffectKind::Sad),
        ]));
        rig.run_ms(2_500);
        rig.run_ms(200);
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::Sad));

        rig.restart(&StatusSets::default());
        rig.restart(&debuffs(&[(StatusKind::MissingRoad, EffectKind::MissRoad)]));
        rig.rotation.cleanup(&mut rig.rack, &rig.registry, &rig.config);
        assert!(rig.rack.is_empty());

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                Call::Activate(EffectKind::MissRoad),
                Call::FadeOut(EffectKind::MissRoad, 200),
                Call::Activate(EffectKind::Sad),
                Call::Deactivate(EffectKind::Sad, 300),
                Call::Activate(EffectKind::MissRoad),
                Call::Deactivate(EffectKind::MissRoad, 300),
            ]
        );
    }

    #[test]
    fn test_missing_handler_shows_nothing_but_tracks_kind() {
        let mut rig = Rig::new();
        rig.registry = EffectRegistry::default();
        rig.restart(&debuffs(&[(StatusKind::Sad, EffectKind::Sad)]));
        assert_eq!(rig.rotation.displayed(), Some(StatusKind::Sad));
        assert!(rig.rack.is_empty());
    }
}
