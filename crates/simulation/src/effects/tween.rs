//! Millisecond-stepped scalar tweens.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    QuadIn,
    QuadOut,
    SineInOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => t * (2.0 - t),
            Ease::SineInOut => -(std::f32::consts::PI * t).cos() * 0.5 + 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    /// Runs `from -> to -> from` forever.
    YoyoForever,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration_ms: u32,
    elapsed_ms: u32,
    ease: Ease,
    repeat: Repeat,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration_ms: u32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration_ms,
            elapsed_ms: 0,
            ease,
            repeat: Repeat::Once,
        }
    }

    pub fn yoyo(mut self) -> Self {
        self.repeat = Repeat::YoyoForever;
        self
    }

    pub fn advance(&mut self, dt_ms: u32) -> f32 {
        match self.repeat {
            Repeat::Once => {
                self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms).min(self.duration_ms);
            }
            Repeat::YoyoForever => {
                let period = self.duration_ms.saturating_mul(2).max(1);
                self.elapsed_ms = (self.elapsed_ms % period + dt_ms % period) % period;
            }
        }
        self.value()
    }

    fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let d = self.duration_ms as f32;
        let e = self.elapsed_ms as f32;
        match self.repeat {
            Repeat::Once => e / d,
            Repeat::YoyoForever if e <= d => e / d,
            Repeat::YoyoForever => (2.0 * d - e) / d,
        }
    }

    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.ease.apply(self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.repeat == Repeat::Once && self.elapsed_ms >= self.duration_ms
    }

    /// Jump to the final value.
    pub fn complete(&mut self) -> f32 {
        if self.repeat == Repeat::Once {
            self.elapsed_ms = self.duration_ms;
        }
        self.value()
    }
}
