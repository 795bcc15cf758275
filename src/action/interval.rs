//! Finite-duration time base shared by all interval actions.

use crate::action::{Action, ActionCtx};
use crate::scene::{NodeHandle, Scene};

/// Duration, elapsed time and target binding of an interval action.
///
/// Converts wall-clock deltas into normalized progress. The first `advance`
/// after a `start` absorbs its `dt` so a freshly started action always takes
/// its first real step from `elapsed == 0`, independent of frame rate.
#[derive(Debug, Clone)]
pub struct IntervalState {
    duration: f32,
    elapsed: f32,
    first_tick: bool,
    target: Option<NodeHandle>,
}

impl IntervalState {
    /// Creates a time base. A zero or negative duration is floored to
    /// `f32::EPSILON` so the progress division is always defined; such an
    /// action is done on its first real tick.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        let duration = if duration <= 0.0 {
            f32::EPSILON
        } else {
            duration
        };
        Self {
            duration,
            elapsed: 0.0,
            first_tick: true,
            target: None,
        }
    }

    pub fn start(&mut self, target: NodeHandle) {
        self.target = Some(target);
        self.elapsed = 0.0;
        self.first_tick = true;
    }

    pub fn stop(&mut self) {
        self.target = None;
    }

    /// Accumulates `dt` and returns the clamped normalized progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.first_tick {
            self.first_tick = false;
            self.elapsed = 0.0;
        } else {
            self.elapsed += dt;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<NodeHandle> {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn has_stopped(&self) -> bool {
        self.target.is_none()
    }
}

/// Waits out its duration without touching the target.
///
/// Mostly useful inside `Sequence`, and as the padding `Spawn` wraps around
/// its shorter child.
#[derive(Clone)]
pub struct DelayTime {
    base: IntervalState,
}

impl DelayTime {
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            base: IntervalState::new(duration),
        }
    }
}

impl Action for DelayTime {
    fn start(&mut self, target: NodeHandle, _scene: &mut Scene) {
        self.base.start(target);
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn is_done(&self) -> bool {
        self.base.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        let t = self.base.advance(dt);
        self.step(t, ctx);
    }

    fn step(&mut self, _t: f32, _ctx: &mut ActionCtx<'_>) {}

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(DelayTime::new(self.base.duration()))
    }
}
