//! Combinators that compose child actions into ownership trees.
//!
//! Every combinator owns its children outright (moved in at construction),
//! so `clone` and `reversed` are trivially recursive and a tree is torn down
//! by dropping its root. Time flows top-down: combinators re-warp normalized
//! progress (or wall-clock `dt`, for [`Speed`] and [`RepeatForever`]) before
//! forwarding it to their children.

use crate::action::interval::{DelayTime, IntervalState};
use crate::action::{Action, ActionCtx};
use crate::scene::{NodeHandle, Scene};

// ============================================================================
// Sequence
// ============================================================================

/// Runs two actions back to back.
///
/// An N-ary chain is built with [`Sequence::with_actions`], which folds into
/// a right-leaning binary tree. The `split` ratio is the duration-weighted
/// boundary between the children; `last` tracks which child was active on
/// the previous step so the boundary hand-off happens exactly once.
#[derive(Clone)]
pub struct Sequence {
    base: IntervalState,
    first: Box<dyn Action>,
    second: Box<dyn Action>,
    split: f32,
    last: i32,
}

impl Sequence {
    #[must_use]
    pub fn new(first: Box<dyn Action>, second: Box<dyn Action>) -> Self {
        let total = first.duration() + second.duration();
        Self {
            base: IntervalState::new(total),
            first,
            second,
            split: 0.0,
            last: -1,
        }
    }

    /// Folds a list of actions into a right-leaning chain.
    ///
    /// # Panics
    ///
    /// Panics if `actions` is empty.
    #[must_use]
    pub fn with_actions(mut actions: Vec<Box<dyn Action>>) -> Self {
        assert!(!actions.is_empty(), "a sequence needs at least one action");
        if actions.len() == 1 {
            let only = actions.pop().unwrap();
            return Self::new(only, Box::new(DelayTime::new(0.0)));
        }
        let mut tail = actions.pop().unwrap();
        while actions.len() > 1 {
            let prev = actions.pop().unwrap();
            tail = Box::new(Self::new(prev, tail));
        }
        Self::new(actions.pop().unwrap(), tail)
    }

    fn child_mut(&mut self, index: i32) -> &mut dyn Action {
        if index == 0 {
            self.first.as_mut()
        } else {
            self.second.as_mut()
        }
    }
}

impl Action for Sequence {
    fn start(&mut self, target: NodeHandle, _scene: &mut Scene) {
        self.base.start(target);
        self.split = self.first.duration() / self.base.duration();
        self.last = -1;
        // Children start lazily, on the first step that reaches them.
    }

    fn stop(&mut self, scene: &mut Scene) {
        // A child that never ran must not observe a stop.
        if self.last != -1 {
            self.child_mut(self.last).stop(scene);
        }
        self.base.stop();
    }

    fn is_done(&self) -> bool {
        self.base.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        let t = self.base.advance(dt);
        self.step(t, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target() else { return };

        let (found, local) = if t < self.split {
            let local = if self.split == 0.0 { 1.0 } else { t / self.split };
            (0, local)
        } else {
            let local = if self.split == 1.0 {
                1.0
            } else {
                (t - self.split) / (1.0 - self.split)
            };
            (1, local)
        };

        if found == 1 {
            match self.last {
                -1 => {
                    // First child was skipped entirely; it still must run its
                    // terminal state once.
                    self.first.start(target, ctx.scene);
                    self.first.step(1.0, ctx);
                    self.first.stop(ctx.scene);
                }
                0 => {
                    self.first.step(1.0, ctx);
                    self.first.stop(ctx.scene);
                }
                _ => {}
            }
        } else if self.last == 1 {
            // Time flowed backwards across the boundary.
            self.second.step(0.0, ctx);
            self.second.stop(ctx.scene);
        }

        if found == self.last && self.child_mut(found).is_done() {
            return;
        }
        if found != self.last {
            self.child_mut(found).start(target, ctx.scene);
        }
        self.child_mut(found).step(local, ctx);
        self.last = found;
    }

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Sequence::new(self.second.reversed(), self.first.reversed()))
    }
}

// ============================================================================
// Spawn
// ============================================================================

/// Runs two actions in parallel.
///
/// The shorter child is padded with a trailing [`DelayTime`] at construction
/// so both children observe the same logical duration and can be stepped
/// with identical progress values.
#[derive(Clone)]
pub struct Spawn {
    base: IntervalState,
    first: Box<dyn Action>,
    second: Box<dyn Action>,
}

impl Spawn {
    #[must_use]
    pub fn new(first: Box<dyn Action>, second: Box<dyn Action>) -> Self {
        let d1 = first.duration();
        let d2 = second.duration();
        let (first, second) = if d1 > d2 {
            let padded: Box<dyn Action> =
                Box::new(Sequence::new(second, Box::new(DelayTime::new(d1 - d2))));
            (first, padded)
        } else if d2 > d1 {
            let padded: Box<dyn Action> =
                Box::new(Sequence::new(first, Box::new(DelayTime::new(d2 - d1))));
            (padded, second)
        } else {
            (first, second)
        };
        Self {
            base: IntervalState::new(d1.max(d2)),
            first,
            second,
        }
    }

    /// Folds a list of actions into a right-leaning parallel group.
    ///
    /// # Panics
    ///
    /// Panics if `actions` is empty.
    #[must_use]
    pub fn with_actions(mut actions: Vec<Box<dyn Action>>) -> Self {
        assert!(!actions.is_empty(), "a spawn needs at least one action");
        if actions.len() == 1 {
            let only = actions.pop().unwrap();
            return Self::new(only, Box::new(DelayTime::new(0.0)));
        }
        let mut tail = actions.pop().unwrap();
        while actions.len() > 1 {
            let prev = actions.pop().unwrap();
            tail = Box::new(Self::new(prev, tail));
        }
        Self::new(actions.pop().unwrap(), tail)
    }
}

impl Action for Spawn {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        self.first.start(target, scene);
        self.second.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.first.stop(scene);
        self.second.stop(scene);
        self.base.stop();
    }

    fn is_done(&self) -> bool {
        self.base.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        let t = self.base.advance(dt);
        self.step(t, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        self.first.step(t, ctx);
        self.second.step(t, ctx);
    }

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Spawn::new(self.first.reversed(), self.second.reversed()))
    }
}

// ============================================================================
// Repeat
// ============================================================================

/// Repeats a finite inner action a fixed number of times.
///
/// `next_time` holds the normalized-time boundary of the next iteration; a
/// single large step may cross several boundaries, and the catch-up loop
/// forces one full completion per crossed boundary so no iteration is ever
/// skipped.
#[derive(Clone)]
pub struct Repeat {
    base: IntervalState,
    inner: Box<dyn Action>,
    times: u32,
    total: u32,
    next_time: f32,
    inner_instant: bool,
}

impl Repeat {
    /// # Panics
    ///
    /// Panics if `times` is zero.
    #[must_use]
    pub fn new(inner: Box<dyn Action>, times: u32) -> Self {
        assert!(times > 0, "a repeat needs at least one iteration");
        let inner_instant = inner.duration() == 0.0;
        let duration = times as f32 * inner.duration();
        Self {
            base: IntervalState::new(duration),
            inner,
            times,
            total: 0,
            next_time: 0.0,
            inner_instant,
        }
    }
}

impl Action for Repeat {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.total = 0;
        self.next_time = self.inner.duration() / self.base.duration();
        self.base.start(target);
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
        self.base.stop();
    }

    fn is_done(&self) -> bool {
        self.total == self.times
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        let t = self.base.advance(dt);
        self.step(t, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target() else { return };
        let cycle = self.inner.duration() / self.base.duration();

        if t >= self.next_time {
            while t >= self.next_time && self.total < self.times {
                self.inner.step(1.0, ctx);
                self.total += 1;
                self.inner.stop(ctx.scene);
                self.inner.start(target, ctx.scene);
                self.next_time = cycle * (self.total + 1) as f32;
            }

            // Rounding can leave the last boundary fractionally out of reach.
            if (t - 1.0).abs() < f32::EPSILON && self.total < self.times {
                self.inner.step(1.0, ctx);
                self.total += 1;
            }

            if !self.inner_instant {
                if self.total == self.times {
                    self.inner.stop(ctx.scene);
                } else {
                    // Re-seed the fresh cycle at the overshoot phase so the
                    // boundary crossing does not visually jerk.
                    self.inner.step(t - (self.next_time - cycle), ctx);
                }
            }
        } else {
            self.inner.step((t * self.times as f32) % 1.0, ctx);
        }
    }

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Repeat::new(self.inner.reversed(), self.times))
    }
}

// ============================================================================
// RepeatForever
// ============================================================================

/// Loops an interval action until it is explicitly stopped.
///
/// Works in wall-clock time: each time the inner action completes, the
/// overshoot beyond its duration is carried into the restarted cycle so the
/// phase stays continuous across the loop boundary.
#[derive(Clone)]
pub struct RepeatForever {
    inner: Box<dyn Action>,
    target: Option<NodeHandle>,
}

impl RepeatForever {
    /// # Panics
    ///
    /// Panics if `inner` is an instant action. An instant has no cycle to
    /// loop over; restarting it every frame would replay its effect several
    /// times per tick.
    #[must_use]
    pub fn new(inner: Box<dyn Action>) -> Self {
        assert!(
            inner.duration() > 0.0,
            "repeat forever needs an interval action"
        );
        Self {
            inner,
            target: None,
        }
    }
}

impl Action for RepeatForever {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.target = Some(target);
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
        self.target = None;
    }

    fn is_done(&self) -> bool {
        false
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.update(dt, ctx);
        if self.inner.is_done() {
            let Some(target) = self.target else { return };
            let mut diff = self.inner.elapsed() - self.inner.duration();
            if diff > self.inner.duration() {
                diff %= self.inner.duration();
            }
            self.inner.start(target, ctx.scene);
            // The zero tick is absorbed as the restarted cycle's first tick,
            // then the overshoot seeds the correct phase.
            self.inner.update(0.0, ctx);
            self.inner.update(diff, ctx);
        }
    }

    fn step(&mut self, _t: f32, _ctx: &mut ActionCtx<'_>) {}

    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn elapsed(&self) -> f32 {
        self.inner.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(RepeatForever::new(self.inner.reversed()))
    }
}

// ============================================================================
// Speed
// ============================================================================

/// Scales wall-clock time flowing into an interval action.
///
/// The factor can be changed while the action runs.
#[derive(Clone)]
pub struct Speed {
    inner: Box<dyn Action>,
    speed: f32,
}

impl Speed {
    #[must_use]
    pub fn new(inner: Box<dyn Action>, speed: f32) -> Self {
        Self { inner, speed }
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

impl Action for Speed {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.update(dt * self.speed, ctx);
    }

    fn step(&mut self, _t: f32, _ctx: &mut ActionCtx<'_>) {}

    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn elapsed(&self) -> f32 {
        self.inner.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Speed::new(self.inner.reversed(), self.speed))
    }
}

// ============================================================================
// ReverseTime
// ============================================================================

/// Plays a finite action backwards by mirroring normalized time.
///
/// `reversed` is deliberately unsupported here: reversing a reverse is the
/// identity and better expressed by using the original action.
#[derive(Clone)]
pub struct ReverseTime {
    base: IntervalState,
    inner: Box<dyn Action>,
}

impl ReverseTime {
    #[must_use]
    pub fn new(inner: Box<dyn Action>) -> Self {
        let duration = inner.duration();
        Self {
            base: IntervalState::new(duration),
            inner,
        }
    }
}

impl Action for ReverseTime {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
        self.base.stop();
    }

    fn is_done(&self) -> bool {
        self.base.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        let t = self.base.advance(dt);
        self.step(t, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.step(1.0 - t, ctx);
    }

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }
}

// ============================================================================
// TargetedAction
// ============================================================================

/// Forces an inner action onto a fixed target, regardless of which node the
/// surrounding tree was run on.
#[derive(Clone)]
pub struct TargetedAction {
    base: IntervalState,
    forced_target: NodeHandle,
    inner: Box<dyn Action>,
}

impl TargetedAction {
    #[must_use]
    pub fn new(forced_target: NodeHandle, inner: Box<dyn Action>) -> Self {
        let duration = inner.duration();
        Self {
            base: IntervalState::new(duration),
            forced_target,
            inner,
        }
    }
}

impl Action for TargetedAction {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        self.inner.start(self.forced_target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
        self.base.stop();
    }

    fn is_done(&self) -> bool {
        self.base.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        let t = self.base.advance(dt);
        self.step(t, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.step(t, ctx);
    }

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(TargetedAction::new(self.forced_target, self.inner.reversed()))
    }
}
