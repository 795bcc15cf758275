//! Sprite frame playback.

use crate::action::interval::IntervalState;
use crate::action::{Action, ActionCtx};
use crate::errors::{KinemaError, Result};
use crate::scene::{NodeHandle, Scene};

/// A validated list of sprite frame indices with a uniform per-frame delay.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<usize>,
    delay_per_frame: f32,
    loops: u32,
    restore_original_frame: bool,
}

impl Animation {
    /// Builds a single-loop animation.
    ///
    /// # Errors
    ///
    /// Returns [`KinemaError::EmptyAnimation`] for an empty frame list and
    /// [`KinemaError::InvalidFrameDelay`] for a non-positive delay.
    pub fn from_frames(frames: Vec<usize>, delay_per_frame: f32) -> Result<Self> {
        if frames.is_empty() {
            return Err(KinemaError::EmptyAnimation);
        }
        if delay_per_frame <= 0.0 {
            return Err(KinemaError::InvalidFrameDelay(delay_per_frame));
        }
        Ok(Self {
            frames,
            delay_per_frame,
            loops: 1,
            restore_original_frame: false,
        })
    }

    /// Number of times the frame list is played through.
    ///
    /// # Panics
    ///
    /// Panics if `loops` is zero.
    #[must_use]
    pub fn with_loops(mut self, loops: u32) -> Self {
        assert!(loops > 0, "an animation needs at least one loop");
        self.loops = loops;
        self
    }

    /// Restores the sprite frame that was displayed before playback started
    /// when the animate action stops.
    #[must_use]
    pub fn restoring_original_frame(mut self) -> Self {
        self.restore_original_frame = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    /// Wall-clock length of the full playback, loops included.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.delay_per_frame * self.loops as f32
    }

    fn reversed(&self) -> Self {
        let mut frames = self.frames.clone();
        frames.reverse();
        Self {
            frames,
            delay_per_frame: self.delay_per_frame,
            loops: self.loops,
            restore_original_frame: self.restore_original_frame,
        }
    }
}

/// Plays an [`Animation`] on a sprite-capable target.
///
/// `split_times` holds the normalized start time of each frame within one
/// loop; stepping scans forward from the last displayed frame, so a large
/// step lands on the correct frame without showing the skipped ones.
#[derive(Clone)]
pub struct Animate {
    base: IntervalState,
    animation: Animation,
    split_times: Vec<f32>,
    next_frame: usize,
    executed_loops: u32,
    original_frame: usize,
}

impl Animate {
    #[must_use]
    pub fn new(animation: Animation) -> Self {
        let count = animation.frames.len();
        let split_times = (0..count).map(|i| i as f32 / count as f32).collect();
        Self {
            base: IntervalState::new(animation.duration()),
            animation,
            split_times,
            next_frame: 0,
            executed_loops: 0,
            original_frame: 0,
        }
    }
}

impl Action for Animate {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        self.next_frame = 0;
        self.executed_loops = 0;
        if let Some(node) = scene.get_node_mut(target) {
            self.original_frame = node.sprite_mut().frame;
        }
    }

    fn stop(&mut self, scene: &mut Scene) {
        if self.animation.restore_original_frame {
            if let Some(node) = self.base.target().and_then(|t| scene.get_node_mut(t)) {
                node.sprite_mut().frame = self.original_frame;
            }
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

        let mut t = t;
        if t < 1.0 {
            t *= self.animation.loops as f32;
            let loop_number = t as u32;
            if loop_number > self.executed_loops {
                self.next_frame = 0;
                self.executed_loops += 1;
            }
            t %= 1.0;
        }

        let Some(node) = ctx.scene.get_node_mut(target) else {
            return;
        };
        for i in self.next_frame..self.animation.frames.len() {
            if self.split_times[i] <= t {
                node.sprite_mut().frame = self.animation.frames[i];
                self.next_frame = i + 1;
            } else {
                break;
            }
        }
    }

    fn duration(&self) -> f32 {
        self.base.duration()
    }

    fn elapsed(&self) -> f32 {
        self.base.elapsed()
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Animate::new(self.animation.reversed()))
    }
}
