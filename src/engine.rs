//! Engine Core Module
//!
//! This module contains [`Engine`], the coordinator that owns one scene, one
//! action manager and one scheduler and drives them frame by frame. It has no
//! window or render loop of its own, so it can be driven by any frontend
//! (a game loop, tests, an editor tick).
//!
//! There are no process-wide singletons: everything an action or job can
//! reach is owned here and passed down explicitly, and two engines in one
//! process are fully independent.
//!
//! # Example
//!
//! ```rust,ignore
//! use kinema::{Engine, MoveBy, Node};
//! use glam::Vec2;
//!
//! let mut engine = Engine::new();
//! let hero = engine.scene.add_node(Node::new());
//! engine.run_action(hero, Box::new(MoveBy::new(1.0, Vec2::new(100.0, 0.0))));
//!
//! // Main loop
//! loop {
//!     engine.tick();
//! }
//! ```

use crate::action::Action;
use crate::action::manager::ActionManager;
use crate::scene::{NodeHandle, Scene};
use crate::scheduler::Scheduler;
use crate::utils::time::Timer;

/// Owns the scene and both frame-driven subsystems.
///
/// # Frame order
///
/// [`update`](Engine::update) runs the scheduler first (update jobs, timed
/// jobs, cross-thread queue), then the action manager. Both see the same
/// `dt`; the scheduler's time scale applies only to scheduled jobs.
pub struct Engine {
    pub scene: Scene,
    pub actions: ActionManager,
    pub scheduler: Scheduler,

    timer: Timer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            actions: ActionManager::new(),
            scheduler: Scheduler::new(),
            timer: Timer::new(),
        }
    }

    /// Convenience passthrough to the action manager.
    pub fn run_action(&mut self, target: NodeHandle, action: Box<dyn Action>) {
        self.actions.run_action(target, action, &mut self.scene);
    }

    /// Advances one frame with an explicit `dt` in seconds.
    pub fn update(&mut self, dt: f32) {
        self.scheduler.update(dt, &mut self.scene);
        self.actions.update(dt, &mut self.scene);
    }

    /// Advances one frame using wall-clock time since the previous tick.
    pub fn tick(&mut self) {
        self.timer.tick();
        let dt = self.timer.dt_seconds();
        self.update(dt);
    }

    /// Frames advanced via [`tick`](Engine::tick).
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count
    }
}
