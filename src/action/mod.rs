//! Action system module
//!
//! A retained, composable animation model: an [`Action`] is a unit of change
//! over time bound to a target node, and combinators (`Sequence`, `Spawn`,
//! `Repeat`, ...) own child actions to form strict ownership trees. The
//! per-target [`manager::ActionManager`] owns every live tree and steps it
//! once per frame.
//!
//! Two clocks flow through the system:
//! - [`Action::update`] receives wall-clock delta time in seconds;
//! - [`Action::step`] receives normalized progress in `[0, 1]`.
//!
//! Interval actions convert the former into the latter; combinators re-warp
//! normalized time before forwarding it to their children.

pub mod animate;
pub mod compose;
pub mod instant;
pub mod interval;
pub mod manager;
pub mod tween;

use smallvec::SmallVec;

use crate::scene::{NodeHandle, Scene};

/// Tag value of actions that were never tagged.
pub const INVALID_TAG: i32 = -1;

/// A unit of change applied to a target node over time.
///
/// # Lifecycle
///
/// An action is constructed in a "not yet started" state. [`start`] binds the
/// target, and may be called again after a [`stop`] because looping
/// combinators rely on restarts. [`update`] is the per-frame wall-clock entry point;
/// interval actions normalize the accumulated time and forward it to
/// [`step`], which performs the actual mutation. [`stop`] clears the target
/// binding and is the single authoritative sign that the action is eligible
/// for removal by its owner.
///
/// [`start`]: Action::start
/// [`stop`]: Action::stop
/// [`update`]: Action::update
/// [`step`]: Action::step
pub trait Action: ActionClone {
    /// Binds the action to a target, resetting per-run state.
    ///
    /// The scene is passed so leaf tweens can snapshot the properties they
    /// interpolate from. Restarts re-snapshot.
    fn start(&mut self, target: NodeHandle, scene: &mut Scene);

    /// Tears the action down and clears the target binding.
    ///
    /// Subclass-style cleanup (restoring a property a step perturbed) runs
    /// here, exactly once per start/stop cycle.
    fn stop(&mut self, scene: &mut Scene);

    fn is_done(&self) -> bool;

    /// Advances wall-clock time by `dt` seconds.
    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>);

    /// Applies the state for normalized progress `t` in `[0, 1]`.
    ///
    /// Must be safe to call repeatedly with the same `t`: combinators re-enter
    /// at boundaries.
    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>);

    /// Total duration in seconds. Instant actions report exactly `0.0`;
    /// interval durations are floored to a positive epsilon, so the two are
    /// always distinguishable.
    fn duration(&self) -> f32 {
        0.0
    }

    /// Seconds accumulated since the last `start`.
    fn elapsed(&self) -> f32 {
        0.0
    }

    /// Returns a new action playing this one backwards.
    ///
    /// # Panics
    ///
    /// Panics for actions whose reversal is semantically undefined (the
    /// absolute "To"-style tweens, `ReverseTime` itself).
    fn reversed(&self) -> Box<dyn Action> {
        panic!(
            "{} has no well-defined reverse",
            std::any::type_name::<Self>()
        );
    }
}

/// Object-safe deep-clone support for boxed actions.
pub trait ActionClone {
    fn clone_boxed(&self) -> Box<dyn Action>;
}

impl<T> ActionClone for T
where
    T: Action + Clone + 'static,
{
    fn clone_boxed(&self) -> Box<dyn Action> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Action> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

// ============================================================================
// Step context and deferred manager commands
// ============================================================================

/// Deferred command for the owning [`manager::ActionManager`].
///
/// Commands queued during a frame's step pass are applied after the pass, so
/// callbacks can freely submit and stop actions while the live collection is
/// being iterated. Nothing queued mid-frame runs before the next frame.
pub(crate) enum ActionCommand {
    Run {
        target: NodeHandle,
        action: Box<dyn Action>,
        tag: i32,
        flags: u32,
    },
    StopAll,
    StopForTarget(NodeHandle),
    StopForTargetWithTag(NodeHandle, i32),
    StopForTargetWithFlags(NodeHandle, u32),
}

/// Buffer of deferred manager commands collected during one step pass.
#[derive(Default)]
pub struct ActionOps {
    pub(crate) commands: SmallVec<[ActionCommand; 4]>,
}

/// Everything an action may touch while stepping: the target scene, plus a
/// command buffer for manager operations that must not mutate the collection
/// currently being iterated.
pub struct ActionCtx<'a> {
    pub scene: &'a mut Scene,
    ops: &'a mut ActionOps,
}

impl<'a> ActionCtx<'a> {
    /// Builds a context over a scene and a command buffer. Hosts stepping an
    /// action outside a manager own the buffer and decide what to do with
    /// the commands it accumulates.
    #[must_use]
    pub fn new(scene: &'a mut Scene, ops: &'a mut ActionOps) -> Self {
        Self { scene, ops }
    }

    /// Submits an action for `target`, to begin stepping next frame.
    ///
    /// The action is started (snapshots its target state) immediately.
    pub fn run_action(&mut self, target: NodeHandle, action: Box<dyn Action>) {
        self.run_action_with(target, action, INVALID_TAG, 0);
    }

    /// Submits an action with an explicit tag and flags mask.
    pub fn run_action_with(
        &mut self,
        target: NodeHandle,
        mut action: Box<dyn Action>,
        tag: i32,
        flags: u32,
    ) {
        assert!(
            self.scene.contains(target),
            "run_action requires a live target node"
        );
        action.start(target, self.scene);
        self.ops.commands.push(ActionCommand::Run {
            target,
            action,
            tag,
            flags,
        });
    }

    /// Requests a stop of every live and pending action.
    pub fn stop_all_actions(&mut self) {
        self.ops.commands.push(ActionCommand::StopAll);
    }

    /// Requests a stop of all actions bound to `target`.
    pub fn stop_actions_for_target(&mut self, target: NodeHandle) {
        self.ops.commands.push(ActionCommand::StopForTarget(target));
    }

    /// Requests a stop of `target`'s actions carrying `tag`.
    pub fn stop_actions_for_target_with_tag(&mut self, target: NodeHandle, tag: i32) {
        self.ops
            .commands
            .push(ActionCommand::StopForTargetWithTag(target, tag));
    }

    /// Requests a stop of `target`'s actions matching `flags`.
    pub fn stop_actions_for_target_with_flags(&mut self, target: NodeHandle, flags: u32) {
        self.ops
            .commands
            .push(ActionCommand::StopForTargetWithFlags(target, flags));
    }
}
