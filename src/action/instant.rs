//! Zero-duration, single-shot actions.
//!
//! Instant actions report a duration of exactly `0.0` and are already done
//! when asked; their `update` unconditionally delegates `step(1.0)`. The
//! property writes themselves are idempotent, so re-entry at combinator
//! boundaries is harmless.

use std::rc::Rc;

use glam::Vec2;

use crate::action::{Action, ActionClone, ActionCtx};
use crate::scene::{NodeHandle, Scene};

/// Target binding shared by all instant actions.
#[derive(Debug, Clone, Copy, Default)]
struct InstantState {
    target: Option<NodeHandle>,
}

impl InstantState {
    fn start(&mut self, target: NodeHandle) {
        self.target = Some(target);
    }

    fn stop(&mut self) {
        self.target = None;
    }
}

macro_rules! instant_action_boilerplate {
    () => {
        fn start(&mut self, target: NodeHandle, _scene: &mut Scene) {
            self.base.start(target);
        }

        fn stop(&mut self, _scene: &mut Scene) {
            self.base.stop();
        }

        fn is_done(&self) -> bool {
            true
        }

        fn update(&mut self, _dt: f32, ctx: &mut ActionCtx<'_>) {
            self.step(1.0, ctx);
        }
    };
}

// ============================================================================
// Visibility
// ============================================================================

/// Makes the target visible.
#[derive(Clone, Default)]
pub struct Show {
    base: InstantState,
}

impl Show {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Action for Show {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        if let Some(node) = ctx.scene.get_node_mut(target) {
            node.visible = true;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Hide::new())
    }
}

/// Makes the target invisible.
#[derive(Clone, Default)]
pub struct Hide {
    base: InstantState,
}

impl Hide {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Action for Hide {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        if let Some(node) = ctx.scene.get_node_mut(target) {
            node.visible = false;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Show::new())
    }
}

/// Inverts the target's visibility.
#[derive(Clone, Default)]
pub struct ToggleVisibility {
    base: InstantState,
}

impl ToggleVisibility {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Action for ToggleVisibility {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        if let Some(node) = ctx.scene.get_node_mut(target) {
            node.visible = !node.visible;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        self.clone_boxed()
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Teleports the target to an absolute position.
#[derive(Clone)]
pub struct Place {
    base: InstantState,
    position: Vec2,
}

impl Place {
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            base: InstantState::default(),
            position,
        }
    }
}

impl Action for Place {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        if let Some(node) = ctx.scene.get_node_mut(target) {
            node.position = self.position;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        self.clone_boxed()
    }
}

// ============================================================================
// Sprite flips
// ============================================================================

/// Sets the horizontal flip of a sprite-capable target.
#[derive(Clone)]
pub struct FlipX {
    base: InstantState,
    flipped: bool,
}

impl FlipX {
    #[must_use]
    pub fn new(flipped: bool) -> Self {
        Self {
            base: InstantState::default(),
            flipped,
        }
    }
}

impl Action for FlipX {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        if let Some(node) = ctx.scene.get_node_mut(target) {
            node.sprite_mut().flip_x = self.flipped;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(FlipX::new(!self.flipped))
    }
}

/// Sets the vertical flip of a sprite-capable target.
#[derive(Clone)]
pub struct FlipY {
    base: InstantState,
    flipped: bool,
}

impl FlipY {
    #[must_use]
    pub fn new(flipped: bool) -> Self {
        Self {
            base: InstantState::default(),
            flipped,
        }
    }
}

impl Action for FlipY {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        if let Some(node) = ctx.scene.get_node_mut(target) {
            node.sprite_mut().flip_y = self.flipped;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(FlipY::new(!self.flipped))
    }
}

// ============================================================================
// Removal
// ============================================================================

/// Removes the target node from the scene.
///
/// Sibling actions still bound to the removed node keep running to their
/// scheduled end; their steps no longer resolve a node and do nothing.
#[derive(Clone, Default)]
pub struct RemoveSelf {
    base: InstantState,
}

impl RemoveSelf {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Action for RemoveSelf {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        ctx.scene.remove_node(target);
    }

    fn reversed(&self) -> Box<dyn Action> {
        self.clone_boxed()
    }
}

// ============================================================================
// Callbacks
// ============================================================================

/// Invokes a callback with the bound target and the step context.
///
/// The callback may submit or stop actions through the context; those
/// requests take effect on the next frame. Clones share the callback, so a
/// cloned tree fires the same function.
#[derive(Clone)]
pub struct CallFunc {
    base: InstantState,
    func: Rc<dyn Fn(NodeHandle, &mut ActionCtx<'_>)>,
}

impl CallFunc {
    #[must_use]
    pub fn new(func: impl Fn(&mut ActionCtx<'_>) + 'static) -> Self {
        Self {
            base: InstantState::default(),
            func: Rc::new(move |_, ctx| func(ctx)),
        }
    }

    /// Like [`CallFunc::new`], but the callback also receives the target.
    #[must_use]
    pub fn with_node(func: impl Fn(NodeHandle, &mut ActionCtx<'_>) + 'static) -> Self {
        Self {
            base: InstantState::default(),
            func: Rc::new(func),
        }
    }
}

impl Action for CallFunc {
    instant_action_boilerplate!();

    fn step(&mut self, _t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target else { return };
        (self.func)(target, ctx);
    }

    fn reversed(&self) -> Box<dyn Action> {
        self.clone_boxed()
    }
}
