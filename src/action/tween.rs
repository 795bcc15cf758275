//! Leaf actions interpolating a single target property.
//!
//! Every tween snapshots the property it animates in `start` and writes the
//! interpolated value in `step`, so restarts re-snapshot and cloned trees
//! are independent. "By" tweens are relative and reversible; "To" tweens
//! head for an absolute value, so reversing them is undefined and panics.
//!
//! The positional "By" tweens (`MoveBy`, `JumpBy`, `BezierBy`) stack: they
//! track the position they last wrote, and fold any outside movement of the
//! target into their own origin. Two concurrent `MoveBy` actions on one node
//! therefore add up instead of fighting over the property.

use std::rc::Rc;

use glam::Vec2;

use crate::action::interval::IntervalState;
use crate::action::{Action, ActionCtx};
use crate::scene::node::Node;
use crate::scene::{Color, NodeHandle, Scene};

/// Resolves the live target node of a running tween, if any.
fn resolve<'s>(base: &IntervalState, scene: &'s mut Scene) -> Option<&'s mut Node> {
    scene.get_node_mut(base.target()?)
}

macro_rules! interval_action_boilerplate {
    () => {
        fn is_done(&self) -> bool {
            self.base.is_done()
        }

        fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
            let t = self.base.advance(dt);
            self.step(t, ctx);
        }

        fn duration(&self) -> f32 {
            self.base.duration()
        }

        fn elapsed(&self) -> f32 {
            self.base.elapsed()
        }
    };
}

// ============================================================================
// Position
// ============================================================================

/// Moves the target by a relative offset.
#[derive(Clone)]
pub struct MoveBy {
    base: IntervalState,
    delta: Vec2,
    start_position: Vec2,
    previous: Vec2,
}

impl MoveBy {
    #[must_use]
    pub fn new(duration: f32, delta: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            delta,
            start_position: Vec2::ZERO,
            previous: Vec2::ZERO,
        }
    }
}

impl Action for MoveBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_position = node.position;
            self.previous = node.position;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(node) = resolve(&self.base, ctx.scene) else {
            return;
        };
        // Fold movement applied by others since our last write into the
        // origin, so concurrent relative moves stack.
        let outside = node.position - self.previous;
        self.start_position += outside;
        let new_position = self.start_position + self.delta * t;
        node.position = new_position;
        self.previous = new_position;
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(MoveBy::new(self.base.duration(), -self.delta))
    }
}

/// Moves the target to an absolute position.
#[derive(Clone)]
pub struct MoveTo {
    inner: MoveBy,
    end_position: Vec2,
}

impl MoveTo {
    #[must_use]
    pub fn new(duration: f32, end_position: Vec2) -> Self {
        Self {
            inner: MoveBy::new(duration, Vec2::ZERO),
            end_position,
        }
    }
}

impl Action for MoveTo {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        if let Some(node) = scene.get_node(target) {
            self.inner.delta = self.end_position - node.position;
        }
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.update(dt, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.step(t, ctx);
    }

    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn elapsed(&self) -> f32 {
        self.inner.elapsed()
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// Rotates the target by a relative angle in degrees.
#[derive(Clone)]
pub struct RotateBy {
    base: IntervalState,
    delta_angle: f32,
    start_angle: f32,
}

impl RotateBy {
    #[must_use]
    pub fn new(duration: f32, delta_angle: f32) -> Self {
        Self {
            base: IntervalState::new(duration),
            delta_angle,
            start_angle: 0.0,
        }
    }
}

impl Action for RotateBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_angle = node.rotation;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.rotation = self.start_angle + self.delta_angle * t;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(RotateBy::new(self.base.duration(), -self.delta_angle))
    }
}

/// Rotates the target to an absolute angle along the shortest arc.
#[derive(Clone)]
pub struct RotateTo {
    base: IntervalState,
    end_angle: f32,
    start_angle: f32,
    diff_angle: f32,
}

impl RotateTo {
    #[must_use]
    pub fn new(duration: f32, end_angle: f32) -> Self {
        Self {
            base: IntervalState::new(duration),
            end_angle,
            start_angle: 0.0,
            diff_angle: 0.0,
        }
    }
}

impl Action for RotateTo {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_angle = node.rotation % 360.0;
            let mut diff = self.end_angle - self.start_angle;
            if diff > 180.0 {
                diff -= 360.0;
            }
            if diff < -180.0 {
                diff += 360.0;
            }
            self.diff_angle = diff;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.rotation = self.start_angle + self.diff_angle * t;
        }
    }
}

// ============================================================================
// Scale
// ============================================================================

/// Scales the target to an absolute scale factor.
#[derive(Clone)]
pub struct ScaleTo {
    base: IntervalState,
    end_scale: Vec2,
    start_scale: Vec2,
    delta: Vec2,
}

impl ScaleTo {
    #[must_use]
    pub fn new(duration: f32, end_scale: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            end_scale,
            start_scale: Vec2::ONE,
            delta: Vec2::ZERO,
        }
    }
}

impl Action for ScaleTo {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_scale = node.scale;
            self.delta = self.end_scale - self.start_scale;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.scale = self.start_scale + self.delta * t;
        }
    }
}

/// Multiplies the target's scale by a factor.
#[derive(Clone)]
pub struct ScaleBy {
    base: IntervalState,
    factor: Vec2,
    start_scale: Vec2,
    delta: Vec2,
}

impl ScaleBy {
    #[must_use]
    pub fn new(duration: f32, factor: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            factor,
            start_scale: Vec2::ONE,
            delta: Vec2::ZERO,
        }
    }
}

impl Action for ScaleBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_scale = node.scale;
            self.delta = self.start_scale * self.factor - self.start_scale;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.scale = self.start_scale + self.delta * t;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(ScaleBy::new(self.base.duration(), Vec2::ONE / self.factor))
    }
}

// ============================================================================
// Skew
// ============================================================================

/// Skews the target to absolute per-axis angles in degrees.
#[derive(Clone)]
pub struct SkewTo {
    base: IntervalState,
    end_skew: Vec2,
    start_skew: Vec2,
    delta: Vec2,
}

impl SkewTo {
    #[must_use]
    pub fn new(duration: f32, end_skew: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            end_skew,
            start_skew: Vec2::ZERO,
            delta: Vec2::ZERO,
        }
    }

    fn wrapped_delta(start: f32, end: f32) -> f32 {
        let mut delta = end - start;
        if delta > 180.0 {
            delta -= 360.0;
        }
        if delta < -180.0 {
            delta += 360.0;
        }
        delta
    }
}

impl Action for SkewTo {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_skew = Vec2::new(node.skew.x % 180.0, node.skew.y % 180.0);
            self.delta = Vec2::new(
                Self::wrapped_delta(self.start_skew.x, self.end_skew.x),
                Self::wrapped_delta(self.start_skew.y, self.end_skew.y),
            );
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.skew = self.start_skew + self.delta * t;
        }
    }
}

/// Skews the target by relative per-axis angles in degrees.
#[derive(Clone)]
pub struct SkewBy {
    base: IntervalState,
    delta: Vec2,
    start_skew: Vec2,
}

impl SkewBy {
    #[must_use]
    pub fn new(duration: f32, delta: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            delta,
            start_skew: Vec2::ZERO,
        }
    }
}

impl Action for SkewBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_skew = node.skew;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.skew = self.start_skew + self.delta * t;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(SkewBy::new(self.base.duration(), -self.delta))
    }
}

// ============================================================================
// Content size
// ============================================================================

/// Resizes the target's content size by a relative delta.
#[derive(Clone)]
pub struct ResizeBy {
    base: IntervalState,
    delta: Vec2,
    start_size: Vec2,
}

impl ResizeBy {
    #[must_use]
    pub fn new(duration: f32, delta: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            delta,
            start_size: Vec2::ZERO,
        }
    }
}

impl Action for ResizeBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_size = node.content_size;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.content_size = self.start_size + self.delta * t;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(ResizeBy::new(self.base.duration(), -self.delta))
    }
}

/// Resizes the target's content size to an absolute size.
#[derive(Clone)]
pub struct ResizeTo {
    base: IntervalState,
    end_size: Vec2,
    start_size: Vec2,
    delta: Vec2,
}

impl ResizeTo {
    #[must_use]
    pub fn new(duration: f32, end_size: Vec2) -> Self {
        Self {
            base: IntervalState::new(duration),
            end_size,
            start_size: Vec2::ZERO,
            delta: Vec2::ZERO,
        }
    }
}

impl Action for ResizeTo {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_size = node.content_size;
            self.delta = self.end_size - self.start_size;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.content_size = self.start_size + self.delta * t;
        }
    }
}

// ============================================================================
// Jump
// ============================================================================

/// Moves the target by a relative offset along a series of parabolic hops.
#[derive(Clone)]
pub struct JumpBy {
    base: IntervalState,
    delta: Vec2,
    height: f32,
    jumps: u32,
    start_position: Vec2,
    previous: Vec2,
}

impl JumpBy {
    #[must_use]
    pub fn new(duration: f32, delta: Vec2, height: f32, jumps: u32) -> Self {
        Self {
            base: IntervalState::new(duration),
            delta,
            height,
            jumps,
            start_position: Vec2::ZERO,
            previous: Vec2::ZERO,
        }
    }

    fn offset_at(&self, t: f32) -> Vec2 {
        let frac = (t * self.jumps as f32) % 1.0;
        let y = self.height * 4.0 * frac * (1.0 - frac) + self.delta.y * t;
        let x = self.delta.x * t;
        Vec2::new(x, y)
    }
}

impl Action for JumpBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_position = node.position;
            self.previous = node.position;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let offset = self.offset_at(t);
        let Some(node) = resolve(&self.base, ctx.scene) else {
            return;
        };
        let outside = node.position - self.previous;
        self.start_position += outside;
        let new_position = self.start_position + offset;
        node.position = new_position;
        self.previous = new_position;
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(JumpBy::new(
            self.base.duration(),
            -self.delta,
            self.height,
            self.jumps,
        ))
    }
}

/// Hops the target to an absolute position.
#[derive(Clone)]
pub struct JumpTo {
    inner: JumpBy,
    end_position: Vec2,
}

impl JumpTo {
    #[must_use]
    pub fn new(duration: f32, end_position: Vec2, height: f32, jumps: u32) -> Self {
        Self {
            inner: JumpBy::new(duration, Vec2::ZERO, height, jumps),
            end_position,
        }
    }
}

impl Action for JumpTo {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        if let Some(node) = scene.get_node(target) {
            self.inner.delta = self.end_position - node.position;
        }
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.update(dt, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.step(t, ctx);
    }

    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn elapsed(&self) -> f32 {
        self.inner.elapsed()
    }
}

// ============================================================================
// Bezier
// ============================================================================

/// Control points of a cubic Bezier segment, relative to the curve origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierConfig {
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

fn bezier_at(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u.powi(3) * a + 3.0 * t * u.powi(2) * b + 3.0 * t.powi(2) * u * c + t.powi(3) * d
}

/// Moves the target along a cubic Bezier curve, relative to its position.
#[derive(Clone)]
pub struct BezierBy {
    base: IntervalState,
    config: BezierConfig,
    start_position: Vec2,
    previous: Vec2,
}

impl BezierBy {
    #[must_use]
    pub fn new(duration: f32, config: BezierConfig) -> Self {
        Self {
            base: IntervalState::new(duration),
            config,
            start_position: Vec2::ZERO,
            previous: Vec2::ZERO,
        }
    }
}

impl Action for BezierBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_position = node.position;
            self.previous = node.position;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let c = self.config;
        let offset = Vec2::new(
            bezier_at(0.0, c.control1.x, c.control2.x, c.end.x, t),
            bezier_at(0.0, c.control1.y, c.control2.y, c.end.y, t),
        );
        let Some(node) = resolve(&self.base, ctx.scene) else {
            return;
        };
        let outside = node.position - self.previous;
        self.start_position += outside;
        let new_position = self.start_position + offset;
        node.position = new_position;
        self.previous = new_position;
    }

    fn reversed(&self) -> Box<dyn Action> {
        let c = self.config;
        let reversed = BezierConfig {
            control1: c.control2 - c.end,
            control2: c.control1 - c.end,
            end: -c.end,
        };
        Box::new(BezierBy::new(self.base.duration(), reversed))
    }
}

/// Moves the target along a cubic Bezier curve given in absolute coordinates.
#[derive(Clone)]
pub struct BezierTo {
    inner: BezierBy,
    absolute: BezierConfig,
}

impl BezierTo {
    #[must_use]
    pub fn new(duration: f32, config: BezierConfig) -> Self {
        Self {
            inner: BezierBy::new(
                duration,
                BezierConfig {
                    control1: Vec2::ZERO,
                    control2: Vec2::ZERO,
                    end: Vec2::ZERO,
                },
            ),
            absolute: config,
        }
    }
}

impl Action for BezierTo {
    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        if let Some(node) = scene.get_node(target) {
            self.inner.config = BezierConfig {
                control1: self.absolute.control1 - node.position,
                control2: self.absolute.control2 - node.position,
                end: self.absolute.end - node.position,
            };
        }
        self.inner.start(target, scene);
    }

    fn stop(&mut self, scene: &mut Scene) {
        self.inner.stop(scene);
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn update(&mut self, dt: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.update(dt, ctx);
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        self.inner.step(t, ctx);
    }

    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn elapsed(&self) -> f32 {
        self.inner.elapsed()
    }
}

// ============================================================================
// Blink
// ============================================================================

/// Flashes the target's visibility a fixed number of times.
///
/// The pre-run visibility is restored on `stop`, whether the blink ran to
/// completion or was cancelled.
#[derive(Clone)]
pub struct Blink {
    base: IntervalState,
    times: u32,
    original_visible: bool,
}

impl Blink {
    #[must_use]
    pub fn new(duration: f32, times: u32) -> Self {
        Self {
            base: IntervalState::new(duration),
            times,
            original_visible: true,
        }
    }
}

impl Action for Blink {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.original_visible = node.visible;
        }
    }

    fn stop(&mut self, scene: &mut Scene) {
        if let Some(node) = resolve(&self.base, scene) {
            node.visible = self.original_visible;
        }
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if self.is_done() {
            return;
        }
        let slice = 1.0 / self.times as f32;
        let m = t % slice;
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.visible = m > slice / 2.0;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Blink::new(self.base.duration(), self.times))
    }
}

// ============================================================================
// Opacity
// ============================================================================

/// Fades the target in, from fully transparent to fully opaque.
#[derive(Clone)]
pub struct FadeIn {
    base: IntervalState,
}

impl FadeIn {
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            base: IntervalState::new(duration),
        }
    }
}

impl Action for FadeIn {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, _scene: &mut Scene) {
        self.base.start(target);
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.opacity = (255.0 * t) as u8;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(FadeOut::new(self.base.duration()))
    }
}

/// Fades the target out, from fully opaque to fully transparent.
#[derive(Clone)]
pub struct FadeOut {
    base: IntervalState,
}

impl FadeOut {
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            base: IntervalState::new(duration),
        }
    }
}

impl Action for FadeOut {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, _scene: &mut Scene) {
        self.base.start(target);
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.opacity = (255.0 * (1.0 - t)) as u8;
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(FadeIn::new(self.base.duration()))
    }
}

/// Fades the target's opacity to an absolute value.
#[derive(Clone)]
pub struct FadeTo {
    base: IntervalState,
    end_opacity: u8,
    start_opacity: u8,
}

impl FadeTo {
    #[must_use]
    pub fn new(duration: f32, end_opacity: u8) -> Self {
        Self {
            base: IntervalState::new(duration),
            end_opacity,
            start_opacity: 255,
        }
    }
}

impl Action for FadeTo {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_opacity = node.opacity;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        if let Some(node) = resolve(&self.base, ctx.scene) {
            let from = f32::from(self.start_opacity);
            let to = f32::from(self.end_opacity);
            node.opacity = (from + (to - from) * t) as u8;
        }
    }
}

// ============================================================================
// Color
// ============================================================================

/// Tints the target's color to an absolute value.
#[derive(Clone)]
pub struct TintTo {
    base: IntervalState,
    end_color: Color,
    start_color: Color,
}

impl TintTo {
    #[must_use]
    pub fn new(duration: f32, end_color: Color) -> Self {
        Self {
            base: IntervalState::new(duration),
            end_color,
            start_color: Color::WHITE,
        }
    }
}

impl Action for TintTo {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_color = node.color;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let lerp = |from: u8, to: u8| -> u8 {
            let from = f32::from(from);
            let to = f32::from(to);
            (from + (to - from) * t) as u8
        };
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.color = Color::new(
                lerp(self.start_color.r, self.end_color.r),
                lerp(self.start_color.g, self.end_color.g),
                lerp(self.start_color.b, self.end_color.b),
            );
        }
    }
}

/// Tints the target's color by signed per-channel deltas.
#[derive(Clone)]
pub struct TintBy {
    base: IntervalState,
    delta_r: i16,
    delta_g: i16,
    delta_b: i16,
    start_color: Color,
}

impl TintBy {
    #[must_use]
    pub fn new(duration: f32, delta_r: i16, delta_g: i16, delta_b: i16) -> Self {
        Self {
            base: IntervalState::new(duration),
            delta_r,
            delta_g,
            delta_b,
            start_color: Color::WHITE,
        }
    }
}

impl Action for TintBy {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.base.start(target);
        if let Some(node) = scene.get_node(target) {
            self.start_color = node.color;
        }
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let shift = |from: u8, delta: i16| -> u8 {
            (f32::from(from) + f32::from(delta) * t).clamp(0.0, 255.0) as u8
        };
        if let Some(node) = resolve(&self.base, ctx.scene) {
            node.color = Color::new(
                shift(self.start_color.r, self.delta_r),
                shift(self.start_color.g, self.delta_g),
                shift(self.start_color.b, self.delta_b),
            );
        }
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(TintBy::new(
            self.base.duration(),
            -self.delta_r,
            -self.delta_g,
            -self.delta_b,
        ))
    }
}

// ============================================================================
// Scalar callback tween
// ============================================================================

/// Interpolates a bare scalar and hands each value to a callback.
///
/// Escape hatch for animating anything the built-in tweens do not cover.
/// Clones share the callback, like [`CallFunc`](crate::action::instant::CallFunc).
#[derive(Clone)]
pub struct ActionFloat {
    base: IntervalState,
    from: f32,
    to: f32,
    callback: Rc<dyn Fn(f32, NodeHandle, &mut ActionCtx<'_>)>,
}

impl ActionFloat {
    #[must_use]
    pub fn new(
        duration: f32,
        from: f32,
        to: f32,
        callback: impl Fn(f32, &mut ActionCtx<'_>) + 'static,
    ) -> Self {
        Self {
            base: IntervalState::new(duration),
            from,
            to,
            callback: Rc::new(move |value, _, ctx| callback(value, ctx)),
        }
    }

    /// Like [`ActionFloat::new`], but the callback also receives the bound
    /// target, so one setter closure can serve several nodes.
    #[must_use]
    pub fn with_node(
        duration: f32,
        from: f32,
        to: f32,
        callback: impl Fn(f32, NodeHandle, &mut ActionCtx<'_>) + 'static,
    ) -> Self {
        Self {
            base: IntervalState::new(duration),
            from,
            to,
            callback: Rc::new(callback),
        }
    }
}

impl Action for ActionFloat {
    interval_action_boilerplate!();

    fn start(&mut self, target: NodeHandle, _scene: &mut Scene) {
        self.base.start(target);
    }

    fn stop(&mut self, _scene: &mut Scene) {
        self.base.stop();
    }

    fn step(&mut self, t: f32, ctx: &mut ActionCtx<'_>) {
        let Some(target) = self.base.target() else { return };
        let value = self.from + (self.to - self.from) * t;
        (self.callback)(value, target, ctx);
    }

    fn reversed(&self) -> Box<dyn Action> {
        Box::new(Self {
            base: IntervalState::new(self.base.duration()),
            from: self.to,
            to: self.from,
            callback: Rc::clone(&self.callback),
        })
    }
}
