//! Action Core Tests
//!
//! Tests for:
//! - Interval time base (first-tick absorption, zero-duration flooring)
//! - Instant actions (visibility, placement, flips, removal, callbacks)
//! - Leaf tweens (move/rotate/scale/skew/resize/jump/bezier/fade/tint)
//! - Sprite frame playback (Animation validation, Animate stepping)
//! - clone independence and by-delta reversal

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use kinema::{
    Action, ActionCtx, ActionFloat, ActionOps, Animate, Animation, BezierBy, BezierConfig, Blink,
    CallFunc, DelayTime, FadeIn, FadeOut, FadeTo, FlipX, Hide, JumpBy, KinemaError, MoveBy, MoveTo,
    Node, NodeHandle, Place, RemoveSelf, ResizeBy, RotateBy, RotateTo, ScaleBy, Scene, Show,
    SkewBy, SkewTo, TintBy, TintTo, ToggleVisibility,
};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec2, b: Vec2) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}

fn scene_with_node() -> (Scene, NodeHandle) {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new());
    (scene, handle)
}

/// Steps a standalone action with wall-clock ticks. The leading `0.0` tick
/// is absorbed as the first tick, so subsequent ticks advance elapsed time
/// one-to-one.
fn drive(action: &mut dyn Action, scene: &mut Scene, ticks: &[f32]) {
    let mut ops = ActionOps::default();
    for &dt in ticks {
        let mut ctx = ActionCtx::new(scene, &mut ops);
        action.update(dt, &mut ctx);
    }
}

// ============================================================================
// Interval time base
// ============================================================================

#[test]
fn interval_done_after_full_duration() {
    let (mut scene, node) = scene_with_node();
    let mut delay = DelayTime::new(1.0);
    delay.start(node, &mut scene);
    drive(&mut delay, &mut scene, &[0.0, 0.4]);
    assert!(!delay.is_done());
    drive(&mut delay, &mut scene, &[0.6]);
    assert!(delay.is_done());
    assert!(delay.elapsed() >= delay.duration());
}

#[test]
fn zero_duration_interval_done_on_first_real_tick() {
    let (mut scene, node) = scene_with_node();
    let mut delay = DelayTime::new(0.0);
    assert!(delay.duration() > 0.0, "duration is floored, never zero");
    delay.start(node, &mut scene);
    drive(&mut delay, &mut scene, &[0.0, 0.001]);
    assert!(delay.is_done());
}

#[test]
fn first_tick_is_absorbed() {
    let (mut scene, node) = scene_with_node();
    let mut action = MoveBy::new(1.0, Vec2::new(100.0, 0.0));
    action.start(node, &mut scene);
    // A huge first tick must not jump the action forward.
    drive(&mut action, &mut scene, &[10.0]);
    assert!(approx(action.elapsed(), 0.0));
    assert!(approx_vec(scene.get_node(node).unwrap().position, Vec2::ZERO));
}

// ============================================================================
// Instant actions
// ============================================================================

#[test]
fn show_hide_toggle() {
    let (mut scene, node) = scene_with_node();

    let mut hide = Hide::new();
    hide.start(node, &mut scene);
    drive(&mut hide, &mut scene, &[0.0]);
    assert!(!scene.get_node(node).unwrap().visible);
    assert!(hide.is_done());

    let mut show = Show::new();
    show.start(node, &mut scene);
    drive(&mut show, &mut scene, &[0.0]);
    assert!(scene.get_node(node).unwrap().visible);

    let mut toggle = ToggleVisibility::new();
    toggle.start(node, &mut scene);
    drive(&mut toggle, &mut scene, &[0.0]);
    assert!(!scene.get_node(node).unwrap().visible);
}

#[test]
fn place_teleports() {
    let (mut scene, node) = scene_with_node();
    let mut place = Place::new(Vec2::new(7.0, -3.0));
    place.start(node, &mut scene);
    drive(&mut place, &mut scene, &[0.0]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(7.0, -3.0)
    ));
}

#[test]
fn flip_requires_sprite_capability() {
    let mut scene = Scene::new();
    let sprite = scene.add_node(Node::with_sprite());
    let mut flip = FlipX::new(true);
    flip.start(sprite, &mut scene);
    drive(&mut flip, &mut scene, &[0.0]);
    assert!(scene.get_node(sprite).unwrap().sprite.unwrap().flip_x);
}

#[test]
#[should_panic(expected = "sprite-capable")]
fn flip_on_plain_node_panics() {
    let (mut scene, node) = scene_with_node();
    let mut flip = FlipX::new(true);
    flip.start(node, &mut scene);
    drive(&mut flip, &mut scene, &[0.0]);
}

#[test]
fn remove_self_removes_node() {
    let (mut scene, node) = scene_with_node();
    let mut remove = RemoveSelf::new();
    remove.start(node, &mut scene);
    drive(&mut remove, &mut scene, &[0.0]);
    assert!(!scene.contains(node));
}

#[test]
fn call_func_fires_with_target() {
    let (mut scene, node) = scene_with_node();
    let fired = Rc::new(Cell::new(None));
    let mut call = CallFunc::with_node({
        let fired = Rc::clone(&fired);
        move |target, _ctx| fired.set(Some(target))
    });
    call.start(node, &mut scene);
    drive(&mut call, &mut scene, &[0.0]);
    assert_eq!(fired.get(), Some(node));
}

// ============================================================================
// Position tweens
// ============================================================================

#[test]
fn move_by_interpolates_and_finishes() {
    let (mut scene, node) = scene_with_node();
    let mut action = MoveBy::new(1.0, Vec2::new(100.0, 50.0));
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.5]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(50.0, 25.0)
    ));
    drive(&mut action, &mut scene, &[0.5]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(100.0, 50.0)
    ));
    assert!(action.is_done());
}

#[test]
fn move_to_reaches_absolute_position() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().position = Vec2::new(40.0, 40.0);
    let mut action = MoveTo::new(1.0, Vec2::new(100.0, 0.0));
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.5]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(70.0, 20.0)
    ));
    drive(&mut action, &mut scene, &[0.5]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(100.0, 0.0)
    ));
}

#[test]
fn concurrent_move_by_actions_stack() {
    let (mut scene, node) = scene_with_node();
    let mut a = MoveBy::new(1.0, Vec2::new(100.0, 0.0));
    let mut b = MoveBy::new(1.0, Vec2::new(0.0, 60.0));
    a.start(node, &mut scene);
    b.start(node, &mut scene);
    for dt in [0.0, 0.5, 0.5] {
        drive(&mut a, &mut scene, &[dt]);
        drive(&mut b, &mut scene, &[dt]);
    }
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(100.0, 60.0)
    ));
}

#[test]
fn move_by_double_reverse_matches_original() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new());
    let b = scene.add_node(Node::new());
    let original = MoveBy::new(1.0, Vec2::new(30.0, -10.0));
    let mut round_trip = original.reversed().reversed();
    let mut original: Box<dyn Action> = Box::new(original);
    original.start(a, &mut scene);
    round_trip.start(b, &mut scene);
    for dt in [0.0, 0.25, 0.25, 0.5] {
        drive(original.as_mut(), &mut scene, &[dt]);
        drive(round_trip.as_mut(), &mut scene, &[dt]);
        let pa = scene.get_node(a).unwrap().position;
        let pb = scene.get_node(b).unwrap().position;
        assert!(approx_vec(pa, pb), "diverged: {pa:?} vs {pb:?}");
    }
}

#[test]
fn dangling_target_steps_are_noops_but_action_completes() {
    let (mut scene, node) = scene_with_node();
    let mut action = MoveBy::new(1.0, Vec2::new(100.0, 0.0));
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.5]);
    scene.remove_node(node);
    drive(&mut action, &mut scene, &[0.5]);
    assert!(action.is_done());
}

// ============================================================================
// Rotation, scale, skew, size
// ============================================================================

#[test]
fn rotate_by_adds_degrees() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().rotation = 30.0;
    let mut action = RotateBy::new(1.0, 90.0);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    assert!(approx(scene.get_node(node).unwrap().rotation, 120.0));
}

#[test]
fn rotate_to_takes_shortest_arc() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().rotation = 10.0;
    let mut action = RotateTo::new(1.0, 350.0);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    // 20 degrees backwards, not 340 forwards.
    assert!(approx(scene.get_node(node).unwrap().rotation, -10.0));
}

#[test]
fn scale_by_multiplies() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().scale = Vec2::new(2.0, 2.0);
    let mut action = ScaleBy::new(1.0, Vec2::new(3.0, 0.5));
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().scale,
        Vec2::new(6.0, 1.0)
    ));
}

#[test]
fn scale_by_reverse_divides() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().scale = Vec2::new(4.0, 4.0);
    let mut reversed = ScaleBy::new(1.0, Vec2::new(2.0, 2.0)).reversed();
    reversed.start(node, &mut scene);
    drive(reversed.as_mut(), &mut scene, &[0.0, 1.0]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().scale,
        Vec2::new(2.0, 2.0)
    ));
}

#[test]
fn skew_tweens() {
    let (mut scene, node) = scene_with_node();
    let mut by = SkewBy::new(1.0, Vec2::new(10.0, -5.0));
    by.start(node, &mut scene);
    drive(&mut by, &mut scene, &[0.0, 1.0]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().skew,
        Vec2::new(10.0, -5.0)
    ));

    let mut to = SkewTo::new(1.0, Vec2::new(45.0, 0.0));
    to.start(node, &mut scene);
    drive(&mut to, &mut scene, &[0.0, 0.5]);
    let skew = scene.get_node(node).unwrap().skew;
    assert!(approx(skew.x, 27.5));
    assert!(approx(skew.y, -2.5));
}

#[test]
fn resize_by_grows_content_size() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().content_size = Vec2::new(10.0, 10.0);
    let mut action = ResizeBy::new(1.0, Vec2::new(30.0, 10.0));
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.5]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().content_size,
        Vec2::new(25.0, 15.0)
    ));
}

// ============================================================================
// Jump and bezier
// ============================================================================

#[test]
fn jump_by_peaks_mid_hop_and_lands_on_delta() {
    let (mut scene, node) = scene_with_node();
    let mut action = JumpBy::new(1.0, Vec2::new(100.0, 0.0), 50.0, 1);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.5]);
    let mid = scene.get_node(node).unwrap().position;
    assert!(approx(mid.x, 50.0));
    assert!(approx(mid.y, 50.0), "parabola apex at half duration");
    drive(&mut action, &mut scene, &[0.5]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(100.0, 0.0)
    ));
}

#[test]
fn bezier_by_lands_on_endpoint() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().position = Vec2::new(5.0, 5.0);
    let config = BezierConfig {
        control1: Vec2::new(0.0, 50.0),
        control2: Vec2::new(100.0, 50.0),
        end: Vec2::new(100.0, 0.0),
    };
    let mut action = BezierBy::new(1.0, config);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    assert!(approx_vec(
        scene.get_node(node).unwrap().position,
        Vec2::new(105.0, 5.0)
    ));
}

// ============================================================================
// Visibility, opacity, color
// ============================================================================

#[test]
fn blink_restores_visibility_on_stop() {
    let (mut scene, node) = scene_with_node();
    let mut action = Blink::new(1.0, 4);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.2]);
    action.stop(&mut scene);
    assert!(scene.get_node(node).unwrap().visible);
}

#[test]
fn fade_in_out_are_each_others_reverse() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().opacity = 0;

    let mut fade_in = FadeIn::new(1.0);
    fade_in.start(node, &mut scene);
    drive(&mut fade_in, &mut scene, &[0.0, 1.0]);
    assert_eq!(scene.get_node(node).unwrap().opacity, 255);

    let mut fade_out = fade_in.reversed();
    fade_out.start(node, &mut scene);
    drive(fade_out.as_mut(), &mut scene, &[0.0, 1.0]);
    assert_eq!(scene.get_node(node).unwrap().opacity, 0);

    let mut back_in = FadeOut::new(1.0).reversed();
    back_in.start(node, &mut scene);
    drive(back_in.as_mut(), &mut scene, &[0.0, 1.0]);
    assert_eq!(scene.get_node(node).unwrap().opacity, 255);
}

#[test]
fn fade_to_interpolates_from_current_opacity() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().opacity = 100;
    let mut action = FadeTo::new(1.0, 200);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.5]);
    assert_eq!(scene.get_node(node).unwrap().opacity, 150);
}

#[test]
fn tint_to_reaches_color() {
    let (mut scene, node) = scene_with_node();
    let mut action = TintTo::new(1.0, kinema::Color::new(255, 0, 0));
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    assert_eq!(scene.get_node(node).unwrap().color, kinema::Color::new(255, 0, 0));
}

#[test]
fn tint_by_clamps_channels() {
    let (mut scene, node) = scene_with_node();
    scene.get_node_mut(node).unwrap().color = kinema::Color::new(10, 200, 255);
    let mut action = TintBy::new(1.0, -50, 40, 10);
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    assert_eq!(
        scene.get_node(node).unwrap().color,
        kinema::Color::new(0, 240, 255)
    );
}

// ============================================================================
// Scalar callback tween
// ============================================================================

#[test]
fn action_float_reports_interpolated_values() {
    let (mut scene, node) = scene_with_node();
    let last = Rc::new(Cell::new(f32::NAN));
    let mut action = ActionFloat::new(2.0, 10.0, 20.0, {
        let last = Rc::clone(&last);
        move |value, _ctx| last.set(value)
    });
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 1.0]);
    assert!(approx(last.get(), 15.0));
    drive(&mut action, &mut scene, &[1.0]);
    assert!(approx(last.get(), 20.0));
    assert!(action.is_done());
}

#[test]
fn action_float_with_node_reports_its_target() {
    let (mut scene, node) = scene_with_node();
    let seen = Rc::new(Cell::new(None));
    let mut action = ActionFloat::with_node(1.0, 0.0, 1.0, {
        let seen = Rc::clone(&seen);
        move |value, target, _ctx| seen.set(Some((value, target)))
    });
    action.start(node, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.25]);
    let (value, target) = seen.get().expect("callback fired");
    assert!(approx(value, 0.25));
    assert_eq!(target, node);
}

// ============================================================================
// Sprite frame playback
// ============================================================================

#[test]
fn animation_rejects_bad_input() {
    assert!(matches!(
        Animation::from_frames(vec![], 0.1),
        Err(KinemaError::EmptyAnimation)
    ));
    assert!(matches!(
        Animation::from_frames(vec![1, 2], 0.0),
        Err(KinemaError::InvalidFrameDelay(_))
    ));
}

#[test]
fn animate_walks_frames_in_order() {
    let mut scene = Scene::new();
    let sprite = scene.add_node(Node::with_sprite());
    let animation = Animation::from_frames(vec![3, 4, 5, 6], 0.25).unwrap();
    let mut action = Animate::new(animation);
    assert!(approx(action.duration(), 1.0));
    action.start(sprite, &mut scene);

    drive(&mut action, &mut scene, &[0.0, 0.3]);
    assert_eq!(scene.get_node(sprite).unwrap().sprite.unwrap().frame, 4);
    drive(&mut action, &mut scene, &[0.5]);
    assert_eq!(scene.get_node(sprite).unwrap().sprite.unwrap().frame, 6);
    drive(&mut action, &mut scene, &[0.2]);
    assert!(action.is_done());
    assert_eq!(scene.get_node(sprite).unwrap().sprite.unwrap().frame, 6);
}

#[test]
fn animate_restores_original_frame_on_stop() {
    let mut scene = Scene::new();
    let sprite = scene.add_node(Node::with_sprite());
    scene.get_node_mut(sprite).unwrap().sprite_mut().frame = 9;
    let animation = Animation::from_frames(vec![0, 1], 0.5)
        .unwrap()
        .restoring_original_frame();
    let mut action = Animate::new(animation);
    action.start(sprite, &mut scene);
    drive(&mut action, &mut scene, &[0.0, 0.6]);
    assert_eq!(scene.get_node(sprite).unwrap().sprite.unwrap().frame, 1);
    action.stop(&mut scene);
    assert_eq!(scene.get_node(sprite).unwrap().sprite.unwrap().frame, 9);
}

// ============================================================================
// Cloning
// ============================================================================

#[test]
fn clone_runs_independently() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new());
    let b = scene.add_node(Node::new());
    let mut original: Box<dyn Action> = Box::new(MoveBy::new(1.0, Vec2::new(10.0, 0.0)));
    let mut copy = original.clone();

    original.start(a, &mut scene);
    drive(original.as_mut(), &mut scene, &[0.0, 1.0]);

    copy.start(b, &mut scene);
    drive(copy.as_mut(), &mut scene, &[0.0, 1.0]);

    assert!(approx_vec(
        scene.get_node(a).unwrap().position,
        Vec2::new(10.0, 0.0)
    ));
    assert!(approx_vec(
        scene.get_node(b).unwrap().position,
        Vec2::new(10.0, 0.0)
    ));
}
