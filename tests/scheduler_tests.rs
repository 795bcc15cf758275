//! Scheduler Tests
//!
//! Tests for:
//! - UpdateJob priority ordering and replace-on-reschedule
//! - TimedJob delay/interval/repeat semantics, frame-drop catch-up
//! - Per-target and global pausing, time scaling
//! - Cross-thread marshaling through the main-thread queue
//! - Deferred scheduling from inside job callbacks

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kinema::{JOB_ID_ANY, Node, NodeHandle, Scene, Scheduler, TimedJob, UpdateJob};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene_with_node() -> (Scene, NodeHandle) {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new());
    (scene, handle)
}

fn counting_timed(
    target: NodeHandle,
    id: i32,
    counter: &Rc<Cell<u32>>,
) -> TimedJob {
    let counter = Rc::clone(counter);
    TimedJob::new(target, id, move |_dt, _ctx| counter.set(counter.get() + 1))
}

// ============================================================================
// Update jobs
// ============================================================================

#[test]
fn update_jobs_fire_in_ascending_priority_order() {
    init_logging();
    let mut scene = Scene::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();

    for priority in [5, -1, 0] {
        let target = scene.add_node(Node::new());
        let order = Rc::clone(&order);
        scheduler.schedule_update(
            UpdateJob::new(target, move |_dt, _ctx| order.borrow_mut().push(priority))
                .priority(priority),
        );
    }

    scheduler.update(0.016, &mut scene); // merge frame
    scheduler.update(0.016, &mut scene);
    assert_eq!(*order.borrow(), vec![-1, 0, 5]);
}

#[test]
fn rescheduling_an_update_job_replaces_it() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    for priority in [1, -3] {
        let fires = Rc::clone(&fires);
        scheduler.schedule_update(
            UpdateJob::new(node, move |_dt, _ctx| fires.set(fires.get() + 1))
                .priority(priority),
        );
    }

    scheduler.update(0.016, &mut scene);
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 1, "one job per target, replaced not duplicated");
}

#[test]
fn unscheduled_update_job_stops_firing() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    let counter = Rc::clone(&fires);
    scheduler.schedule_update(UpdateJob::new(node, move |_dt, _ctx| {
        counter.set(counter.get() + 1);
    }));
    scheduler.update(0.016, &mut scene);
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 1);
    assert!(scheduler.has_update_job_for_target(node));

    scheduler.unschedule_update(node);
    assert!(!scheduler.has_update_job_for_target(node));
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 1);
}

// ============================================================================
// Timed jobs
// ============================================================================

#[test]
fn delayed_repeating_job_catches_up_within_one_frame() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    scheduler.schedule_timed(
        counting_timed(node, 1, &fires)
            .delay(1.0)
            .interval(0.5)
            .repeat(2),
    );
    scheduler.update(0.0, &mut scene); // merge frame, no time passes

    // One dropped-frame-sized tick: the delay fire plus both repeats.
    scheduler.update(2.5, &mut scene);
    assert_eq!(fires.get(), 3);
    assert_eq!(scheduler.timed_jobs_for_target_count(node), 0);

    scheduler.update(2.5, &mut scene);
    assert_eq!(fires.get(), 3, "exhausted job never fires again");
}

#[test]
fn zero_interval_fires_once_per_frame() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    scheduler.schedule_timed(counting_timed(node, 1, &fires));
    scheduler.update(0.0, &mut scene);
    for _ in 0..3 {
        scheduler.update(5.0, &mut scene);
    }
    assert_eq!(fires.get(), 3, "frame-rate bound, not time bound");
}

#[test]
fn interval_job_fires_once_per_elapsed_interval() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    scheduler.schedule_timed(counting_timed(node, 1, &fires).interval(1.0));
    scheduler.update(0.0, &mut scene);

    scheduler.update(0.4, &mut scene);
    assert_eq!(fires.get(), 0);
    scheduler.update(0.7, &mut scene);
    assert_eq!(fires.get(), 1);
    scheduler.update(3.2, &mut scene);
    assert_eq!(fires.get(), 4, "dropped frame consumes several intervals");
}

#[test]
fn same_id_replaces_but_any_id_accumulates() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    scheduler.schedule_timed(counting_timed(node, 3, &fires));
    scheduler.schedule_timed(counting_timed(node, 3, &fires));
    assert_eq!(scheduler.timed_jobs_for_target_count(node), 1);

    scheduler.schedule_timed(counting_timed(node, JOB_ID_ANY, &fires));
    scheduler.schedule_timed(counting_timed(node, JOB_ID_ANY, &fires));
    assert_eq!(scheduler.timed_jobs_for_target_count(node), 3);

    scheduler.update(0.0, &mut scene);
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 3, "one keyed job plus two anonymous ones");
}

#[test]
fn unschedule_all_for_target_clears_both_kinds() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    let counter = Rc::clone(&fires);
    scheduler.schedule_update(UpdateJob::new(node, move |_dt, _ctx| {
        counter.set(counter.get() + 1);
    }));
    scheduler.schedule_timed(counting_timed(node, JOB_ID_ANY, &fires));
    scheduler.update(0.0, &mut scene);

    scheduler.unschedule_all_for_target(node);
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 0);
    assert!(!scheduler.has_update_job_for_target(node));
    assert_eq!(scheduler.timed_jobs_for_target_count(node), 0);
}

// ============================================================================
// Pause and time scale
// ============================================================================

#[test]
fn paused_target_jobs_do_not_fire_until_resumed() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    scheduler.schedule_timed(counting_timed(node, 1, &fires));
    scheduler.update(0.0, &mut scene);

    scheduler.pause_jobs_for_target(node);
    scheduler.update(0.016, &mut scene);
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 0);

    scheduler.resume_jobs_for_target(node);
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 1);
}

#[test]
fn time_scale_stretches_intervals() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();
    scheduler.set_time_scale(2.0);

    scheduler.schedule_timed(counting_timed(node, 1, &fires).interval(1.0));
    scheduler.update(0.0, &mut scene);

    // Each half-second frame counts double.
    scheduler.update(0.5, &mut scene);
    scheduler.update(0.5, &mut scene);
    assert_eq!(fires.get(), 2);
}

// ============================================================================
// Cross-thread marshaling
// ============================================================================

#[test]
fn main_thread_queue_runs_closures_exactly_once() {
    init_logging();
    let (mut scene, _node) = scene_with_node();
    let mut scheduler = Scheduler::new();
    let ran = Arc::new(AtomicUsize::new(0));

    let queue = scheduler.main_thread_queue();
    let worker = {
        let ran = Arc::clone(&ran);
        std::thread::spawn(move || {
            queue.push(move |_ctx| {
                ran.fetch_add(1, Ordering::SeqCst);
            });
        })
    };
    worker.join().expect("worker thread");

    scheduler.update(0.016, &mut scene);
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    scheduler.update(0.016, &mut scene);
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn queued_closure_can_mutate_the_scene_and_schedule() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    scheduler.perform_on_main_thread(move |ctx| {
        if let Some(n) = ctx.scene.get_node_mut(node) {
            n.visible = false;
        }
        ctx.unschedule_all_for_target(node);
    });
    scheduler.update(0.016, &mut scene);
    assert!(!scene.get_node(node).unwrap().visible);
    assert_eq!(fires.get(), 0);
}

// ============================================================================
// Deferred scheduling from callbacks
// ============================================================================

#[test]
fn job_scheduled_from_a_callback_first_fires_next_frame() {
    init_logging();
    let (mut scene, node) = scene_with_node();
    let fires = Rc::new(Cell::new(0u32));
    let mut scheduler = Scheduler::new();

    let inner_fires = Rc::clone(&fires);
    scheduler.schedule_timed(TimedJob::new(node, 1, move |_dt, ctx| {
        let inner_fires = Rc::clone(&inner_fires);
        ctx.schedule_timed(TimedJob::new(node, JOB_ID_ANY, move |_dt, _ctx| {
            inner_fires.set(inner_fires.get() + 1);
        }));
    }).repeat(0));
    scheduler.update(0.0, &mut scene);

    scheduler.update(0.016, &mut scene); // outer fires once, schedules inner
    assert_eq!(fires.get(), 0, "inner job must wait for the next frame");
    scheduler.update(0.016, &mut scene);
    assert_eq!(fires.get(), 1);
}
