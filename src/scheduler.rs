//! Cooperative per-frame job driver.
//!
//! Two independent job kinds run inside one single-threaded `update` call:
//! [`UpdateJob`]s fire once per frame in ascending priority order, and
//! [`TimedJob`]s fire on a delay/interval/repeat schedule, possibly several
//! times in one frame when frames drop. A mutex-guarded [`MainThreadQueue`]
//! marshals closures from other threads onto the scheduler's thread, so no
//! job logic ever runs concurrently with `update`.
//!
//! The same deferred-mutation discipline as the action manager applies:
//! callbacks schedule and unschedule through a [`SchedulerCtx`], whose
//! requests are buffered and applied after the pass. Nothing added during a
//! frame runs before the next one.

use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::scene::{NodeHandle, Scene};

/// Timed-job id sentinel that never collides and never replaces: a target
/// may carry any number of jobs scheduled under this id.
pub const JOB_ID_ANY: i32 = -1;

type JobCallback = Rc<dyn Fn(f32, &mut SchedulerCtx<'_>)>;
type MainThreadFn = Box<dyn FnOnce(&mut SchedulerCtx<'_>) + Send>;

// ============================================================================
// Jobs
// ============================================================================

/// A per-frame callback, unique per target, ordered by priority.
///
/// Lower priority numbers run first. Scheduling a second update job for the
/// same target replaces the first.
#[derive(Clone)]
pub struct UpdateJob {
    target: NodeHandle,
    priority: i32,
    paused: bool,
    callback: JobCallback,
}

impl UpdateJob {
    #[must_use]
    pub fn new(target: NodeHandle, callback: impl Fn(f32, &mut SchedulerCtx<'_>) + 'static) -> Self {
        Self {
            target,
            priority: 0,
            paused: false,
            callback: Rc::new(callback),
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    #[inline]
    fn key(&self) -> (i32, NodeHandle) {
        (self.priority, self.target)
    }
}

/// A delayed, repeating callback keyed by `(target, id)`.
///
/// Defaults: no delay, zero interval (fire once per frame), run forever,
/// not paused. A non-negative `id` replaces any job already scheduled under
/// the same key; [`JOB_ID_ANY`] allows unlimited jobs per target.
#[derive(Clone)]
pub struct TimedJob {
    target: NodeHandle,
    id: i32,
    interval: f32,
    delay: f32,
    repeat: Option<u32>,
    paused: bool,
    callback: JobCallback,
}

impl TimedJob {
    #[must_use]
    pub fn new(
        target: NodeHandle,
        id: i32,
        callback: impl Fn(f32, &mut SchedulerCtx<'_>) + 'static,
    ) -> Self {
        Self {
            target,
            id,
            interval: 0.0,
            delay: 0.0,
            repeat: None,
            paused: false,
            callback: Rc::new(callback),
        }
    }

    /// Seconds between fires. Zero means once per frame.
    #[must_use]
    pub fn interval(mut self, interval: f32) -> Self {
        self.interval = interval;
        self
    }

    /// Seconds to wait before the first fire.
    #[must_use]
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Number of additional fires after the first; the job fires
    /// `repeat + 1` times in total, then unschedules itself.
    #[must_use]
    pub fn repeat(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Never stops firing until explicitly unscheduled. This is the default.
    #[must_use]
    pub fn forever(mut self) -> Self {
        self.repeat = None;
        self
    }

    #[must_use]
    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }
}

// ============================================================================
// Deferred commands and callback context
// ============================================================================

enum SchedulerCommand {
    ScheduleUpdate(UpdateJob),
    ScheduleTimed(TimedJob),
    UnscheduleUpdate(NodeHandle),
    UnscheduleTimed(NodeHandle, i32),
    UnscheduleAllForTarget(NodeHandle),
}

#[derive(Default)]
struct SchedulerOps {
    commands: SmallVec<[SchedulerCommand; 4]>,
}

/// What a job callback may touch: the scene, plus deferred scheduler
/// operations applied after the current pass.
pub struct SchedulerCtx<'a> {
    pub scene: &'a mut Scene,
    ops: &'a mut SchedulerOps,
}

impl<'a> SchedulerCtx<'a> {
    fn new(scene: &'a mut Scene, ops: &'a mut SchedulerOps) -> Self {
        Self { scene, ops }
    }

    pub fn schedule_update(&mut self, job: UpdateJob) {
        self.ops.commands.push(SchedulerCommand::ScheduleUpdate(job));
    }

    pub fn schedule_timed(&mut self, job: TimedJob) {
        self.ops.commands.push(SchedulerCommand::ScheduleTimed(job));
    }

    pub fn unschedule_update(&mut self, target: NodeHandle) {
        self.ops
            .commands
            .push(SchedulerCommand::UnscheduleUpdate(target));
    }

    pub fn unschedule_timed(&mut self, target: NodeHandle, id: i32) {
        self.ops
            .commands
            .push(SchedulerCommand::UnscheduleTimed(target, id));
    }

    pub fn unschedule_all_for_target(&mut self, target: NodeHandle) {
        self.ops
            .commands
            .push(SchedulerCommand::UnscheduleAllForTarget(target));
    }
}

// ============================================================================
// Cross-thread queue
// ============================================================================

/// Clonable handle marshaling closures onto the scheduler's thread.
///
/// Pushed closures run exactly once, during the next `update`, on the thread
/// driving the scheduler. The lock is held only for the push and for a
/// buffer swap, never while a closure runs.
#[derive(Clone, Default)]
pub struct MainThreadQueue {
    inner: Arc<Mutex<Vec<MainThreadFn>>>,
}

impl MainThreadQueue {
    pub fn push(&self, f: impl FnOnce(&mut SchedulerCtx<'_>) + Send + 'static) {
        self.inner.lock().push(Box::new(f));
    }

    fn drain(&self) -> Vec<MainThreadFn> {
        std::mem::take(&mut *self.inner.lock())
    }
}

// ============================================================================
// Scheduler
// ============================================================================

struct UpdateEntry {
    job: UpdateJob,
    unscheduled: bool,
}

struct TimedEntry {
    job: TimedJob,
    /// Time accumulator. Starts at `-delay` and counts up; once
    /// non-negative, whole intervals are consumed from it.
    leftover: f32,
    /// Fires left, delay fire included. `None` runs forever.
    remaining: Option<u32>,
    unscheduled: bool,
}

impl TimedEntry {
    fn new(job: TimedJob) -> Self {
        let leftover = -job.delay;
        let remaining = job.repeat.map(|r| r + 1);
        Self {
            job,
            leftover,
            remaining,
            unscheduled: false,
        }
    }

    #[inline]
    fn key(&self) -> (NodeHandle, i32) {
        (self.job.target, self.job.id)
    }

    fn fire(&mut self, dt: f32, ctx: &mut SchedulerCtx<'_>) {
        (self.job.callback)(dt, ctx);
        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
            if *remaining == 0 {
                self.unscheduled = true;
            }
        }
    }

    fn advance(&mut self, dt: f32, ctx: &mut SchedulerCtx<'_>) {
        let mut dt = dt;
        if self.leftover < 0.0 {
            self.leftover += dt;
            if self.leftover < 0.0 {
                return;
            }
            // Delay just expired. Fire immediately; the frame time past the
            // expiry point feeds the interval accumulator.
            dt = self.leftover;
            self.leftover = 0.0;
            self.fire(0.0, ctx);
            if self.unscheduled {
                return;
            }
        }
        if self.job.interval <= 0.0 {
            self.fire(dt, ctx);
            return;
        }
        self.leftover += dt;
        while self.leftover >= self.job.interval && !self.unscheduled {
            self.leftover -= self.job.interval;
            self.fire(self.job.interval, ctx);
        }
    }
}

/// Drives update and timed jobs once per frame.
///
/// Job lists are double-buffered (live plus pending) so mid-pass scheduling
/// never mutates the list being iterated.
pub struct Scheduler {
    time_scale: f32,
    update_jobs: Vec<UpdateEntry>,
    update_pending: Vec<UpdateEntry>,
    timed_jobs: Vec<TimedEntry>,
    timed_pending: Vec<TimedEntry>,
    queue: MainThreadQueue,
    ops: SchedulerOps,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            update_jobs: Vec::new(),
            update_pending: Vec::new(),
            timed_jobs: Vec::new(),
            timed_pending: Vec::new(),
            queue: MainThreadQueue::default(),
            ops: SchedulerOps::default(),
        }
    }

    /// Global multiplier applied to every incoming `dt`.
    #[inline]
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    /// Schedules a per-frame job, replacing any existing update job for the
    /// same target. The job first fires on the next frame.
    pub fn schedule_update(&mut self, job: UpdateJob) {
        log::trace!(
            "schedule_update target={:?} priority={}",
            job.target,
            job.priority
        );
        self.unschedule_update(job.target);
        let key = job.key();
        let index = self.update_pending.partition_point(|e| e.job.key() <= key);
        self.update_pending.insert(
            index,
            UpdateEntry {
                job,
                unscheduled: false,
            },
        );
    }

    /// Schedules a timed job. A non-negative id replaces an existing job
    /// under the same `(target, id)` key; [`JOB_ID_ANY`] always adds.
    pub fn schedule_timed(&mut self, job: TimedJob) {
        log::trace!("schedule_timed target={:?} id={}", job.target, job.id);
        if job.id != JOB_ID_ANY {
            self.unschedule_timed(job.target, job.id);
        }
        let entry = TimedEntry::new(job);
        let key = entry.key();
        let index = self.timed_pending.partition_point(|e| e.key() <= key);
        self.timed_pending.insert(index, entry);
    }

    /// Marks the target's update job for removal at the end of the frame.
    pub fn unschedule_update(&mut self, target: NodeHandle) {
        for entries in [&mut self.update_jobs, &mut self.update_pending] {
            for entry in entries.iter_mut() {
                if entry.job.target == target {
                    entry.unscheduled = true;
                }
            }
        }
    }

    /// Marks timed jobs under `(target, id)` for removal. Jobs scheduled
    /// with [`JOB_ID_ANY`] are matched by passing [`JOB_ID_ANY`] back.
    pub fn unschedule_timed(&mut self, target: NodeHandle, id: i32) {
        for entries in [&mut self.timed_jobs, &mut self.timed_pending] {
            for entry in entries.iter_mut() {
                if entry.job.target == target && entry.job.id == id {
                    entry.unscheduled = true;
                }
            }
        }
    }

    /// Unschedules every job, of both kinds, bound to `target`.
    pub fn unschedule_all_for_target(&mut self, target: NodeHandle) {
        self.unschedule_update(target);
        for entries in [&mut self.timed_jobs, &mut self.timed_pending] {
            for entry in entries.iter_mut() {
                if entry.job.target == target {
                    entry.unscheduled = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Pause
    // ------------------------------------------------------------------------

    pub fn pause_all_jobs(&mut self) {
        self.set_paused_matching(|_| true, true);
    }

    pub fn resume_all_jobs(&mut self) {
        self.set_paused_matching(|_| true, false);
    }

    pub fn pause_jobs_for_target(&mut self, target: NodeHandle) {
        self.set_paused_matching(|t| t == target, true);
    }

    pub fn resume_jobs_for_target(&mut self, target: NodeHandle) {
        self.set_paused_matching(|t| t == target, false);
    }

    fn set_paused_matching(&mut self, matches: impl Fn(NodeHandle) -> bool, paused: bool) {
        for entries in [&mut self.update_jobs, &mut self.update_pending] {
            for entry in entries.iter_mut() {
                if matches(entry.job.target) {
                    entry.job.paused = paused;
                }
            }
        }
        for entries in [&mut self.timed_jobs, &mut self.timed_pending] {
            for entry in entries.iter_mut() {
                if matches(entry.job.target) {
                    entry.job.paused = paused;
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Cross-thread marshaling
    // ------------------------------------------------------------------------

    /// Handle other threads use to push work onto this scheduler's thread.
    #[must_use]
    pub fn main_thread_queue(&self) -> MainThreadQueue {
        self.queue.clone()
    }

    /// Runs `f` on the scheduler's thread during the next `update`.
    pub fn perform_on_main_thread(&self, f: impl FnOnce(&mut SchedulerCtx<'_>) + Send + 'static) {
        self.queue.push(f);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Number of scheduled (not yet unscheduled) timed jobs for `target`.
    #[must_use]
    pub fn timed_jobs_for_target_count(&self, target: NodeHandle) -> usize {
        [&self.timed_jobs, &self.timed_pending]
            .into_iter()
            .flatten()
            .filter(|e| e.job.target == target && !e.unscheduled)
            .count()
    }

    #[must_use]
    pub fn has_update_job_for_target(&self, target: NodeHandle) -> bool {
        [&self.update_jobs, &self.update_pending]
            .into_iter()
            .flatten()
            .any(|e| e.job.target == target && !e.unscheduled)
    }

    // ------------------------------------------------------------------------
    // Frame step
    // ------------------------------------------------------------------------

    /// Runs one frame: update jobs by ascending priority, then timed jobs,
    /// then the cross-thread queue; finally applies deferred requests and
    /// merges newly scheduled jobs for the next frame.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let dt = dt * self.time_scale;

        for entry in &mut self.update_jobs {
            if entry.unscheduled || entry.job.paused {
                continue;
            }
            let mut ctx = SchedulerCtx::new(scene, &mut self.ops);
            (entry.job.callback)(dt, &mut ctx);
        }

        for entry in &mut self.timed_jobs {
            if entry.unscheduled || entry.job.paused {
                continue;
            }
            let mut ctx = SchedulerCtx::new(scene, &mut self.ops);
            entry.advance(dt, &mut ctx);
        }

        for f in self.queue.drain() {
            let mut ctx = SchedulerCtx::new(scene, &mut self.ops);
            f(&mut ctx);
        }

        self.apply_commands();

        self.update_jobs.retain(|e| !e.unscheduled);
        self.timed_jobs.retain(|e| !e.unscheduled);

        let pending = std::mem::take(&mut self.update_pending);
        for entry in pending {
            if !entry.unscheduled {
                let key = entry.job.key();
                let index = self.update_jobs.partition_point(|e| e.job.key() <= key);
                self.update_jobs.insert(index, entry);
            }
        }
        let pending = std::mem::take(&mut self.timed_pending);
        for entry in pending {
            if !entry.unscheduled {
                let key = entry.key();
                let index = self.timed_jobs.partition_point(|e| e.key() <= key);
                self.timed_jobs.insert(index, entry);
            }
        }
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.ops.commands);
        for command in commands {
            match command {
                SchedulerCommand::ScheduleUpdate(job) => self.schedule_update(job),
                SchedulerCommand::ScheduleTimed(job) => self.schedule_timed(job),
                SchedulerCommand::UnscheduleUpdate(target) => self.unschedule_update(target),
                SchedulerCommand::UnscheduleTimed(target, id) => {
                    self.unschedule_timed(target, id);
                }
                SchedulerCommand::UnscheduleAllForTarget(target) => {
                    self.unschedule_all_for_target(target);
                }
            }
        }
    }
}
