//! Ownership and per-frame stepping of live action trees.

use rustc_hash::FxHashSet;

use crate::action::{Action, ActionCommand, ActionCtx, ActionOps, INVALID_TAG};
use crate::scene::{NodeHandle, Scene};

/// A root action tree owned by the manager, with its lookup identity.
struct ActionEntry {
    action: Box<dyn Action>,
    target: NodeHandle,
    tag: i32,
    flags: u32,
    stopped: bool,
}

impl ActionEntry {
    #[inline]
    fn key(&self) -> (NodeHandle, i32) {
        (self.target, self.tag)
    }
}

/// Inserts at the upper bound for `entry`'s key, so entries with colliding
/// keys keep their insertion order.
fn sorted_insert(entries: &mut Vec<ActionEntry>, entry: ActionEntry) {
    let key = entry.key();
    let index = entries.partition_point(|e| e.key() <= key);
    entries.insert(index, entry);
}

/// Index of the first entry for `target`, via binary search.
fn lower_bound(entries: &[ActionEntry], target: NodeHandle) -> usize {
    entries.partition_point(|e| e.target < target)
}

/// Owns every running action tree and steps each once per frame.
///
/// Two parallel collections, both sorted by `(target, tag)`: `live` is
/// iterated by [`update`], `pending` buffers additions. The split is the
/// safety property of the whole system: callbacks firing mid-frame submit
/// into `pending` (via [`ActionCtx`]), which is merged only after the step
/// pass, so the collection being iterated is never mutated under the loop
/// and nothing added during a frame runs before the next one.
///
/// [`update`]: ActionManager::update
#[derive(Default)]
pub struct ActionManager {
    live: Vec<ActionEntry>,
    pending: Vec<ActionEntry>,
    paused: FxHashSet<NodeHandle>,
    ops: ActionOps,
}

impl ActionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Takes ownership of an action tree and runs it on `target`, untagged.
    ///
    /// The action starts (snapshots its target state) now but takes its
    /// first step on the next [`update`](ActionManager::update).
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a live node.
    pub fn run_action(&mut self, target: NodeHandle, action: Box<dyn Action>, scene: &mut Scene) {
        self.run_action_with(target, action, INVALID_TAG, 0, scene);
    }

    /// Like [`run_action`](ActionManager::run_action), with an explicit tag
    /// and flags mask for later lookup and group stops.
    pub fn run_action_with(
        &mut self,
        target: NodeHandle,
        mut action: Box<dyn Action>,
        tag: i32,
        flags: u32,
        scene: &mut Scene,
    ) {
        assert!(
            scene.contains(target),
            "run_action requires a live target node"
        );
        log::trace!("run_action target={target:?} tag={tag}");
        action.start(target, scene);
        sorted_insert(
            &mut self.pending,
            ActionEntry {
                action,
                target,
                tag,
                flags,
                stopped: false,
            },
        );
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// First running action on `target` carrying `tag`, searching live
    /// entries before pending ones.
    #[must_use]
    pub fn first_action_for_target_with_tag(
        &self,
        target: NodeHandle,
        tag: i32,
    ) -> Option<&dyn Action> {
        for entries in [&self.live, &self.pending] {
            let start = lower_bound(entries, target);
            for entry in &entries[start..] {
                if entry.target != target {
                    break;
                }
                if !entry.stopped && entry.tag == tag {
                    return Some(entry.action.as_ref());
                }
            }
        }
        None
    }

    #[must_use]
    pub fn actions_for_target_count(&self, target: NodeHandle) -> usize {
        self.count_matching(target, |_| true)
    }

    #[must_use]
    pub fn actions_for_target_with_tag_count(&self, target: NodeHandle, tag: i32) -> usize {
        self.count_matching(target, |e| e.tag == tag)
    }

    /// Counts `target`'s actions whose flags match `flags`.
    ///
    /// The predicate is a bitwise OR, kept from the original system: the
    /// query matches unless both the query mask and the action's flags are
    /// exactly zero. Client code depends on this, so it is preserved rather
    /// than tightened to an intersection test.
    #[must_use]
    pub fn actions_for_target_with_flags_count(&self, target: NodeHandle, flags: u32) -> usize {
        self.count_matching(target, |e| (flags | e.flags) != 0)
    }

    fn count_matching(&self, target: NodeHandle, matches: impl Fn(&ActionEntry) -> bool) -> usize {
        let mut count = 0;
        for entries in [&self.live, &self.pending] {
            let start = lower_bound(entries, target);
            for entry in &entries[start..] {
                if entry.target != target {
                    break;
                }
                if !entry.stopped && matches(entry) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Total number of entries across both collections, stopped included.
    /// Test and diagnostics hook, not part of the stepping contract.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.live.len() + self.pending.len()
    }

    // ------------------------------------------------------------------------
    // Stops
    // ------------------------------------------------------------------------

    /// Stops everything, live and pending. Removal happens on the next
    /// [`update`](ActionManager::update).
    pub fn stop_all_actions(&mut self, scene: &mut Scene) {
        log::trace!("stop_all_actions");
        for entries in [&mut self.live, &mut self.pending] {
            for entry in entries.iter_mut() {
                Self::stop_entry(entry, scene);
            }
        }
    }

    pub fn stop_actions_for_target(&mut self, target: NodeHandle, scene: &mut Scene) {
        self.stop_matching(target, scene, |_| true);
    }

    pub fn stop_actions_for_target_with_tag(
        &mut self,
        target: NodeHandle,
        tag: i32,
        scene: &mut Scene,
    ) {
        self.stop_matching(target, scene, |e| e.tag == tag);
    }

    /// Stops `target`'s actions matching `flags`, with the same preserved
    /// OR predicate as the flags count query.
    pub fn stop_actions_for_target_with_flags(
        &mut self,
        target: NodeHandle,
        flags: u32,
        scene: &mut Scene,
    ) {
        self.stop_matching(target, scene, |e| (flags | e.flags) != 0);
    }

    fn stop_matching(
        &mut self,
        target: NodeHandle,
        scene: &mut Scene,
        matches: impl Fn(&ActionEntry) -> bool,
    ) {
        for entries in [&mut self.live, &mut self.pending] {
            let start = lower_bound(entries, target);
            for entry in &mut entries[start..] {
                if entry.target != target {
                    break;
                }
                if matches(entry) {
                    Self::stop_entry(entry, scene);
                }
            }
        }
    }

    fn stop_entry(entry: &mut ActionEntry, scene: &mut Scene) {
        if !entry.stopped {
            entry.action.stop(scene);
            entry.stopped = true;
        }
    }

    // ------------------------------------------------------------------------
    // Pause
    // ------------------------------------------------------------------------

    /// Suspends stepping of `target`'s actions. They stay owned and keep
    /// their elapsed time.
    pub fn pause_target(&mut self, target: NodeHandle) {
        self.paused.insert(target);
    }

    pub fn resume_target(&mut self, target: NodeHandle) {
        self.paused.remove(&target);
    }

    #[must_use]
    pub fn is_target_paused(&self, target: NodeHandle) -> bool {
        self.paused.contains(&target)
    }

    // ------------------------------------------------------------------------
    // Frame step
    // ------------------------------------------------------------------------

    /// Steps every live action by `dt` seconds.
    ///
    /// Order per frame: step pass over `live`, apply commands queued by
    /// callbacks, drop stopped entries, then merge `pending` into `live`.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let mut any_stopped = false;
        for entry in &mut self.live {
            if entry.stopped || self.paused.contains(&entry.target) {
                any_stopped |= entry.stopped;
                continue;
            }
            let mut ctx = ActionCtx::new(scene, &mut self.ops);
            entry.action.update(dt, &mut ctx);
            if entry.action.is_done() {
                entry.action.stop(scene);
                entry.stopped = true;
            }
            any_stopped |= entry.stopped;
        }

        self.apply_commands(scene);

        if any_stopped {
            self.live.retain(|e| !e.stopped);
        }

        // Entries stopped while still pending never ran; drop them here.
        let pending = std::mem::take(&mut self.pending);
        for entry in pending {
            if !entry.stopped {
                sorted_insert(&mut self.live, entry);
            }
        }
    }

    fn apply_commands(&mut self, scene: &mut Scene) {
        let commands = std::mem::take(&mut self.ops.commands);
        for command in commands {
            match command {
                ActionCommand::Run {
                    target,
                    action,
                    tag,
                    flags,
                } => {
                    // Already started by the submitting context.
                    sorted_insert(
                        &mut self.pending,
                        ActionEntry {
                            action,
                            target,
                            tag,
                            flags,
                            stopped: false,
                        },
                    );
                }
                ActionCommand::StopAll => self.stop_all_actions(scene),
                ActionCommand::StopForTarget(target) => {
                    self.stop_actions_for_target(target, scene);
                }
                ActionCommand::StopForTargetWithTag(target, tag) => {
                    self.stop_actions_for_target_with_tag(target, tag, scene);
                }
                ActionCommand::StopForTargetWithFlags(target, flags) => {
                    self.stop_actions_for_target_with_flags(target, flags, scene);
                }
            }
        }
    }
}
