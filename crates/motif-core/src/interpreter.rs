//! Timeline interpreter.
//!
//! Consumes a [`ResolvedDocument`] and drives registered handles over a
//! virtual clock. Block durations are known up front (spring spans use the
//! settle-time estimate), so activating a sequence schedules every fire at
//! an absolute virtual time in one pass; repeats re-schedule themselves via
//! a continuation wakeup at the iteration boundary.

use hashbrown::HashSet;

use crate::handle::{HandleRegistry, TargetHandle, TargetUpdate};
use crate::resolve::{
    ResolvedBlock, ResolvedDocument, ResolvedGroup, ResolvedKeyframe, ResolvedSequence,
};
use crate::schedule::Scheduler;
use crate::schema::{GroupMode, RepeatCount, ResolvedState, StaggerDefinition, Trigger};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Observable lifecycle notifications, drained by the host per frame.
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeEvent {
    SequenceStarted { id: String, iteration: u32 },
    SequenceFinished { id: String },
    TargetMissing { id: String },
    Stopped,
}

enum Task {
    Fire {
        target: String,
        update: TargetUpdate,
    },
    Iterate {
        sequence: usize,
        iteration: u32,
    },
    Finish {
        sequence: usize,
    },
}

const MS: f64 = 1000.0;

pub struct Interpreter {
    doc: ResolvedDocument,
    scheduler: Scheduler<Task>,
    handles: HandleRegistry,
    state: PlaybackState,
    /// Indices of sequences currently running (re-triggers are ignored).
    active: HashSet<usize>,
    events: Vec<RuntimeEvent>,
}

impl Interpreter {
    pub fn new(doc: ResolvedDocument) -> Self {
        Self {
            doc,
            scheduler: Scheduler::new(),
            handles: HandleRegistry::new(),
            state: PlaybackState::default(),
            active: HashSet::new(),
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &ResolvedDocument {
        &self.doc
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn register_handle(&mut self, id: impl Into<String>, handle: Box<dyn TargetHandle>) {
        self.handles.register(id, handle);
    }

    pub fn handles_mut(&mut self) -> &mut HandleRegistry {
        &mut self.handles
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    /// No sequences running and nothing pending.
    pub fn is_settled(&self) -> bool {
        self.active.is_empty() && self.scheduler.is_idle()
    }

    /// Start playback: activates every `mount` sequence. Resumes when
    /// paused; a no-op while already playing.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Idle => {
                self.state = PlaybackState::Playing;
                self.fire_trigger("mount");
            }
            PlaybackState::Paused => self.state = PlaybackState::Playing,
            PlaybackState::Playing => {}
        }
    }

    /// Freeze the virtual clock. Pending wakeups keep their stamps and fire
    /// after resume, preserving relative timing.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Cancel everything and snap every element with a registered handle
    /// back to its resolved initial state.
    pub fn stop(&mut self) {
        self.scheduler.cancel_all();
        self.active.clear();
        let now = self.scheduler.now();
        let mut ids: Vec<&String> = self.doc.elements.keys().collect();
        ids.sort();
        for id in ids {
            let initial = &self.doc.elements[id.as_str()].initial;
            if let Some(handle) = self.handles.get_mut(id) {
                handle.set(now, initial);
            }
        }
        self.state = PlaybackState::Idle;
        self.events.push(RuntimeEvent::Stopped);
    }

    /// Activate every sequence whose trigger kind matches (`"tap"`,
    /// `"hover"`, `"inView"`, ...). Ignored unless playing.
    pub fn fire_trigger(&mut self, kind: &str) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let matching: Vec<usize> = self
            .doc
            .sequences
            .iter()
            .enumerate()
            .filter(|(_, s)| s.trigger.kind() == kind)
            .map(|(i, _)| i)
            .collect();
        for index in matching {
            self.activate(index);
        }
    }

    /// Activate every `custom` sequence registered for `event`. Ignored
    /// unless playing.
    pub fn fire_custom(&mut self, event: &str) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let matching: Vec<usize> = self
            .doc
            .sequences
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(&s.trigger, Trigger::Custom { event: e } if e == event))
            .map(|(i, _)| i)
            .collect();
        for index in matching {
            self.activate(index);
        }
    }

    /// Move the virtual clock forward `dt_s` seconds, running every wakeup
    /// that falls inside the window in stamp order. Frozen unless playing.
    pub fn advance(&mut self, dt_s: f64) {
        if self.state != PlaybackState::Playing || dt_s <= 0.0 {
            return;
        }
        let horizon = self.scheduler.now() + dt_s;
        while let Some((at, task)) = self.scheduler.pop_due(horizon) {
            self.run_task(at, task);
        }
        self.scheduler.settle_to(horizon);
    }

    fn activate(&mut self, index: usize) {
        if !self.active.insert(index) {
            return;
        }
        self.start_iteration(index, 0);
    }

    fn start_iteration(&mut self, index: usize, iteration: u32) {
        // Cloned so scheduling can borrow the interpreter mutably.
        let sequence = self.doc.sequences[index].clone();
        self.events.push(RuntimeEvent::SequenceStarted {
            id: sequence.id.clone(),
            iteration,
        });
        let reversed = sequence.yoyo && iteration % 2 == 1;
        let base = self.scheduler.now();
        // Top-level blocks run serially; parallelism is expressed with an
        // explicit group block.
        let mut at = base;
        for block in &sequence.blocks {
            at += self.schedule_block(block, at, reversed);
        }
        let end = at - base;
        match next_iteration(&sequence, iteration, end) {
            Some(gap_s) => {
                self.scheduler.schedule(end + gap_s, Task::Iterate {
                    sequence: index,
                    iteration: iteration + 1,
                });
            }
            None => {
                self.scheduler.schedule(end, Task::Finish { sequence: index });
            }
        }
    }

    /// Schedule one block starting at absolute time `base_s`; returns the
    /// block's span in seconds (offset and delay included).
    fn schedule_block(&mut self, block: &ResolvedBlock, base_s: f64, reversed: bool) -> f64 {
        match block {
            ResolvedBlock::Keyframes(b) => {
                let lead = b.offset_s + b.delay_s;
                self.fan_out(&b.targets, &b.stagger, base_s + lead, |_| {
                    TargetUpdate::Keyframes {
                        frames: orient_frames(&b.frames, reversed),
                        duration_s: b.duration_s,
                        easing: b.easing.clone(),
                    }
                });
                lead + b.duration_s + max_stagger(&b.stagger, b.targets.len())
            }
            ResolvedBlock::Spring(b) => {
                let lead = b.offset_s + b.delay_s;
                let (from, to) = orient(&b.from, &b.to, reversed);
                self.fan_out(&b.targets, &b.stagger, base_s + lead, |_| {
                    TargetUpdate::Spring {
                        from: from.clone(),
                        to: to.clone(),
                        spring: b.spring,
                    }
                });
                lead + b.spring.settle_seconds() + max_stagger(&b.stagger, b.targets.len())
            }
            ResolvedBlock::Transition(b) => {
                let lead = b.offset_s + b.delay_s;
                let (from, to) = orient(&b.from, &b.to, reversed);
                self.fan_out(&b.targets, &b.stagger, base_s + lead, |_| {
                    TargetUpdate::Tween {
                        from: from.clone(),
                        to: to.clone(),
                        duration_s: b.duration_s,
                        easing: b.easing.clone(),
                    }
                });
                lead + b.duration_s + max_stagger(&b.stagger, b.targets.len())
            }
            ResolvedBlock::Group(g) => self.schedule_group(g, base_s, reversed),
            ResolvedBlock::Hold(h) => h.offset_s + h.delay_s + h.duration_s,
        }
    }

    fn schedule_group(&mut self, group: &ResolvedGroup, base_s: f64, reversed: bool) -> f64 {
        let lead = group.offset_s + group.delay_s;
        let start = base_s + lead;
        let count = group.children.len();
        match group.mode {
            GroupMode::Parallel => {
                let mut span: f64 = 0.0;
                for (i, child) in group.children.iter().enumerate() {
                    let extra = group
                        .stagger
                        .as_ref()
                        .map(|s| s.delay_for(i, count) / MS)
                        .unwrap_or(0.0);
                    let child_span = self.schedule_block(child, start + extra, reversed);
                    span = span.max(extra + child_span);
                }
                lead + span
            }
            GroupMode::Sequence => {
                // stagger.each is the fixed gap between consecutive children.
                let gap = group.stagger.as_ref().map(|s| s.each / MS).unwrap_or(0.0);
                let mut at = start;
                for (i, child) in group.children.iter().enumerate() {
                    at += self.schedule_block(child, at, reversed);
                    if i + 1 < count {
                        at += gap;
                    }
                }
                lead + (at - start)
            }
        }
    }

    fn fan_out(
        &mut self,
        targets: &[String],
        stagger: &Option<StaggerDefinition>,
        start_s: f64,
        mut update: impl FnMut(usize) -> TargetUpdate,
    ) {
        let count = targets.len();
        for (i, target) in targets.iter().enumerate() {
            let delay = stagger
                .as_ref()
                .map(|s| s.delay_for(i, count) / MS)
                .unwrap_or(0.0);
            self.scheduler.schedule_at(
                start_s + delay,
                Task::Fire {
                    target: target.clone(),
                    update: update(i),
                },
            );
        }
    }

    fn run_task(&mut self, at_s: f64, task: Task) {
        match task {
            Task::Fire { target, update } => match self.handles.get_mut(&target) {
                Some(handle) => handle.start(at_s, update),
                None => {
                    log::warn!("no handle registered for target '{target}', skipping");
                    self.events.push(RuntimeEvent::TargetMissing { id: target });
                }
            },
            Task::Iterate {
                sequence,
                iteration,
            } => self.start_iteration(sequence, iteration),
            Task::Finish { sequence } => {
                self.active.remove(&sequence);
                self.events.push(RuntimeEvent::SequenceFinished {
                    id: self.doc.sequences[sequence].id.clone(),
                });
            }
        }
    }
}

/// Gap before the next iteration, or `None` when the run is over.
fn next_iteration(sequence: &ResolvedSequence, iteration: u32, span_s: f64) -> Option<f64> {
    let repeat = sequence.repeat.as_ref()?;
    let gap_s = repeat.delay / MS;
    let more = match &repeat.count {
        RepeatCount::Count(n) => iteration + 1 < *n,
        // An infinite repeat of a zero-length iteration with no gap would
        // respawn at the same instant and spin `advance` forever; one pass
        // shows everything it can ever show.
        word @ RepeatCount::Word(_) => word.is_infinite() && span_s + gap_s > 0.0,
    };
    more.then_some(gap_s)
}

fn max_stagger(stagger: &Option<StaggerDefinition>, count: usize) -> f64 {
    stagger.as_ref().map(|s| s.max_delay(count) / MS).unwrap_or(0.0)
}

/// Yoyo orientation for from/to pairs. Reversal needs both endpoints; a
/// `from` of "wherever the target is" has no meaningful inverse.
fn orient(
    from: &Option<ResolvedState>,
    to: &ResolvedState,
    reversed: bool,
) -> (Option<ResolvedState>, ResolvedState) {
    match (reversed, from) {
        (true, Some(f)) => (Some(to.clone()), f.clone()),
        _ => (from.clone(), to.clone()),
    }
}

fn orient_frames(frames: &[ResolvedKeyframe], reversed: bool) -> Vec<ResolvedKeyframe> {
    if !reversed {
        return frames.to_vec();
    }
    let mut out: Vec<ResolvedKeyframe> = frames
        .iter()
        .map(|f| ResolvedKeyframe {
            time: 1.0 - f.time,
            state: f.state.clone(),
            easing: f.easing.clone(),
        })
        .collect();
    out.reverse();
    out
}
