use tracing::{debug, info, warn};

use crate::compose::group_table::{GroupId, GroupTable};
use crate::foundation::core::{ClockTime, TimeRange};
use crate::foundation::error::{CutlineError, CutlineResult};
use crate::pipeline::element::{Element, Event, Query, SeekEvent, SeekFlags, State, StateChange};
use crate::pipeline::group::Group;
use crate::pipeline::port::OutputPort;
use crate::schedule::link::TimerLink;
use crate::schedule::timer::{Cycle, TieBreak, Timer, resume_key};

/// What `prepare` does when a group exposes no output port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPortPolicy {
    /// Warn and leave that group's link unusable; activation proceeds.
    #[default]
    Degrade,
    /// Fail the activation.
    Fail,
}

/// Options controlling timeline scheduling behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineOpts {
    /// Winner among links sharing the lowest timestamp.
    pub tie_break: TieBreak,
    /// Reaction to a group without an output port during activation.
    pub missing_port: MissingPortPolicy,
    /// Flags of the seek broadcast on `Ready -> Paused`.
    pub initial_seek: SeekFlags,
}

/// Composition root: owns the groups and the timer that merges them.
///
/// All range mutation goes through [`Timeline::set_group_range`], so the aggregate
/// `[start, stop)` is recomputed inline after every change.
pub struct Timeline {
    name: String,
    opts: TimelineOpts,
    groups: GroupTable,
    timer: Timer,
    range: TimeRange,
    state: State,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups: Vec<_> = self.groups.iter().map(|(id, g)| (id, g.name())).collect();
        f.debug_struct("Timeline")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("range", &self.range)
            .field("opts", &self.opts)
            .field("groups", &groups)
            .field("timer", &self.timer)
            .finish()
    }
}

impl Timeline {
    /// Empty timeline with default options.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_opts(name, TimelineOpts::default())
    }

    /// Empty timeline.
    pub fn with_opts(name: impl Into<String>, opts: TimelineOpts) -> Self {
        Self {
            name: name.into(),
            opts,
            groups: GroupTable::default(),
            timer: Timer::new(opts.tie_break),
            range: TimeRange::default(),
            state: State::Null,
        }
    }

    /// Timeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options in effect.
    pub fn opts(&self) -> &TimelineOpts {
        &self.opts
    }

    /// Current execution state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Aggregate range over all groups; `[0, +inf)` when empty.
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Aggregate start.
    pub fn start(&self) -> ClockTime {
        self.range.start
    }

    /// Aggregate stop.
    pub fn stop(&self) -> ClockTime {
        self.range.stop
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Group ids in insertion order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.ids()
    }

    /// Borrow a group.
    pub fn group(&self, id: GroupId) -> Option<&dyn Group> {
        self.groups.get(id)
    }

    /// The merge scheduler.
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Take ownership of a group and start scheduling it.
    ///
    /// The group's link stays unusable until the next activation or seek links it.
    pub fn add_group(&mut self, group: impl Group + 'static) -> GroupId {
        self.add_boxed_group(Box::new(group))
    }

    /// [`Timeline::add_group`] for an already boxed group.
    pub fn add_boxed_group(&mut self, group: Box<dyn Group>) -> GroupId {
        let name = group.name().to_owned();
        let id = self.groups.insert(group);
        self.timer.create_link(id, &name);
        self.recompute_range();
        debug!(timeline = %self.name, %id, group = %name, "group added");
        id
    }

    /// Remove a group, releasing its link. Returns the group to the caller.
    pub fn remove_group(&mut self, id: GroupId) -> Option<Box<dyn Group>> {
        self.timer.remove_link(id);
        let group = self.groups.remove(id)?;
        self.recompute_range();
        debug!(timeline = %self.name, %id, "group removed");
        Some(group)
    }

    /// Change a group's span and recompute the aggregate range.
    pub fn set_group_range(&mut self, id: GroupId, range: TimeRange) -> CutlineResult<()> {
        let group = self
            .groups
            .get_mut(id)
            .ok_or_else(|| CutlineError::validation(format!("unknown {id}")))?;
        group.set_range(range);
        self.recompute_range();
        Ok(())
    }

    /// `true` when any group has content inside `range`.
    pub fn covers(&self, range: TimeRange) -> bool {
        self.groups.covers(range)
    }

    /// Scheduler record bound to a group.
    pub fn get_link_for_group(&self, id: GroupId) -> Option<&TimerLink> {
        self.timer.link_for_group(id)
    }

    /// Relay port through which a group's data leaves the timeline.
    pub fn get_port_for_group(&self, id: GroupId) -> Option<&OutputPort> {
        self.timer.link_for_group(id).map(TimerLink::output)
    }

    /// Mutable relay port, e.g. to restrict the formats downstream accepts.
    pub fn get_port_for_group_mut(&mut self, id: GroupId) -> Option<&mut OutputPort> {
        self.timer.link_for_group_mut(id).map(TimerLink::output_mut)
    }

    fn recompute_range(&mut self) {
        self.range = self.groups.aggregate_range();
    }

    /// Seek every group onto `seek` and (re)link each group's port to its timer link.
    ///
    /// Fails when any group rejects the seek. A group without an output port is a warning under
    /// [`MissingPortPolicy::Degrade`] and a failure under [`MissingPortPolicy::Fail`]; either way
    /// every other group is still prepared.
    #[tracing::instrument(skip(self), fields(timeline = %self.name))]
    pub fn prepare(&mut self, seek: &SeekEvent) -> CutlineResult<()> {
        self.timer.reset();
        let mut rejected = Vec::new();
        let mut unlinked = Vec::new();

        for id in self.groups.ids() {
            let (Some(group), Some(link)) =
                (self.groups.get_mut(id), self.timer.link_for_group_mut(id))
            else {
                continue;
            };
            link.reseeked_at = None;

            if !group.send_seek(seek) {
                warn!(group = group.name(), "group rejected seek");
                rejected.push(group.name().to_owned());
            }

            let port = group.output_port();
            if link.input().is_linked() {
                drop(link.unlink_input());
            }
            let Some(port) = port else {
                warn!(group = group.name(), "group exposes no output port");
                unlinked.push(group.name().to_owned());
                continue;
            };
            match link.link_input(port) {
                Ok(()) => link.set_last_timestamp(resume_key(group, seek.range.start)),
                Err(e) => {
                    warn!(group = group.name(), error = %e, "linking group failed");
                    unlinked.push(group.name().to_owned());
                }
            }
        }

        if !rejected.is_empty() {
            return Err(CutlineError::seek(format!(
                "groups rejected seek to {}: {}",
                seek.range.start,
                rejected.join(", ")
            )));
        }
        if self.opts.missing_port == MissingPortPolicy::Fail && !unlinked.is_empty() {
            return Err(CutlineError::link(format!(
                "groups could not be linked: {}",
                unlinked.join(", ")
            )));
        }
        Ok(())
    }

    /// Run one merge-loop cycle. Only valid while `Playing`.
    pub fn pull(&mut self) -> CutlineResult<Cycle> {
        if self.state != State::Playing {
            return Err(CutlineError::state(format!(
                "timeline '{}' can only be pulled while Playing (is {:?})",
                self.name, self.state
            )));
        }
        let cycle = self.timer.iterate(&mut self.groups);
        if cycle == Cycle::EndOfStream {
            info!(timeline = %self.name, "end of stream");
        }
        Ok(cycle)
    }

    /// Walk the state ladder to `target`, one transition at a time.
    pub fn set_state(&mut self, target: State) -> CutlineResult<()> {
        for transition in StateChange::path(self.state, target) {
            self.change_state(transition)?;
        }
        Ok(())
    }

    fn broadcast_state(&mut self, state: State) -> CutlineResult<()> {
        let mut failed = Vec::new();
        for id in self.groups.ids() {
            if let Some(group) = self.groups.get_mut(id)
                && !group.set_state(state)
            {
                failed.push(group.name().to_owned());
            }
        }
        if failed.is_empty() {
            return Ok(());
        }
        Err(CutlineError::state(format!(
            "groups failed to reach {state:?}: {}",
            failed.join(", ")
        )))
    }

    /// Tear down every group sub-graph and the timer.
    pub fn dispose(&mut self) {
        self.timer.dispose();
        for (id, mut group) in self.groups.clear() {
            if !group.set_state(State::Null) {
                warn!(timeline = %self.name, %id, "group failed to shut down");
            }
        }
        self.state = State::Null;
        self.recompute_range();
    }
}

impl Element for Timeline {
    #[tracing::instrument(skip(self), fields(timeline = %self.name))]
    fn change_state(&mut self, transition: StateChange) -> CutlineResult<()> {
        if transition.source() != self.state {
            return Err(CutlineError::state(format!(
                "cannot apply {transition:?} while {:?}",
                self.state
            )));
        }
        match transition {
            StateChange::NullToReady => self.broadcast_state(State::Ready)?,
            StateChange::ReadyToPaused => {
                let seek = SeekEvent {
                    range: TimeRange::from_start(ClockTime::ZERO),
                    flags: self.opts.initial_seek,
                };
                self.prepare(&seek)
                    .map_err(|e| CutlineError::state(format!("prepare failed: {e}")))?;
                self.broadcast_state(State::Paused)?;
            }
            StateChange::PausedToPlaying => self.broadcast_state(State::Playing)?,
            StateChange::PlayingToPaused => self.broadcast_state(State::Paused)?,
            // The timer is only torn down once every group went along; a refused downward
            // transition leaves the links untouched.
            StateChange::PausedToReady => {
                self.broadcast_state(State::Ready)?;
                self.timer.flush();
            }
            StateChange::ReadyToNull => {
                self.broadcast_state(State::Null)?;
                self.timer.dispose();
            }
        }
        self.state = transition.target();
        debug!(state = ?self.state, "state changed");
        Ok(())
    }

    fn query(&self, query: Query) -> Option<ClockTime> {
        match query {
            Query::Position => self.timer.position(),
            Query::Duration => self.range.duration(),
        }
    }

    fn send_event(&mut self, event: Event) -> bool {
        match event {
            Event::Seek(seek) => {
                if self.state < State::Paused {
                    warn!(timeline = %self.name, "seek ignored before activation");
                    return false;
                }
                if let Err(e) = self.prepare(&seek) {
                    warn!(timeline = %self.name, error = %e, "seek failed");
                    return false;
                }
                self.broadcast_state(self.state).is_ok()
            }
            Event::EndOfStream => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/timeline.rs"]
mod tests;
