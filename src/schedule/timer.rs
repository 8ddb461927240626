use tracing::{debug, warn};

use crate::compose::group_table::{GroupId, GroupTable};
use crate::foundation::core::{ClockTime, TimeRange};
use crate::pipeline::buffer::{Buffer, DataUnit};
use crate::pipeline::element::{SeekEvent, SeekFlags, State};
use crate::pipeline::group::Group;
use crate::schedule::link::TimerLink;

/// Which link wins when several usable links share the lowest timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The link created first wins.
    #[default]
    FirstWins,
    /// The link created last wins.
    LastWins,
}

/// Outcome of one merge-loop cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// A buffer was forwarded downstream.
    Buffer {
        /// Group the buffer came from.
        group: GroupId,
        /// The forwarded buffer.
        buffer: Buffer,
    },
    /// A group ran out of content for good; its end-marker was forwarded downstream.
    GroupEnd(GroupId),
    /// A group reached the end of its current content while the timeline continues; it was
    /// reseeked and relinked. Nothing was forwarded.
    Reseek(GroupId),
    /// A buffer without a valid timestamp was dropped. Nothing was forwarded.
    Discard(GroupId),
    /// Pulling from a group failed; its link is now unusable. Nothing was forwarded.
    Fault(GroupId),
    /// No usable link is left. Emitted once per activation.
    EndOfStream,
    /// End of stream was already signalled; nothing happens until reactivation.
    Drained,
}

impl Cycle {
    /// `true` when this cycle put something on the output.
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Buffer { .. } | Self::GroupEnd(_))
    }
}

/// Merge scheduler: each cycle services the usable link with the lowest timestamp.
///
/// Links are kept in creation order, which is also the scan order for tie-breaking.
#[derive(Debug, Default)]
pub struct Timer {
    links: Vec<TimerLink>,
    current: Option<GroupId>,
    tie_break: TieBreak,
    drained: bool,
}

impl Timer {
    /// Empty timer.
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            ..Self::default()
        }
    }

    /// Tie-break policy in effect.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Allocate the relay ports for a group and start tracking it.
    pub(crate) fn create_link(&mut self, group: GroupId, group_name: &str) -> &mut TimerLink {
        debug!(%group, group_name, "create timer link");
        self.links.push(TimerLink::new(group, group_name));
        let last = self.links.len() - 1;
        &mut self.links[last]
    }

    /// Stop tracking a group, releasing both ports of its link.
    pub(crate) fn remove_link(&mut self, group: GroupId) -> Option<TimerLink> {
        let idx = self.links.iter().position(|l| l.group() == group)?;
        let mut link = self.links.remove(idx);
        link.release();
        if self.current == Some(group) {
            self.current = None;
        }
        Some(link)
    }

    /// All links, in creation order.
    pub fn links(&self) -> &[TimerLink] {
        &self.links
    }

    /// Link bound to `group`.
    pub fn link_for_group(&self, group: GroupId) -> Option<&TimerLink> {
        self.links.iter().find(|l| l.group() == group)
    }

    pub(crate) fn link_for_group_mut(&mut self, group: GroupId) -> Option<&mut TimerLink> {
        self.links.iter_mut().find(|l| l.group() == group)
    }

    /// Link serviced by the most recent cycle.
    pub fn current(&self) -> Option<&TimerLink> {
        self.link_for_group(self.current?)
    }

    /// Last timestamp of the current link; `None` before the first cycle.
    pub fn position(&self) -> Option<ClockTime> {
        self.current()
            .map(TimerLink::last_timestamp)
            .filter(|t| t.is_valid())
    }

    /// `true` once end of stream was signalled for this activation.
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Start a new activation cycle.
    pub(crate) fn reset(&mut self) {
        self.current = None;
        self.drained = false;
    }

    /// Abandon in-flight scheduling: every link goes unusable, bindings stay in place.
    pub(crate) fn flush(&mut self) {
        for link in &mut self.links {
            link.mark_unusable();
            link.reseeked_at = None;
        }
        self.reset();
    }

    /// Release every port of every link.
    pub fn dispose(&mut self) {
        for link in &mut self.links {
            link.release();
        }
        self.current = None;
    }

    fn select(&self) -> Option<usize> {
        let mut best: Option<(usize, ClockTime)> = None;
        for (i, link) in self.links.iter().enumerate() {
            if !link.is_usable() {
                continue;
            }
            let ts = link.last_timestamp();
            let better = match (best, self.tie_break) {
                (None, _) => true,
                (Some((_, b)), TieBreak::FirstWins) => ts < b,
                (Some((_, b)), TieBreak::LastWins) => ts <= b,
            };
            if better {
                best = Some((i, ts));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Run one cycle: pick the earliest usable link, pull one unit from it and decide what to do
    /// with it.
    pub(crate) fn iterate(&mut self, groups: &mut GroupTable) -> Cycle {
        if self.drained {
            return Cycle::Drained;
        }
        let Some(idx) = self.select() else {
            debug!("no usable link left, signalling end of stream");
            self.drained = true;
            return Cycle::EndOfStream;
        };

        let link = &mut self.links[idx];
        let group = link.group();
        self.current = Some(group);

        let unit = match link.pull() {
            Ok(unit) => unit,
            Err(e) => {
                warn!(%group, error = %e, "pull failed, link disabled");
                link.mark_unusable();
                return Cycle::Fault(group);
            }
        };

        match unit {
            DataUnit::Buffer(buffer) => {
                if !buffer.timestamp.is_valid() {
                    debug!(%group, "dropping buffer without a valid timestamp");
                    return Cycle::Discard(group);
                }
                link.set_last_timestamp(buffer.timestamp);
                link.reseeked_at = None;
                Cycle::Buffer { group, buffer }
            }
            DataUnit::EndOfStream => self.handle_end(idx, groups),
        }
    }

    fn handle_end(&mut self, idx: usize, groups: &mut GroupTable) -> Cycle {
        let group = self.links[idx].group();
        let Some(position) = groups.get(group).map(|g| g.position()) else {
            warn!(%group, "end-marker from a group the timeline no longer owns");
            self.links[idx].deactivate();
            return Cycle::GroupEnd(group);
        };

        // A reseek that immediately ends again at the same spot produced nothing: whatever
        // coverage remains belongs to other groups.
        let stalled = self.links[idx].reseeked_at == Some(position);
        if !stalled && position.is_valid() && groups.covers(TimeRange::from_start(position)) {
            self.reseek(idx, groups, position);
            return Cycle::Reseek(group);
        }

        debug!(%group, %position, "group exhausted");
        self.links[idx].deactivate();
        Cycle::GroupEnd(group)
    }

    fn reseek(&mut self, idx: usize, groups: &mut GroupTable, position: ClockTime) {
        let link = &mut self.links[idx];
        let group_id = link.group();
        debug!(group = %group_id, %position, "reseeking group");

        drop(link.unlink_input());
        link.reseeked_at = Some(position);

        let Some(group) = groups.get_mut(group_id) else {
            return;
        };
        let seek = SeekEvent {
            range: TimeRange::from_start(position),
            flags: SeekFlags {
                flush: true,
                accurate: true,
            },
        };
        if !group.send_seek(&seek) {
            warn!(group = %group_id, %position, "group rejected reseek");
        }
        match group.output_port() {
            Some(port) => match link.link_input(port) {
                Ok(()) => link.set_last_timestamp(resume_key(group, position)),
                Err(e) => warn!(group = %group_id, error = %e, "relink after reseek failed"),
            },
            None => warn!(group = %group_id, "group exposes no output port after reseek"),
        }
        if !group.set_state(State::Playing) {
            warn!(group = %group_id, "group refused to resume after reseek");
        }
    }
}

/// Scheduling key of a freshly seeked group: its position, or its start when it reports none,
/// never earlier than `seek_start`.
pub(crate) fn resume_key(group: &dyn Group, seek_start: ClockTime) -> ClockTime {
    let position = group.position();
    if position.is_valid() {
        position.max(seek_start)
    } else {
        group.range().start.max(seek_start)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timer.rs"]
mod tests;
