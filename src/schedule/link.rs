use crate::compose::group_table::GroupId;
use crate::foundation::core::ClockTime;
use crate::foundation::error::{CutlineError, CutlineResult};
use crate::pipeline::buffer::{Caps, DataUnit, intersect_opt};
use crate::pipeline::port::{InputPort, OutputPort, Port};

/// The scheduler's binding record for one group.
///
/// Owns the relay port pair (`sink_<group>` fed by the group, `src_<group>` seen downstream) and
/// the scheduling key. `last_timestamp` is only meaningful while the link is usable.
#[derive(Debug)]
pub struct TimerLink {
    group: GroupId,
    input: InputPort,
    output: OutputPort,
    last_timestamp: ClockTime,
    usable: bool,
    pub(crate) reseeked_at: Option<ClockTime>,
}

impl TimerLink {
    pub(crate) fn new(group: GroupId, group_name: &str) -> Self {
        Self {
            group,
            input: InputPort::new(format!("sink_{group_name}")),
            output: OutputPort::new(format!("src_{group_name}")),
            last_timestamp: ClockTime::ZERO,
            usable: false,
            reseeked_at: None,
        }
    }

    /// The group this link relays.
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Timestamp of the most recent buffer seen from the group (the scheduling key).
    pub fn last_timestamp(&self) -> ClockTime {
        self.last_timestamp
    }

    /// `true` while the input is linked and the group is not known to be exhausted.
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    /// Receiving side, fed by the group's output port.
    pub fn input(&self) -> &InputPort {
        &self.input
    }

    /// Sending side, as exposed to consumers.
    pub fn output(&self) -> &OutputPort {
        &self.output
    }

    /// Mutable sending side, for consumers restricting what they accept.
    pub fn output_mut(&mut self) -> &mut OutputPort {
        &mut self.output
    }

    /// Format query on the output port, answered by the group feeding the input.
    pub fn query_output_caps(&self) -> Option<Caps> {
        intersect_opt(self.input.peer_caps().as_ref(), self.output.allowed_caps())
            .ok()
            .flatten()
    }

    /// Format query on the input port, answered by what downstream accepts.
    pub fn query_input_caps(&self) -> Option<Caps> {
        self.output.allowed_caps().cloned()
    }

    /// Bind the group's port after negotiating formats; the link becomes usable.
    pub(crate) fn link_input(&mut self, peer: Box<dyn Port>) -> CutlineResult<()> {
        if intersect_opt(peer.caps().as_ref(), self.output.allowed_caps()).is_err() {
            return Err(CutlineError::link(format!(
                "'{}' offers formats '{}' cannot accept",
                peer.name(),
                self.output.name()
            )));
        }
        self.input.link(peer)?;
        self.output.set_active(true);
        self.usable = true;
        Ok(())
    }

    /// Drop the current binding. The link stays unusable until relinked.
    pub(crate) fn unlink_input(&mut self) -> Option<Box<dyn Port>> {
        self.usable = false;
        self.input.unlink()
    }

    pub(crate) fn pull(&mut self) -> CutlineResult<DataUnit> {
        self.input.pull()
    }

    pub(crate) fn set_last_timestamp(&mut self, ts: ClockTime) {
        self.last_timestamp = ts;
    }

    pub(crate) fn mark_unusable(&mut self) {
        self.usable = false;
    }

    /// Genuine exhaustion: unusable and the output port goes inactive.
    pub(crate) fn deactivate(&mut self) {
        self.usable = false;
        self.output.set_active(false);
    }

    /// Disconnect both ports.
    pub(crate) fn release(&mut self) {
        drop(self.unlink_input());
        self.output.set_active(false);
        self.reseeked_at = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/link.rs"]
mod tests;
