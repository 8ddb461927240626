use crate::foundation::core::{ClockTime, TimeRange};
use crate::pipeline::element::{SeekEvent, State};
use crate::pipeline::port::Port;

/// A bounded-time sub-composition scheduled by the timeline.
///
/// The group owns its sub-graph; the scheduler only talks to it through this contract. Range
/// mutation is routed through the owning timeline so the aggregate range stays current.
pub trait Group {
    /// Identity used to name relay ports and in logs.
    fn name(&self) -> &str;

    /// Scheduled span `[start, stop)`.
    fn range(&self) -> TimeRange;

    /// Replace the scheduled span.
    fn set_range(&mut self, range: TimeRange);

    /// Hand out the port currently producing this group's output.
    ///
    /// `None` while the group has nothing linkable (e.g. not yet seeked or misconfigured).
    fn output_port(&mut self) -> Option<Box<dyn Port>>;

    /// Current composition-time position.
    fn position(&self) -> ClockTime;

    /// Reposition onto a range. `false` when the group rejects the seek.
    fn send_seek(&mut self, seek: &SeekEvent) -> bool;

    /// `true` when scheduled content of this group falls inside `range`.
    fn covers(&self, range: TimeRange) -> bool;

    /// Move the group's sub-graph to a new execution state. `false` on failure.
    fn set_state(&mut self, state: State) -> bool;
}
