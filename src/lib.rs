//! Cutline is the timeline scheduler of a non-linear media composition engine.
//!
//! A [`Timeline`] owns a set of time-bounded [`Group`]s (sub-compositions) and merges their
//! output into one stream ordered by timestamp.
//!
//! # Scheduling overview
//!
//! 1. **Activate**: walking the timeline `Null -> Ready -> Paused` seeks every group and binds
//!    each group's output port to a [`TimerLink`].
//! 2. **Merge**: each [`Timeline::pull`] runs one [`Timer`] cycle, servicing the usable link
//!    with the lowest last timestamp.
//! 3. **Reseek**: a group that runs dry while the timeline still has content later on is
//!    reseeked and relinked transparently; otherwise its end-marker goes downstream.
//! 4. **Drain**: when no usable link remains a single [`Cycle::EndOfStream`] is reported.
//!
//! Timelines can also be described in JSON ([`TimelineDef`]) and built from
//! [`ClipGroup`]s, the in-memory group implementation shipped with the crate.
//!
//! The crate is single-threaded: groups and their ports share state through `Rc<RefCell<_>>`
//! and nothing here is `Send`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod compose;
mod foundation;
mod media;
mod pipeline;
mod scene;
mod schedule;

pub use compose::group_table::GroupId;
pub use compose::timeline::{MissingPortPolicy, Timeline, TimelineOpts};
pub use foundation::core::{ClockTime, TimeRange};
pub use foundation::error::{CutlineError, CutlineResult};
pub use media::clip_group::{Clip, ClipGroup, ClipGroupProbe, ClipPort};
pub use pipeline::buffer::{Buffer, Caps, DataUnit};
pub use pipeline::element::{Element, Event, Query, SeekEvent, SeekFlags, State, StateChange};
pub use pipeline::group::Group;
pub use pipeline::port::{InputPort, OutputPort, Port};
pub use scene::def::{ClipDef, GroupDef, TimelineDef};
pub use schedule::link::TimerLink;
pub use schedule::timer::{Cycle, TieBreak, Timer};
