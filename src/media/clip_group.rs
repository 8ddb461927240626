use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::{ClockTime, TimeRange};
use crate::foundation::error::{CutlineError, CutlineResult};
use crate::pipeline::buffer::{Buffer, Caps, DataUnit};
use crate::pipeline::element::{SeekEvent, State};
use crate::pipeline::group::Group;
use crate::pipeline::port::Port;

/// A span of fixed-rate content inside a [`ClipGroup`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    /// Clip name; also used as the payload of every buffer it produces.
    pub name: String,
    /// Placement in composition time.
    pub range: TimeRange,
    /// Spacing between consecutive buffer timestamps. Must be non-zero.
    pub frame_duration: ClockTime,
}

/// In-memory group made of clips on a single track.
///
/// Like a real sub-composition, each seek builds exactly one *segment*: the clip active at the
/// seek position (or the next clip after it), clamped to the seek and group ranges. When the
/// segment is played out the port reports an end-marker and [`Group::position`] sits on the
/// segment end; playing the following clip requires a new seek.
#[derive(Debug)]
pub struct ClipGroup {
    name: String,
    range: TimeRange,
    caps: Option<Caps>,
    expose_port: bool,
    accept_seeks: bool,
    accept_state_changes: bool,
    shared: Rc<RefCell<Cursor>>,
}

#[derive(Debug, Default)]
struct Cursor {
    clips: Vec<Clip>,
    segment: Option<Segment>,
    position: ClockTime,
    generation: u64,
    state: State,
    seeks: u64,
}

#[derive(Clone, Debug)]
struct Segment {
    clip: usize,
    next: ClockTime,
    end: ClockTime,
}

impl ClipGroup {
    /// Empty group scheduled over `range`.
    pub fn new(name: impl Into<String>, range: TimeRange) -> Self {
        Self {
            name: name.into(),
            range,
            caps: None,
            expose_port: true,
            accept_seeks: true,
            accept_state_changes: true,
            shared: Rc::new(RefCell::new(Cursor {
                position: range.start,
                ..Cursor::default()
            })),
        }
    }

    /// Group holding one clip spanning its whole range.
    pub fn single(
        name: impl Into<String>,
        range: TimeRange,
        frame_duration: ClockTime,
    ) -> CutlineResult<Self> {
        let name = name.into();
        Self::new(name.clone(), range).with_clip(Clip {
            name,
            range,
            frame_duration,
        })
    }

    /// Add a clip. Clips are kept sorted by start; zero frame durations are rejected.
    pub fn with_clip(self, clip: Clip) -> CutlineResult<Self> {
        if clip.frame_duration == ClockTime::ZERO || !clip.frame_duration.is_valid() {
            return Err(CutlineError::validation(format!(
                "clip '{}' needs a valid non-zero frame duration",
                clip.name
            )));
        }
        if clip.range.is_open_ended() {
            return Err(CutlineError::validation(format!(
                "clip '{}' must have a bounded range",
                clip.name
            )));
        }
        {
            let mut cur = self.shared.borrow_mut();
            cur.clips.push(clip);
            cur.clips.sort_by_key(|c| c.range.start);
        }
        Ok(self)
    }

    /// Advertise a format on every port this group hands out.
    pub fn with_caps(mut self, caps: Caps) -> Self {
        self.caps = Some(caps);
        self
    }

    /// Never hand out an output port.
    pub fn without_port(mut self) -> Self {
        self.expose_port = false;
        self
    }

    /// Reject every seek.
    pub fn rejecting_seeks(mut self) -> Self {
        self.accept_seeks = false;
        self
    }

    /// Fail every state change.
    pub fn rejecting_state_changes(mut self) -> Self {
        self.accept_state_changes = false;
        self
    }

    /// Number of seeks accepted so far.
    pub fn seek_count(&self) -> u64 {
        self.shared.borrow().seeks
    }

    /// State last applied through [`Group::set_state`].
    pub fn state(&self) -> State {
        self.shared.borrow().state
    }

    /// Observer that stays valid after the group is boxed and handed to a timeline.
    pub fn probe(&self) -> ClipGroupProbe {
        ClipGroupProbe {
            shared: Rc::clone(&self.shared),
        }
    }
}

/// Read-only view onto a [`ClipGroup`]'s counters, for tests and diagnostics.
#[derive(Clone, Debug)]
pub struct ClipGroupProbe {
    shared: Rc<RefCell<Cursor>>,
}

impl ClipGroupProbe {
    /// Number of seeks accepted so far.
    pub fn seek_count(&self) -> u64 {
        self.shared.borrow().seeks
    }

    /// State last applied to the group.
    pub fn state(&self) -> State {
        self.shared.borrow().state
    }

    /// Current position of the group.
    pub fn position(&self) -> ClockTime {
        self.shared.borrow().position
    }
}

fn build_segment(clips: &[Clip], seek: TimeRange, bounds: TimeRange) -> Option<Segment> {
    let from = seek.start.max(bounds.start);
    let limit = seek.stop.min(bounds.stop);
    let (idx, clip) = clips
        .iter()
        .enumerate()
        .find(|(_, c)| c.range.stop > from && c.range.start < limit)?;

    let first = if clip.range.start >= from {
        clip.range.start
    } else {
        // Accurate positioning: first frame boundary at or after `from`.
        let offset = from.nanos() - clip.range.start.nanos();
        let fd = clip.frame_duration.nanos();
        let frames = offset.div_ceil(fd);
        ClockTime(clip.range.start.nanos().saturating_add(frames.saturating_mul(fd)))
    };
    Some(Segment {
        clip: idx,
        next: first,
        end: clip.range.stop.min(limit),
    })
}

impl Group for ClipGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn range(&self) -> TimeRange {
        self.range
    }

    fn set_range(&mut self, range: TimeRange) {
        self.range = range;
    }

    fn output_port(&mut self) -> Option<Box<dyn Port>> {
        if !self.expose_port {
            return None;
        }
        let generation = self.shared.borrow().generation;
        Some(Box::new(ClipPort {
            name: format!("{}_src_{generation}", self.name),
            generation,
            caps: self.caps.clone(),
            shared: Rc::clone(&self.shared),
        }))
    }

    fn position(&self) -> ClockTime {
        self.shared.borrow().position
    }

    fn send_seek(&mut self, seek: &SeekEvent) -> bool {
        if !self.accept_seeks {
            return false;
        }
        let mut cur = self.shared.borrow_mut();
        let segment = build_segment(&cur.clips, seek.range, self.range);
        cur.position = match &segment {
            Some(s) => s.next,
            None => seek.range.start.max(self.range.start),
        };
        cur.segment = segment;
        cur.generation += 1;
        cur.seeks += 1;
        true
    }

    fn covers(&self, range: TimeRange) -> bool {
        let cur = self.shared.borrow();
        cur.clips.iter().any(|c| {
            let placed = TimeRange {
                start: c.range.start.max(self.range.start),
                stop: c.range.stop.min(self.range.stop),
            };
            placed.start < placed.stop && placed.intersects(range)
        })
    }

    fn set_state(&mut self, state: State) -> bool {
        if !self.accept_state_changes {
            return false;
        }
        self.shared.borrow_mut().state = state;
        true
    }
}

/// Output port of a [`ClipGroup`], valid until the group's next seek.
#[derive(Debug)]
pub struct ClipPort {
    name: String,
    generation: u64,
    caps: Option<Caps>,
    shared: Rc<RefCell<Cursor>>,
}

impl Port for ClipPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn pull(&mut self) -> CutlineResult<DataUnit> {
        let mut cur = self.shared.borrow_mut();
        if cur.generation != self.generation {
            return Err(CutlineError::pull(format!(
                "port '{}' was invalidated by a seek",
                self.name
            )));
        }
        if cur.state == State::Null {
            return Err(CutlineError::pull(format!(
                "port '{}' pulled while its group is in Null",
                self.name
            )));
        }

        let Some(seg) = cur.segment.clone() else {
            return Ok(DataUnit::EndOfStream);
        };
        if seg.next >= seg.end {
            cur.position = seg.end;
            cur.segment = None;
            return Ok(DataUnit::EndOfStream);
        }

        let clip = &cur.clips[seg.clip];
        let duration = clip.frame_duration.min(seg.end.saturating_sub(seg.next));
        let buf = Buffer {
            timestamp: seg.next,
            duration,
            data: clip.name.as_bytes().to_vec(),
        };
        let next = seg.next.saturating_add(clip.frame_duration);
        cur.position = seg.next.saturating_add(duration);
        cur.segment = Some(Segment { next, ..seg });
        Ok(DataUnit::Buffer(buf))
    }

    fn caps(&self) -> Option<Caps> {
        self.caps.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/clip_group.rs"]
mod tests;
