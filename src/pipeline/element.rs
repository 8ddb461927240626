use crate::foundation::core::{ClockTime, TimeRange};
use crate::foundation::error::{CutlineError, CutlineResult};

/// Execution state of an element or group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum State {
    /// No resources held.
    #[default]
    Null,
    /// Resources allocated, not positioned.
    Ready,
    /// Positioned and linked, not streaming.
    Paused,
    /// Streaming.
    Playing,
}

/// One step of the `Null <-> Ready <-> Paused <-> Playing` ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateChange {
    /// `Null -> Ready`.
    NullToReady,
    /// `Ready -> Paused`.
    ReadyToPaused,
    /// `Paused -> Playing`.
    PausedToPlaying,
    /// `Playing -> Paused`.
    PlayingToPaused,
    /// `Paused -> Ready`.
    PausedToReady,
    /// `Ready -> Null`.
    ReadyToNull,
}

impl StateChange {
    /// Source state.
    pub fn source(self) -> State {
        match self {
            Self::NullToReady => State::Null,
            Self::ReadyToPaused | Self::ReadyToNull => State::Ready,
            Self::PausedToPlaying | Self::PausedToReady => State::Paused,
            Self::PlayingToPaused => State::Playing,
        }
    }

    /// Target state.
    pub fn target(self) -> State {
        match self {
            Self::ReadyToNull => State::Null,
            Self::NullToReady | Self::PausedToReady => State::Ready,
            Self::ReadyToPaused | Self::PlayingToPaused => State::Paused,
            Self::PausedToPlaying => State::Playing,
        }
    }

    /// `true` for transitions that move towards `Null`.
    pub fn is_downward(self) -> bool {
        self.target() < self.source()
    }

    /// The single transition between two adjacent states.
    pub fn between(from: State, to: State) -> CutlineResult<Self> {
        match (from, to) {
            (State::Null, State::Ready) => Ok(Self::NullToReady),
            (State::Ready, State::Paused) => Ok(Self::ReadyToPaused),
            (State::Paused, State::Playing) => Ok(Self::PausedToPlaying),
            (State::Playing, State::Paused) => Ok(Self::PlayingToPaused),
            (State::Paused, State::Ready) => Ok(Self::PausedToReady),
            (State::Ready, State::Null) => Ok(Self::ReadyToNull),
            _ => Err(CutlineError::state(format!(
                "no single transition from {from:?} to {to:?}"
            ))),
        }
    }

    /// Every transition needed to walk from `from` to `to`, in order.
    pub fn path(from: State, to: State) -> Vec<Self> {
        const LADDER: [State; 4] = [State::Null, State::Ready, State::Paused, State::Playing];
        let (a, b) = (from as usize, to as usize);
        let mut out = Vec::new();
        if a < b {
            for w in LADDER[a..=b].windows(2) {
                out.extend(Self::between(w[0], w[1]));
            }
        } else {
            for w in LADDER[b..=a].windows(2).rev() {
                out.extend(Self::between(w[1], w[0]));
            }
        }
        out
    }
}

/// Seek behaviour flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeekFlags {
    /// Drop everything queued before repositioning.
    #[serde(default = "default_true")]
    pub flush: bool,
    /// Position exactly on the requested time rather than the nearest keyframe.
    #[serde(default = "default_true")]
    pub accurate: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SeekFlags {
    fn default() -> Self {
        Self {
            flush: true,
            accurate: true,
        }
    }
}

/// A request to reposition playback onto a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekEvent {
    /// Target range.
    pub range: TimeRange,
    /// Behaviour flags.
    pub flags: SeekFlags,
}

impl SeekEvent {
    /// Seek onto `[start, +inf)` with flush and accurate positioning.
    pub fn from_start(start: ClockTime) -> Self {
        Self {
            range: TimeRange::from_start(start),
            flags: SeekFlags::default(),
        }
    }
}

/// Queries an element can answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    /// Current composition-time position.
    Position,
    /// Total length.
    Duration,
}

/// Events an element can receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Reposition.
    Seek(SeekEvent),
    /// Upstream has nothing more to give.
    EndOfStream,
}

/// What the surrounding pipeline runtime needs from an element.
pub trait Element {
    /// Perform one state transition. Failures are fatal to that transition.
    fn change_state(&mut self, transition: StateChange) -> CutlineResult<()>;
    /// Answer a time query; `None` when not available.
    fn query(&self, query: Query) -> Option<ClockTime>;
    /// Handle an event; `false` when it was not handled.
    fn send_event(&mut self, event: Event) -> bool;
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/element.rs"]
mod tests;
