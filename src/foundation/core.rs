use crate::foundation::error::{CutlineError, CutlineResult};

/// Composition time in nanoseconds.
///
/// [`ClockTime::NONE`] is both "no timestamp" and "+infinity"; every valid time is strictly less.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ClockTime(pub u64);

impl ClockTime {
    /// Time zero.
    pub const ZERO: Self = Self(0);
    /// Invalid / infinite sentinel.
    pub const NONE: Self = Self(u64::MAX);

    /// Build from nanoseconds.
    pub const fn from_nanos(ns: u64) -> Self {
        Self(ns)
    }

    /// Build from milliseconds, saturating at [`ClockTime::NONE`].
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(1_000_000))
    }

    /// Build from whole seconds, saturating at [`ClockTime::NONE`].
    pub const fn from_secs(s: u64) -> Self {
        Self(s.saturating_mul(1_000_000_000))
    }

    /// Raw nanoseconds.
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Whole milliseconds (truncating).
    pub const fn millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// `true` for every value below the sentinel.
    pub const fn is_valid(self) -> bool {
        self.0 < Self::NONE.0
    }

    /// Add, clamping to [`ClockTime::NONE`]. Adding to an invalid time stays invalid.
    pub fn saturating_add(self, rhs: Self) -> Self {
        if !self.is_valid() || !rhs.is_valid() {
            return Self::NONE;
        }
        Self(self.0.saturating_add(rhs.0))
    }

    /// Subtract, clamping to zero. Subtracting from an invalid time stays invalid.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if !self.is_valid() {
            return Self::NONE;
        }
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_valid() {
            return f.write_str("none");
        }
        let ns = self.0 % 1_000_000_000;
        let total_s = self.0 / 1_000_000_000;
        let (h, m, s) = (total_s / 3600, (total_s / 60) % 60, total_s % 60);
        write!(f, "{h}:{m:02}:{s:02}.{ns:09}")
    }
}

/// Half-open time span `[start, stop)`. A `stop` of [`ClockTime::NONE`] is open-ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: ClockTime,
    /// Exclusive stop, or [`ClockTime::NONE`] for `+inf`.
    pub stop: ClockTime,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::from_start(ClockTime::ZERO)
    }
}

impl TimeRange {
    /// Build a range, rejecting `start > stop` and an invalid `start`.
    pub fn new(start: ClockTime, stop: ClockTime) -> CutlineResult<Self> {
        if !start.is_valid() {
            return Err(CutlineError::validation("TimeRange start must be a valid time"));
        }
        if start > stop {
            return Err(CutlineError::validation("TimeRange start must be <= stop"));
        }
        Ok(Self { start, stop })
    }

    /// `[start, +inf)`.
    pub const fn from_start(start: ClockTime) -> Self {
        Self {
            start,
            stop: ClockTime::NONE,
        }
    }

    /// `true` when the range has no upper bound.
    pub fn is_open_ended(self) -> bool {
        !self.stop.is_valid()
    }

    /// `true` when the range covers no time at all.
    pub fn is_empty(self) -> bool {
        self.start == self.stop
    }

    /// Length of the range; `None` when open-ended.
    pub fn duration(self) -> Option<ClockTime> {
        if self.is_open_ended() {
            return None;
        }
        Some(self.stop.saturating_sub(self.start))
    }

    /// Membership test honoring the half-open convention.
    pub fn contains(self, t: ClockTime) -> bool {
        t.is_valid() && self.start <= t && t < self.stop
    }

    /// `true` when both ranges share at least one instant.
    pub fn intersects(self, other: Self) -> bool {
        self.start < other.stop && other.start < self.stop
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
