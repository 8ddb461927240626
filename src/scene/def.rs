use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::compose::timeline::{Timeline, TimelineOpts};
use crate::foundation::core::{ClockTime, TimeRange};
use crate::foundation::error::{CutlineError, CutlineResult};
use crate::media::clip_group::{Clip, ClipGroup};
use crate::pipeline::buffer::Caps;

/// JSON-facing description of a timeline.
///
/// This is the human-edited boundary object; [`TimelineDef::build`] turns it into a live
/// [`Timeline`] made of [`ClipGroup`]s. Times are whole milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineDef {
    /// Timeline name.
    pub name: String,
    /// Scheduling options.
    #[serde(default)]
    pub opts: TimelineOpts,
    /// Groups in scheduling order.
    #[serde(default)]
    pub groups: Vec<GroupDef>,
}

/// One group of a [`TimelineDef`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDef {
    /// Group name; unique within the timeline.
    pub name: String,
    /// Start of the group's span.
    pub start_ms: u64,
    /// End of the group's span; open-ended when absent.
    #[serde(default)]
    pub stop_ms: Option<u64>,
    /// Content of the group's single track.
    #[serde(default)]
    pub clips: Vec<ClipDef>,
    /// Format offered by the group's output port.
    #[serde(default)]
    pub caps: Option<Caps>,
    /// Formats the timeline's relay port for this group accepts.
    #[serde(default)]
    pub allowed_caps: Option<Caps>,
}

/// One clip of a [`GroupDef`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipDef {
    /// Clip name.
    pub name: String,
    /// Start in composition time.
    pub start_ms: u64,
    /// End in composition time (exclusive).
    pub stop_ms: u64,
    /// Buffer spacing.
    pub frame_ms: u64,
}

impl TimelineDef {
    /// Parse a timeline definition from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CutlineResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| CutlineError::validation(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline definition from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CutlineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CutlineError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check names, ranges and frame durations.
    pub fn validate(&self) -> CutlineResult<()> {
        if self.name.trim().is_empty() {
            return Err(CutlineError::validation("timeline name must be non-empty"));
        }
        let mut seen = BTreeSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(CutlineError::validation("group name must be non-empty"));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(CutlineError::validation(format!(
                    "duplicate group name '{}'",
                    group.name
                )));
            }
            group.validate()?;
        }
        Ok(())
    }

    /// Validate and instantiate the timeline. The result is in `Null` and holds one
    /// [`ClipGroup`] per group definition.
    pub fn build(&self) -> CutlineResult<Timeline> {
        self.validate()?;
        let mut timeline = Timeline::with_opts(self.name.clone(), self.opts);
        for def in &self.groups {
            let mut group = ClipGroup::new(def.name.clone(), def.range()?);
            for clip in &def.clips {
                group = group.with_clip(clip.to_clip()?)?;
            }
            if let Some(caps) = &def.caps {
                group = group.with_caps(caps.clone());
            }
            let id = timeline.add_group(group);
            if let Some(allowed) = &def.allowed_caps
                && let Some(port) = timeline.get_port_for_group_mut(id)
            {
                port.set_allowed_caps(Some(allowed.clone()));
            }
        }
        Ok(timeline)
    }
}

impl GroupDef {
    fn range(&self) -> CutlineResult<TimeRange> {
        let stop = self.stop_ms.map_or(ClockTime::NONE, ClockTime::from_millis);
        TimeRange::new(ClockTime::from_millis(self.start_ms), stop).map_err(|_| {
            CutlineError::validation(format!(
                "group '{}' must have start_ms <= stop_ms",
                self.name
            ))
        })
    }

    fn validate(&self) -> CutlineResult<()> {
        self.range()?;
        let mut clips: Vec<&ClipDef> = self.clips.iter().collect();
        for clip in &clips {
            clip.validate(&self.name)?;
        }
        clips.sort_by_key(|c| c.start_ms);
        for pair in clips.windows(2) {
            if pair[1].start_ms < pair[0].stop_ms {
                return Err(CutlineError::validation(format!(
                    "group '{}': clips '{}' and '{}' overlap",
                    self.name, pair[0].name, pair[1].name
                )));
            }
        }
        Ok(())
    }
}

impl ClipDef {
    fn validate(&self, group: &str) -> CutlineResult<()> {
        if self.name.trim().is_empty() {
            return Err(CutlineError::validation(format!(
                "group '{group}': clip name must be non-empty"
            )));
        }
        if self.start_ms >= self.stop_ms {
            return Err(CutlineError::validation(format!(
                "group '{group}': clip '{}' must have start_ms < stop_ms",
                self.name
            )));
        }
        if self.frame_ms == 0 {
            return Err(CutlineError::validation(format!(
                "group '{group}': clip '{}' must have frame_ms > 0",
                self.name
            )));
        }
        Ok(())
    }

    fn to_clip(&self) -> CutlineResult<Clip> {
        Ok(Clip {
            name: self.name.clone(),
            range: TimeRange::new(
                ClockTime::from_millis(self.start_ms),
                ClockTime::from_millis(self.stop_ms),
            )?,
            frame_duration: ClockTime::from_millis(self.frame_ms),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/def.rs"]
mod tests;
