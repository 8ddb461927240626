use std::collections::BTreeMap;

use crate::foundation::core::ClockTime;

/// One unit of media data travelling through a port.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Buffer {
    /// Presentation timestamp in composition time; [`ClockTime::NONE`] when unknown.
    pub timestamp: ClockTime,
    /// Duration; [`ClockTime::NONE`] when unknown.
    pub duration: ClockTime,
    /// Opaque payload.
    pub data: Vec<u8>,
}

impl Buffer {
    /// A payload-less buffer, handy for timing-only streams.
    pub fn empty(timestamp: ClockTime, duration: ClockTime) -> Self {
        Self {
            timestamp,
            duration,
            data: Vec::new(),
        }
    }
}

/// What a single pull on a port yields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataUnit {
    /// Ordinary data.
    Buffer(Buffer),
    /// The port has nothing more to offer at present.
    EndOfStream,
}

/// Media format description used for pass-through format queries and link negotiation.
///
/// `None` in any `Option<Caps>` position means "anything".
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Caps {
    /// Media type, e.g. `video/x-raw`.
    pub media_type: String,
    /// Fixed fields, e.g. `width = 1920`.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Caps {
    /// Caps with a media type and no fields.
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Common subset of two descriptions, or `None` when they cannot agree.
    pub fn intersect(&self, other: &Caps) -> Option<Caps> {
        if self.media_type != other.media_type {
            return None;
        }
        let mut fields = self.fields.clone();
        for (k, v) in &other.fields {
            match fields.get(k) {
                Some(existing) if existing != v => return None,
                Some(_) => {}
                None => {
                    fields.insert(k.clone(), v.clone());
                }
            }
        }
        Some(Caps {
            media_type: self.media_type.clone(),
            fields,
        })
    }
}

/// Intersect two optional descriptions where `None` is "anything".
///
/// Returns `Err(())` when both sides are constrained and incompatible.
pub(crate) fn intersect_opt(a: Option<&Caps>, b: Option<&Caps>) -> Result<Option<Caps>, ()> {
    match (a, b) {
        (None, None) => Ok(None),
        (Some(c), None) | (None, Some(c)) => Ok(Some(c.clone())),
        (Some(a), Some(b)) => a.intersect(b).map(Some).ok_or(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/buffer.rs"]
mod tests;
