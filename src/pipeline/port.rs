use crate::foundation::error::{CutlineError, CutlineResult};
use crate::pipeline::buffer::{Caps, DataUnit};

/// Unidirectional data connection exposed by a sub-pipeline.
///
/// Implemented by the pipeline engine that owns the group's sub-graph. A pull may block for as
/// long as the group needs to produce its next unit.
pub trait Port {
    /// Port name, for logging.
    fn name(&self) -> &str;
    /// Produce the next data unit.
    fn pull(&mut self) -> CutlineResult<DataUnit>;
    /// Formats this port can produce; `None` means "anything".
    fn caps(&self) -> Option<Caps> {
        None
    }
}

/// Receiving end of a relay. Holds at most one upstream peer.
///
/// The binding is an owned handle: [`InputPort::unlink`] hands the old peer back, so a stale
/// handle cannot be pulled from after a relink.
pub struct InputPort {
    name: String,
    peer: Option<Box<dyn Port>>,
}

impl std::fmt::Debug for InputPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputPort")
            .field("name", &self.name)
            .field("peer", &self.peer.as_ref().map(|p| p.name().to_owned()))
            .finish()
    }
}

impl InputPort {
    /// Create an unlinked input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            peer: None,
        }
    }

    /// Port name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` while an upstream peer is bound.
    pub fn is_linked(&self) -> bool {
        self.peer.is_some()
    }

    /// Name of the bound peer, if any.
    pub fn peer_name(&self) -> Option<&str> {
        self.peer.as_deref().map(|p| p.name())
    }

    /// Bind an upstream peer. Fails when a peer is already bound; unlink first.
    pub fn link(&mut self, peer: Box<dyn Port>) -> CutlineResult<()> {
        if let Some(existing) = &self.peer {
            return Err(CutlineError::link(format!(
                "'{}' is already linked to '{}'",
                self.name,
                existing.name()
            )));
        }
        self.peer = Some(peer);
        Ok(())
    }

    /// Release the upstream peer, returning it to the caller.
    pub fn unlink(&mut self) -> Option<Box<dyn Port>> {
        self.peer.take()
    }

    /// Pull one unit from the bound peer.
    pub fn pull(&mut self) -> CutlineResult<DataUnit> {
        match self.peer.as_mut() {
            Some(peer) => peer.pull(),
            None => Err(CutlineError::link(format!("'{}' is not linked", self.name))),
        }
    }

    /// Formats offered by the upstream peer.
    pub fn peer_caps(&self) -> Option<Caps> {
        self.peer.as_ref().and_then(|p| p.caps())
    }
}

/// Sending end of a relay, as seen by downstream consumers.
#[derive(Clone, Debug)]
pub struct OutputPort {
    name: String,
    active: bool,
    allowed: Option<Caps>,
}

impl OutputPort {
    /// Create an active output that accepts anything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            allowed: None,
        }
    }

    /// Port name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `false` once the relay behind this port is exhausted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Formats the downstream consumer accepts; `None` means "anything".
    pub fn allowed_caps(&self) -> Option<&Caps> {
        self.allowed.as_ref()
    }

    /// Restrict the formats the downstream consumer accepts.
    pub fn set_allowed_caps(&mut self, caps: Option<Caps>) {
        self.allowed = caps;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/port.rs"]
mod tests;
