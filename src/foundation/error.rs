/// Convenience result type used across cutline.
pub type CutlineResult<T> = Result<T, CutlineError>;

/// Top-level error taxonomy used by scheduler and timeline APIs.
///
/// Link, seek and pull errors are recovered inside the merge loop and only surface through logs;
/// state errors propagate to whoever requested the transition.
#[derive(thiserror::Error, Debug)]
pub enum CutlineError {
    /// Invalid user-provided or timeline description data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A port could not be linked, unlinked, or used.
    #[error("link error: {0}")]
    Link(String),

    /// A group rejected or failed a seek command.
    #[error("seek error: {0}")]
    Seek(String),

    /// A state transition could not be completed.
    #[error("state error: {0}")]
    State(String),

    /// A group failed while producing its next data unit.
    #[error("pull error: {0}")]
    Pull(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CutlineError {
    /// Build a [`CutlineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CutlineError::Link`] value.
    pub fn link(msg: impl Into<String>) -> Self {
        Self::Link(msg.into())
    }

    /// Build a [`CutlineError::Seek`] value.
    pub fn seek(msg: impl Into<String>) -> Self {
        Self::Seek(msg.into())
    }

    /// Build a [`CutlineError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`CutlineError::Pull`] value.
    pub fn pull(msg: impl Into<String>) -> Self {
        Self::Pull(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
