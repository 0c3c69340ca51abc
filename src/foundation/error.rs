/// Crate-wide result alias.
pub type ScrollweaveResult<T> = Result<T, ScrollweaveError>;

/// Errors produced by the animation engine.
///
/// None of these are fatal to the frame loop: callers on the per-frame path turn them into
/// warnings, inert handles or collected [`crate::PropertyFailure`]s.
#[derive(thiserror::Error, Debug)]
pub enum ScrollweaveError {
    /// Invalid construction input (viewport, options, ids).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed trigger range descriptor such as `"top 70%"`.
    #[error("descriptor error: {0}")]
    Descriptor(String),

    /// Invalid animation definition (easing, value, tween).
    #[error("animation error: {0}")]
    Animation(String),

    /// Failure while evaluating or applying an animated value.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// GPU surface allocation or draw failure.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Opaque error from a host collaborator.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollweaveError {
    /// Build a [`ScrollweaveError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrollweaveError::Descriptor`].
    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::Descriptor(msg.into())
    }

    /// Build a [`ScrollweaveError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ScrollweaveError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ScrollweaveError::Gpu`].
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`ScrollweaveError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
