//! Error types for fragment rendering and the host commit cycle.

use thiserror::Error;

/// Errors surfaced while committing fragment output.
///
/// The crate recovers nothing itself: a failing render propagates out of the
/// controller hooks, out of discovery, and out of the host commit that drove
/// them. The fail-open cases (unregistered markers, duplicate registrations)
/// never reach an error path at all.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// A fragment's `render` reported a failure.
    #[error("fragment render failed: {0}")]
    Render(String),
}

impl FragmentError {
    /// Build a render failure from any displayable message.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }
}

/// Result type for fragment operations.
pub type Result<T> = std::result::Result<T, FragmentError>;
