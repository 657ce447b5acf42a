// SPDX-License-Identifier: MPL-2.0-only

use thiserror::Error;

/// Errors reported by [`DockIcon`](crate::DockIcon) and [`ActiveLight`](crate::ActiveLight)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockIconError {
    /// a size was not strictly positive, or an image was missing
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// the icon has no active subscription or indicator
    #[error("dock icon is not set up")]
    NotInitialized,
    /// the icon was already torn down
    #[error("dock icon was already destroyed")]
    AlreadyDestroyed,
}

impl DockIconError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Lifecycle misuse that hosts can safely ignore, e.g. a visibility toggle
    /// racing with teardown in the event queue.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::AlreadyDestroyed)
    }
}

/// check that a dimension is finite and strictly positive
pub(crate) fn positive(value: f32, what: &str) -> Result<f32, DockIconError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DockIconError::invalid(format!("{what} must be positive, got {value}")))
    }
}
