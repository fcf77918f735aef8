//! Common result and error types for the Hydra toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a broken invariant inside the generator (a bug), not a
/// problem with the user's grid description. Configuration problems have
/// their own error enums in the crates that detect them.
pub type HydraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the generator, not a user input problem.
///
/// Raised when a produced network violates a structural invariant, for
/// example a node left with two parents after pruning.
#[derive(Debug, thiserror::Error)]
#[error("internal generator error: {message}")]
pub struct InternalError {
    /// What went wrong, naming the offending node where there is one.
    pub message: String,
}

impl InternalError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
