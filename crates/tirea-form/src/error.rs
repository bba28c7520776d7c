//! Error types for tirea-form.

use thiserror::Error;
use tirea_form_state::FormStateError;

/// Result type alias for tirea-form operations.
pub type FormResult<T> = Result<T, FormError>;

/// Errors raised while setting up a form.
///
/// Once a `FormState` exists no transition fails: edit problems surface as
/// validation messages or are absorbed locally.
#[derive(Debug, Error)]
pub enum FormError {
    /// The schema could not be compiled by the validator.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Compiler diagnostic.
        message: String,
    },

    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// Document addressing failed.
    #[error(transparent)]
    State(#[from] FormStateError),
}

impl FormError {
    /// Create an invalid schema error.
    #[inline]
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        FormError::InvalidSchema {
            message: message.into(),
        }
    }
}
