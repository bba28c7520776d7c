//! Error types for tirea-form-state operations.

use crate::{JsonValue, Path};
use thiserror::Error;

/// Result type alias for tirea-form-state operations.
pub type FormStateResult<T> = Result<T, FormStateError>;

/// Errors that can occur while addressing a document.
#[derive(Debug, Error)]
pub enum FormStateError {
    /// Path does not exist in the document.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path that was not found.
        path: Path,
    },

    /// Array index is past the end of the array.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the array.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the array.
        len: usize,
    },

    /// A path tried to descend through a value that is not a container, or
    /// used a non-numeric segment on an array.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: Path,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        found: &'static str,
    },

    /// A string could not be parsed as a JSON pointer.
    #[error("invalid pointer: {pointer:?}")]
    InvalidPointer {
        /// The offending input.
        pointer: String,
    },
}

impl FormStateError {
    /// Create a path not found error.
    #[inline]
    pub fn path_not_found(path: Path) -> Self {
        FormStateError::PathNotFound { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        FormStateError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        FormStateError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    #[inline]
    pub fn invalid_pointer(pointer: impl Into<String>) -> Self {
        FormStateError::InvalidPointer {
            pointer: pointer.into(),
        }
    }
}

/// Get the type name of a document value.
#[inline]
pub fn value_type_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
