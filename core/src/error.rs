//! Error types for lookup compilation, parsing and field validation.

use thiserror::Error;

/// Errors raised while building or compiling JSON lookups.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The lookup exists but the target backend cannot express it.
    #[error("{lookup} lookup is not supported by this database backend.")]
    NotSupported { lookup: String, backend: String },

    /// A value failed JSON field validation.
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// The encoder could not serialize the value.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The right-hand side does not fit the lookup.
    #[error("invalid value for {lookup} lookup: {reason}")]
    InvalidRhs { lookup: String, reason: String },

    /// The lookup cannot be applied to this left-hand expression.
    #[error("{lookup} lookup cannot be applied to {target}")]
    InvalidLookup { lookup: String, target: String },

    /// A filter key referenced a field the schema does not know.
    #[error("unknown field '{name}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UnknownField {
        name: String,
        suggestion: Option<String>,
    },

    /// A filter key referenced a table the schema does not know.
    #[error("unknown table '{name}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UnknownTable {
        name: String,
        suggestion: Option<String>,
    },

    /// A filter key referenced a field that is not a JSON column.
    #[error("field '{0}' is not a JSON column")]
    NotJson(String),

    /// Malformed filter key or dialect name.
    #[error("parse error: {0}")]
    Parse(String),
}

impl JsonError {
    pub(crate) fn not_supported(lookup: impl ToString, backend: impl ToString) -> Self {
        JsonError::NotSupported {
            lookup: lookup.to_string(),
            backend: backend.to_string(),
        }
    }

    pub(crate) fn invalid_rhs(lookup: impl ToString, reason: impl Into<String>) -> Self {
        JsonError::InvalidRhs {
            lookup: lookup.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable code for validation errors, `None` for every other kind.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            JsonError::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type JsonResult<T> = Result<T, JsonError>;
