//! Error types for the Oracle adapter.

use sqljson_core::JsonError;
use thiserror::Error;

/// Class of a driver-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// The server rejected the statement.
    Database,
    /// The client library failed (closed cursor, lost connection).
    Interface,
}

/// Error reported by the underlying Oracle driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    pub kind: DriverErrorKind,
    /// Oracle error number (`ORA-nnnnn`), when the driver reports one.
    pub code: Option<i32>,
    pub message: String,
}

impl DriverError {
    pub fn database(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            kind: DriverErrorKind::Database,
            code,
            message: message.into(),
        }
    }

    pub fn interface(message: impl Into<String>) -> Self {
        Self {
            kind: DriverErrorKind::Interface,
            code: None,
            message: message.into(),
        }
    }
}

/// Errors raised by the adapter cursor and connection.
#[derive(Debug, Error)]
pub enum OracleError {
    /// A constraint was violated.
    #[error("integrity error: {0}")]
    Integrity(DriverError),

    #[error("database error: {0}")]
    Database(DriverError),

    #[error("interface error: {0}")]
    Interface(DriverError),

    /// The statement and its parameters do not line up.
    #[error("parameter error: {0}")]
    Params(String),

    /// A lookup failed to compile.
    #[error(transparent)]
    Compile(#[from] JsonError),

    /// A fetched NUMBER could not be converted.
    #[error("cannot convert NUMBER value '{value}': {reason}")]
    Conversion { value: String, reason: String },
}

impl From<DriverError> for OracleError {
    fn from(err: DriverError) -> Self {
        match err.kind {
            DriverErrorKind::Database => OracleError::Database(err),
            DriverErrorKind::Interface => OracleError::Interface(err),
        }
    }
}

impl OracleError {
    pub(crate) fn params(message: impl Into<String>) -> Self {
        OracleError::Params(message.into())
    }

    /// Whether the server (rather than the client) raised the error.
    pub fn is_database_error(&self) -> bool {
        matches!(self, OracleError::Integrity(_) | OracleError::Database(_))
    }
}

/// Result alias for adapter operations.
pub type OracleResult<T> = Result<T, OracleError>;

/// Translate a driver error.
///
/// A deferred foreign key violated at commit time is reported by Oracle as
/// ORA-02091 ("transaction rolled back") wrapping ORA-02291; it becomes
/// [`OracleError::Integrity`]. Everything else keeps its driver class.
pub fn wrap_oracle_errors(err: DriverError) -> OracleError {
    if err.code == Some(2091) && err.message.contains("ORA-02291") {
        tracing::warn!(code = 2091, message = %err.message, "deferred constraint violated");
        return OracleError::Integrity(err);
    }
    err.into()
}
