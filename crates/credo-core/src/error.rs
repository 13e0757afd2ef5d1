//! Error types for credo operations.
//!
//! Every fallible operation returns [`CredoResult`]. Variants carry an
//! [`ErrorCode`] so the cycle loop can log a stable, greppable code next to
//! the human message.

use thiserror::Error;

/// Result type alias for credo operations.
pub type CredoResult<T> = Result<T, CredoError>;

/// Main error type for all credo operations.
#[derive(Error, Debug)]
pub enum CredoError {
    /// An observation source failed or timed out.
    #[error("Source error ({source_name}): {message}")]
    Source {
        source_name: String,
        message: String,
        code: ErrorCode,
    },

    /// A goal could not be scored or updated.
    #[error("Goal error ({goal_id}): {message}")]
    Goal {
        goal_id: String,
        message: String,
        code: ErrorCode,
    },

    /// An action could not be dispatched.
    #[error("Action error: {message}")]
    Action { message: String, code: ErrorCode },

    /// Remote coordinator call failed.
    #[error("Remote error: {message}")]
    Remote {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Sources (SRC_xxx)
    SrcCollectFailed,
    SrcTimeout,

    // Goals (GOAL_xxx)
    GoalInvalidValue,

    // Actions (ACT_xxx)
    ActDispatchFailed,

    // Remote (NET_xxx)
    NetTimeout,
    NetConnectionFailed,
    NetRejected,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidTimestamp,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SrcCollectFailed => "SRC_001",
            ErrorCode::SrcTimeout => "SRC_002",
            ErrorCode::GoalInvalidValue => "GOAL_001",
            ErrorCode::ActDispatchFailed => "ACT_001",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::NetRejected => "NET_003",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidTimestamp => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl CredoError {
    /// Create a source collection error.
    pub fn source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
            code: ErrorCode::SrcCollectFailed,
        }
    }

    /// Create a source timeout error.
    pub fn source_timeout(source_name: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: format!("timed out after {:?}", timeout),
            code: ErrorCode::SrcTimeout,
        }
    }

    /// Create an invalid goal value error.
    pub fn invalid_goal(goal_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Goal {
            goal_id: goal_id.into(),
            message: message.into(),
            code: ErrorCode::GoalInvalidValue,
        }
    }

    /// Create an action dispatch error.
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action {
            message: message.into(),
            code: ErrorCode::ActDispatchFailed,
        }
    }

    /// Create a remote error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create a remote rejection error (non-retryable response).
    pub fn remote_rejected(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            code: ErrorCode::NetRejected,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create a timestamp parse error.
    pub fn timestamp(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidTimestamp,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Source { code, .. } => *code,
            Self::Goal { code, .. } => *code,
            Self::Action { code, .. } => *code,
            Self::Remote { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the error is worth retrying (network hiccups, server errors).
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::NetTimeout | ErrorCode::NetConnectionFailed | ErrorCode::SrcTimeout
        )
    }
}

impl From<rusqlite::Error> for CredoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
