use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyPayload,
    NegativePosition,
    MissingField,
    ProjectNotFound,
    CaseNotFound,
    StepNotFound,
    VersionNotFound,
    SiblingNotInSet,
    Conflict,
    StoreFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyPayload => "E1001",
            Self::NegativePosition => "E1002",
            Self::MissingField => "E1003",
            Self::ProjectNotFound => "E2001",
            Self::CaseNotFound => "E2002",
            Self::StepNotFound => "E2003",
            Self::VersionNotFound => "E2004",
            Self::SiblingNotInSet => "E2005",
            Self::Conflict => "E3001",
            Self::StoreFailure => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyPayload => "Request payload is empty",
            Self::NegativePosition => "Position must be non-negative",
            Self::MissingField => "Required field is missing",
            Self::ProjectNotFound => "Project not found",
            Self::CaseNotFound => "Test case not found",
            Self::StepNotFound => "Test step not found",
            Self::VersionNotFound => "Version not found",
            Self::SiblingNotInSet => "Id does not belong to this sibling set",
            Self::Conflict => "Concurrent modification conflict",
            Self::StoreFailure => "Store operation failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyPayload => Some("Provide at least one id/position entry."),
            Self::NegativePosition => Some("Use a position of 0 or greater."),
            Self::MissingField => Some("Fill in the named field and retry."),
            Self::ProjectNotFound | Self::CaseNotFound | Self::StepNotFound => None,
            Self::VersionNotFound => {
                Some("Check the version id and that it belongs to this test case.")
            }
            Self::SiblingNotInSet => {
                Some("Reorder payloads may only reference current siblings of the scope.")
            }
            Self::Conflict => Some("Reload the sibling set and retry the operation."),
            Self::StoreFailure => Some("Retry once. If persistent, check the store file and logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The entity kinds a not-found error can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Case,
    Step,
    Version,
}

impl EntityKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Case => "test case",
            Self::Step => "test step",
            Self::Version => "version",
        }
    }

    const fn not_found_code(self) -> ErrorCode {
        match self {
            Self::Project => ErrorCode::ProjectNotFound,
            Self::Case => ErrorCode::CaseNotFound,
            Self::Step => ErrorCode::StepNotFound,
            Self::Version => ErrorCode::VersionNotFound,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy for coordinator and version-store operations.
///
/// Cross-scope access (an entity that exists but under a different
/// ancestor) is deliberately reported as `NotFound`, never as a distinct
/// kind, so callers cannot probe for existence with guessed ids.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or empty input; no store access has occurred.
    #[error("validation failed: {reason}")]
    Validation {
        reason: String,
        code: ErrorCode,
    },

    /// Referenced entity does not exist in the requested scope.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    /// Reserved for a future optimistic-concurrency check; never raised.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying store failure; the transaction has been rolled back.
    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn validation(reason: impl Into<String>, code: ErrorCode) -> Self {
        Self::Validation {
            reason: reason.into(),
            code,
        }
    }

    pub(crate) const fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// The machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { kind, .. } => kind.not_found_code(),
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Store(_) => ErrorCode::StoreFailure,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
