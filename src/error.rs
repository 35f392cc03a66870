// Error types shared by the registry, the coordinator and the feed loaders

use thiserror::Error;

// Failures surfaced by check-in operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckInError {
    #[error("Invalid booking reference format: {0}")]
    InvalidReferenceFormat(String),

    #[error("Duplicate booking reference: {0}")]
    DuplicateReference(String),

    #[error("No booking reference on record: {0}")]
    UnknownReference(String),

    #[error("Booking reference is already checked in: {0}")]
    AlreadyCheckedIn(String),

    #[error("Check-in failed for {reference}: {reason}")]
    CheckInFailed { reference: String, reason: String },

    #[error("Unknown flight code: {0}")]
    UnknownFlight(String),
}

// Faults raised while loading a source feed or the simulation config.
// These are fatal to the load step only.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Duplicate flight code: {0}")]
    DuplicateFlight(String),

    #[error("Invalid limits for flight {code}: {reason}")]
    InvalidFlight { code: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// A per-record problem in the passenger feed. Loading carries on past these.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedIssue {
    pub line: usize,
    pub kind: FeedIssueKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedIssueKind {
    Malformed(String),
    InvalidReference(String),
    DuplicateReference(String),
    UnknownFlight(String),
}

impl std::fmt::Display for FeedIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FeedIssueKind::Malformed(reason) => write!(f, "line {}: malformed record: {}", self.line, reason),
            FeedIssueKind::InvalidReference(r) => {
                write!(f, "line {}: invalid booking reference {}", self.line, r)
            }
            FeedIssueKind::DuplicateReference(r) => {
                write!(f, "line {}: duplicate booking reference {}", self.line, r)
            }
            FeedIssueKind::UnknownFlight(code) => {
                write!(f, "line {}: unknown flight code {}", self.line, code)
            }
        }
    }
}
