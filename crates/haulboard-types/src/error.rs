//! Error types for haulboard

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Broad error categories a caller can act on.
///
/// `NotFound` and `Conflict` mean the caller should refetch state before
/// retrying; `InvalidInput` means the request itself has to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Consignment not found: {0}")]
    ConsignmentNotFound(String),

    #[error("Lorry not found: {0}")]
    LorryNotFound(String),

    #[error("Assignment not found: {0}")]
    AssignmentNotFound(String),

    #[error("Consignment {consignment_id} is already assigned to lorry {lorry_id}")]
    AlreadyAssigned {
        consignment_id: String,
        lorry_id: String,
    },

    #[error("Reorder of lorry {lorry_id} does not match its current jobs: {detail}")]
    ReorderMismatch { lorry_id: String, detail: String },

    #[error("Ordering invariant violated: {0}")]
    OrderingViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConsignmentNotFound(_)
            | Error::LorryNotFound(_)
            | Error::AssignmentNotFound(_) => ErrorKind::NotFound,
            Error::AlreadyAssigned { .. }
            | Error::ReorderMismatch { .. }
            | Error::OrderingViolation(_) => ErrorKind::Conflict,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Io(_) | Error::Json(_) | Error::Csv(_) | Error::Config(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Short hint suitable for showing next to the error in a UI.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "it may have been removed; refresh and try again",
            ErrorKind::Conflict => "someone else changed this lorry; refresh and try again",
            ErrorKind::InvalidInput => "check the values you entered",
            ErrorKind::Internal => "storage or configuration problem",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::ConsignmentNotFound("C1".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::AlreadyAssigned {
                consignment_id: "C1".into(),
                lorry_id: "L1".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            Error::InvalidInput("negative".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            Error::Config(ConfigError::NotFound).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_already_assigned_message_names_both_ids() {
        let err = Error::AlreadyAssigned {
            consignment_id: "C7".into(),
            lorry_id: "L2".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("C7"));
        assert!(msg.contains("L2"));
    }
}
