//! Error types and the integer sentinels they map to in item reports.

use std::{io, path::PathBuf};

use command_runner::CommandResult;
use thiserror::Error;

/// Collection creation failed: the external command or local directory step.
pub const CREATE_FAILED: i32 = -1;
/// The expected identifier or table row was not in the command output.
pub const PATTERN_NOT_FOUND: i32 = -2;
/// The identifier or table row was present but carried no value.
pub const EMPTY_CAPTURE: i32 = -3;

/// Output of the external CLI did not have the expected shape.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Field or row is absent.
    #[error("expected field not found in command output")]
    NotFound,
    /// Field is there but blank.
    #[error("field found in command output but it is empty")]
    Empty,
}

impl ParseError {
    /// Sentinel code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound => PATTERN_NOT_FOUND,
            Self::Empty => EMPTY_CAPTURE,
        }
    }
}

/// Failure while creating a guest collection.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Local directory could not be created.
    #[error("could not create local directory {}: {source}", .path.display())]
    LocalDir {
        /// Directory we tried to create.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// `collection create guest` exited nonzero.
    #[error("collection create exited with code {0}")]
    CommandFailed(i32),
    /// Collection id could not be read from the output.
    #[error("collection id: {0}")]
    Parse(#[from] ParseError),
}

impl CollectionError {
    /// Sentinel code reported for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::LocalDir { .. } | Self::CommandFailed(_) => CREATE_FAILED,
            Self::Parse(e) => e.code(),
        }
    }

    /// Flatten into the `(code, payload)` pair used by item reports.
    pub fn into_result(self) -> CommandResult {
        match self {
            Self::LocalDir { .. } => CommandResult::new(CREATE_FAILED, self.to_string()),
            _ => CommandResult::new(self.code(), ""),
        }
    }
}

/// Failure while resolving a contact's email.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// `get-identities` exited nonzero. Carries its result unchanged.
    #[error("identity lookup exited with code {}", .0.code)]
    Lookup(CommandResult),
    /// Email could not be read from the output.
    #[error("identity email: {0}")]
    Parse(#[from] ParseError),
}

impl IdentityError {
    /// Flatten into the `(code, payload)` pair used by item reports.
    pub fn into_result(self) -> CommandResult {
        match self {
            Self::Lookup(result) => result,
            Self::Parse(e) => CommandResult::new(e.code(), ""),
        }
    }
}

/// Problems with the collections mapping file. These abort the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("could not read {}: {source}", .path.display())]
    Read {
        /// Mapping file path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// File is not valid JSON.
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        /// Mapping file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Top level value is not an object.
    #[error("expected a JSON object mapping collection names to contacts")]
    NotAnObject,
    /// A collection name is blank.
    #[error("collection names must not be empty")]
    EmptyName,
    /// A contact is not a non-empty string.
    #[error("contact for collection {0:?} must be a non-empty string")]
    BadContact(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_errors_map_to_sentinels() {
        assert_eq!(
            CollectionError::CommandFailed(1).into_result(),
            CommandResult::new(-1, "")
        );
        assert_eq!(
            CollectionError::from(ParseError::NotFound).into_result(),
            CommandResult::new(-2, "")
        );
        assert_eq!(
            CollectionError::from(ParseError::Empty).into_result(),
            CommandResult::new(-3, "")
        );

        let local = CollectionError::LocalDir {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into_result();
        assert_eq!(local.code, CREATE_FAILED);
        assert!(local.output.contains("/nope"));
    }

    #[test]
    fn failed_lookup_passes_through() {
        let raw = CommandResult::new(4, "No such identity");
        assert_eq!(IdentityError::Lookup(raw.clone()).into_result(), raw);
    }
}
