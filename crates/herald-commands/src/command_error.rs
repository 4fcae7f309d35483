use herald_permissions::PermissionError;
use serde::Serialize;
use thiserror::Error;

use crate::host::HostError;
use crate::option_schema::ValidationFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Entity kinds whose absence is reported with a dedicated message.
pub enum LookupTarget {
    User,
    Member,
}

impl LookupTarget {
    pub fn not_found_message(self) -> &'static str {
        match self {
            Self::User => "User not found.",
            Self::Member => "User is not a member of this server.",
        }
    }
}

/// Terminal failure of one invocation; every variant renders to one user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("{}", .0.not_found_message())]
    NotFound(LookupTarget),
    #[error("This command must be run inside a server.")]
    ContextMissing,
    #[error(transparent)]
    UnknownPermission(#[from] PermissionError),
    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `CommandErrorKind` values.
pub enum CommandErrorKind {
    ValidationFailure,
    LookupNotFound,
    ContextMissing,
    UnknownPermission,
    TransportOrHostFailure,
}

impl CommandError {
    pub fn kind(&self) -> CommandErrorKind {
        match self {
            Self::Validation(_) => CommandErrorKind::ValidationFailure,
            Self::NotFound(_) => CommandErrorKind::LookupNotFound,
            Self::ContextMissing => CommandErrorKind::ContextMissing,
            Self::UnknownPermission(_) => CommandErrorKind::UnknownPermission,
            Self::Host(_) => CommandErrorKind::TransportOrHostFailure,
        }
    }

    /// Renders the message posted back to the conversation.
    ///
    /// Host failures are prefixed with the command's failure label; every other
    /// kind already carries its own wording.
    pub fn user_message(&self, failure_label: &str) -> String {
        match self {
            Self::Host(error) => format!("{failure_label}: {error}"),
            other => other.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
