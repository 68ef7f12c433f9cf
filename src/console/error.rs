use thiserror::Error;

use crate::storage::StoreError;

/// User-facing console errors. The `Display` text is the exact line printed.
#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("** class name missing **")]
    MissingClassName,

    #[error("** class doesn't exist **")]
    UnknownClass,

    #[error("** instance id missing **")]
    MissingInstanceId,

    #[error("** no instance found **")]
    InstanceNotFound,

    #[error("** attribute name missing **")]
    MissingAttributeName,

    #[error("** value missing **")]
    MissingAttributeValue,

    #[error("** attribute {0} is read-only **")]
    ReadOnlyAttribute(String),

    /// Carries the original input line.
    #[error("*** Unknown syntax: {0}")]
    Syntax(String),

    #[error("*** No help on {0}")]
    NoHelp(String),

    #[error("** unable to save: {0} **")]
    Save(String),
}

impl From<StoreError> for ConsoleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownClass(_) => Self::UnknownClass,
            StoreError::NotFound(_) => Self::InstanceNotFound,
            StoreError::ReservedAttribute(name) => Self::ReadOnlyAttribute(name),
            other => {
                tracing::error!(error = %other, "Failed to persist store");
                Self::Save(other.to_string())
            }
        }
    }
}
