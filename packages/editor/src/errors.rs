//! Error types for the editor

use quillpad_model::ModelError;
use thiserror::Error;

/// Failure categories surfaced to the notification collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before mutating
    Validation,
    /// Nothing to do (no matches, nothing to undo, ...)
    NoOp,
    /// Clipboard, decoding or other boundary failure
    External,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NoOp(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl EditError {
    pub fn validation(message: impl Into<String>) -> Self {
        EditError::Validation(message.into())
    }

    pub fn no_op(message: impl Into<String>) -> Self {
        EditError::NoOp(message.into())
    }

    pub fn not_found(id: &str) -> Self {
        EditError::Model(ModelError::NodeNotFound(id.to_string()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::Validation(_) => ErrorKind::Validation,
            EditError::NoOp(_) => ErrorKind::NoOp,
            // A stale object id from a context menu is nothing to act on
            EditError::Model(ModelError::NodeNotFound(_)) => ErrorKind::NoOp,
            EditError::Image(_) | EditError::Model(_) => ErrorKind::External,
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(EditError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(EditError::no_op("x").kind(), ErrorKind::NoOp);
        assert_eq!(EditError::not_found("gone").kind(), ErrorKind::NoOp);

        let undecodable = image::guess_format(b"plain text").unwrap_err();
        assert_eq!(EditError::from(undecodable).kind(), ErrorKind::External);
    }
}
