//! Error types for the dialogue engine.

use thiserror::Error;

use crate::check::ResponseCategory;

/// Result type for dialogue operations.
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Errors that can occur while running a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    /// The option index is out of range for the current node.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// The speaker has no scripted nodes.
    #[error("no dialogue available for {0}")]
    NoDialogue(String),

    /// Dialogue content could not be parsed.
    #[error("invalid dialogue content: {0}")]
    InvalidContent(String),

    /// Dialogue content lacks a fallback response for a category.
    #[error("missing fallback response for {0}")]
    MissingFallback(ResponseCategory),

    /// A roster operation failed.
    #[error(transparent)]
    Core(#[from] ere_core::CoreError),
}
