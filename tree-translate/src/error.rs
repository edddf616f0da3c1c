use crate::Dialect;
use thiserror::Error;

/// Input that could not be turned into a document tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Nothing but whitespace was submitted
    #[error("Input is empty")]
    Empty,

    /// Hand-written parser rejected the input at `offset` (byte position)
    #[error("Invalid {dialect} syntax at offset {offset}: {message}")]
    Syntax {
        dialect: Dialect,
        offset: usize,
        message: String,
    },

    /// The repaired text was still rejected; `text` is what the parser saw
    #[error("Invalid {dialect} input: {message}\n{text}")]
    Invalid {
        dialect: Dialect,
        message: String,
        text: String,
    },
}

impl FormatError {
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            FormatError::Empty => None,
            FormatError::Syntax { dialect, .. } | FormatError::Invalid { dialect, .. } => {
                Some(*dialect)
            }
        }
    }
}

/// Result type for parsing operations
pub type FormatResult<T> = Result<T, FormatError>;
