// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for SGF reading, cooking and writing

use thiserror::Error;

/// Errors produced by the SGF layer
///
/// Syntax errors carry a 1-based line and 0-based column and render in the
/// `LINE:COL: message` shape that external tools scrape from diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SgfError {
    /// Grammar or lexical violation with source position
    #[error("{line}:{col}: {message}")]
    Syntax {
        /// 1-based line of the offending token
        line: u64,
        /// 0-based column at token start
        col: u64,
        /// Human-readable description
        message: String,
    },

    /// Value present but domain-invalid
    #[error("{0}")]
    Semantic(String),

    /// Non-numeric or trailing-garbage numeric text
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    /// Malformed move notation
    #[error("Invalid move syntax '{0}'")]
    InvalidMove(String),

    /// Wrong value count for a single-valued property
    #[error("Property '{0}' accepts only one value")]
    ListTooLong(String),

    /// API misuse
    #[error("{0}")]
    Usage(String),

    /// Write attempted on a collection with no game trees
    #[error("Attempt to write an empty collection")]
    EmptyCollection,

    /// Attempt to serialize a non-finite real value
    #[error("Attempt to write NaN")]
    NaN,

    /// Parse cancelled cooperatively by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Stream read or write failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl SgfError {
    /// Build a syntax error at the given token position
    pub fn syntax(line: u64, col: u64, message: impl Into<String>) -> Self {
        SgfError::Syntax {
            line,
            col,
            message: message.into(),
        }
    }

    /// Build a semantic error
    pub fn semantic(message: impl Into<String>) -> Self {
        SgfError::Semantic(message.into())
    }

    /// True for tokenizer/parser grammar violations
    pub fn is_syntax(&self) -> bool {
        matches!(self, SgfError::Syntax { .. })
    }

    /// True for domain-invalid values
    pub fn is_semantic(&self) -> bool {
        matches!(self, SgfError::Semantic(_))
    }
}

impl From<std::io::Error> for SgfError {
    fn from(err: std::io::Error) -> Self {
        SgfError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_position() {
        let err = SgfError::syntax(3, 14, "expected '('");
        assert_eq!(err.to_string(), "3:14: expected '('");
        assert!(err.is_syntax());
    }

    #[test]
    fn empty_collection_message() {
        assert_eq!(
            SgfError::EmptyCollection.to_string(),
            "Attempt to write an empty collection"
        );
    }
}
