//! Error taxonomy for the parsing pipeline.
//!
//! Errors are collected, not thrown: both the lexer and the parser keep
//! going after a failure so that one pass reports every problem in a file.

use crate::ast::SourceLocation;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    /// An unrecognized byte sequence. The lexer emits an error token and
    /// resumes at the next character.
    #[error("unrecognized character {found:?} at {location}")]
    Lexical {
        found: char,
        location: SourceLocation,
    },

    /// The current token cannot satisfy any production at the current
    /// grammar position. `expected` names the constructs that were being
    /// attempted, for "expected one of ..." diagnostics.
    #[error("unexpected {found} at {location}: expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        location: SourceLocation,
    },

    /// An opening delimiter (`{`, `(`, `/*`) with no matching close before
    /// end of input.
    #[error("unterminated {construct} starting at {location}")]
    Unterminated {
        construct: &'static str,
        location: SourceLocation,
    },
}

impl SyntaxError {
    pub fn location(&self) -> SourceLocation {
        match self {
            SyntaxError::Lexical { location, .. }
            | SyntaxError::UnexpectedToken { location, .. }
            | SyntaxError::Unterminated { location, .. } => *location,
        }
    }
}
