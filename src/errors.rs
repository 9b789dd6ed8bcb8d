use thiserror::Error;

/// The result type for the `dfagen` crate.
pub type Result<T> = std::result::Result<T, DfaGenError>;

/// The error type for the `dfagen` crate.
#[derive(Error, Debug)]
pub struct DfaGenError {
    /// The source of the error.
    pub source: Box<DfaGenErrorKind>,
}

impl DfaGenError {
    /// Create a new `DfaGenError`.
    pub fn new(kind: DfaGenErrorKind) -> Self {
        DfaGenError {
            source: Box::new(kind),
        }
    }

    /// Returns the syntax error if this error was raised while parsing a pattern.
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match &*self.source {
            DfaGenErrorKind::SyntaxError(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for DfaGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum DfaGenErrorKind {
    /// The pattern could not be parsed.
    #[error(transparent)]
    SyntaxError(#[from] SyntaxError),

    /// A std::io error occurred while writing generated output.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl From<SyntaxError> for DfaGenError {
    fn from(error: SyntaxError) -> Self {
        DfaGenError::new(DfaGenErrorKind::SyntaxError(error))
    }
}

impl From<std::io::Error> for DfaGenError {
    fn from(error: std::io::Error) -> Self {
        DfaGenError::new(DfaGenErrorKind::IoError(error))
    }
}

/// Errors of the pattern syntax.
/// Positions are 0-based character offsets into the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The pattern is empty.
    #[error("empty pattern")]
    EmptyPattern,

    /// A `[` without a matching `]`.
    #[error("unterminated character class starting at position {0}")]
    UnterminatedCharacterClass(usize),

    /// A `[]` without any character in it.
    #[error("empty character class at position {0}")]
    EmptyCharacterClass(usize),

    /// A range whose upper bound is below its lower bound, e.g. `z-a`.
    #[error("descending range '{start}-{end}' at position {position}")]
    DescendingRange {
        /// The lower bound as written.
        start: char,
        /// The upper bound as written.
        end: char,
        /// The position of the upper bound.
        position: usize,
    },

    /// A `)` without a matching `(`.
    #[error("unmatched ')' at position {0}")]
    UnmatchedClosingParenthesis(usize),

    /// A `(` that is never closed.
    #[error("unmatched '(' at position {0}")]
    UnmatchedOpeningParenthesis(usize),

    /// A group without content, i.e. `()`.
    #[error("empty group at position {0}")]
    EmptyGroup(usize),

    /// An operator that lacks one of its operands.
    #[error("operator '{operator}' at position {position} is missing an operand")]
    MissingOperand {
        /// The operator as written in the pattern.
        operator: char,
        /// The position of the operator.
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let error: DfaGenError = SyntaxError::UnterminatedCharacterClass(3).into();
        assert_eq!(
            error.to_string(),
            "unterminated character class starting at position 3"
        );
        assert_eq!(
            error.syntax_error(),
            Some(&SyntaxError::UnterminatedCharacterClass(3))
        );
    }

    #[test]
    fn test_io_error_is_not_a_syntax_error() {
        let error: DfaGenError = std::io::Error::new(std::io::ErrorKind::Other, "closed").into();
        assert!(error.syntax_error().is_none());
        assert!(matches!(*error.source, DfaGenErrorKind::IoError(_)));
    }
}
