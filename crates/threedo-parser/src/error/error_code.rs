//! Error codes for the `.3d` diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Grammar errors
//! - `E2xx` - Arity errors
//! - `E3xx` - Constraint errors
//! - `E4xx` - Document errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated quoted name.
    ///
    /// A name was opened with a quote but never closed.
    E001,

    // =========================================================================
    // Grammar Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered an item it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The statement ended before a complete construct was parsed.
    E101,

    /// Mismatched bracket.
    ///
    /// A bracket was closed by a different kind of closing bracket.
    E102,

    /// Invalid number.
    ///
    /// A word was found where a number is required.
    E103,

    // =========================================================================
    // Arity Errors (E2xx)
    // =========================================================================
    /// Invalid argument count.
    ///
    /// A keyword received a different number of items than its form requires,
    /// for example a `BSPF` with two plane references or a `DYNAMIC` with
    /// seven fields.
    E200,

    // =========================================================================
    // Constraint Errors (E3xx)
    // =========================================================================
    /// Filename too long.
    ///
    /// A `MIP` or `EXTERN` filename exceeds eight characters.
    E300,

    // =========================================================================
    // Document Errors (E4xx)
    // =========================================================================
    /// Duplicate definition.
    ///
    /// A name was defined more than once and duplicates are not allowed.
    E400,

    /// Malformed statement.
    ///
    /// A statement is not of the form `NAME : VALUE`.
    E401,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            // Grammar errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Arity errors
            ErrorCode::E200 => "E200",
            // Constraint errors
            ErrorCode::E300 => "E300",
            // Document errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated quoted name",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "mismatched bracket",
            ErrorCode::E103 => "invalid number",
            ErrorCode::E200 => "invalid argument count",
            ErrorCode::E300 => "filename too long",
            ErrorCode::E400 => "duplicate definition",
            ErrorCode::E401 => "malformed statement",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E401.to_string(), "E401");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated quoted name");
        assert_eq!(ErrorCode::E200.description(), "invalid argument count");
        assert_eq!(ErrorCode::E300.description(), "filename too long");
        assert_eq!(ErrorCode::E400.description(), "duplicate definition");
    }
}
