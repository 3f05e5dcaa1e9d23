//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the document.
///
/// Primary labels mark where the problem is; secondary labels add context,
/// such as where a duplicated name was first defined.
///
/// ```text
/// error[E400]: `wall` is defined multiple times
///   --> track.3d:12:1
///    |
/// 12 | wall : POLY T c1 {v1, v2, v3} ;
///    | ^^^^ duplicate definition
///    |
///   --> track.3d:5:1
///    |
///  5 | wall : NIL ;
///    | ---- first defined here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
