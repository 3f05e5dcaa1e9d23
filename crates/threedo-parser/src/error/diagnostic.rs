//! The core diagnostic type for the `.3d` error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled document spans, help text and the name of
//! the definition it was raised in.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with document location information.
///
/// ```text
/// error[E200]: in `split1`: BSPF expects 3 plane references, found 2
///   --> car.3d:14:10
///    |
/// 14 | split1 : BSPF (p1, p2), a, b, c ;
///    |               ^^^^^^^^ 2 plane references
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
    definition: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use threedo_parser::error::{Diagnostic, ErrorCode};
    /// # use threedo_parser::Span;
    ///
    /// let diag = Diagnostic::error("MIP filename `TOOLONGNAME` is 11 characters long")
    ///     .with_code(ErrorCode::E300)
    ///     .with_label(Span::new(0..13), "longer than 8 characters")
    ///     .with_help("texture filenames are limited to 8 characters");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Name of the definition this diagnostic was raised in, if any.
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attribute this diagnostic to the named definition.
    ///
    /// An existing attribution is kept.
    pub fn in_definition(mut self, name: impl Into<String>) -> Self {
        if self.definition.is_none() {
            self.definition = Some(name.into());
        }
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            definition: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: in `name`: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        if let Some(definition) = &self.definition {
            write!(f, ": in `{}`", definition)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
