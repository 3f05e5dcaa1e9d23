//! Error and diagnostic system for the `.3d` parser.
//!
//! Every problem found while loading a document is a [`Diagnostic`]: a
//! message with a [`Severity`], an optional [`ErrorCode`], labelled source
//! spans, help text and the name of the definition it belongs to.
//!
//! Statements are parsed independently and their diagnostics collected, so
//! a failed [`parse_document`](crate::parse_document) returns a
//! [`ParseError`] listing every bad definition at once. Warnings alone do
//! not fail a load; they end up on
//! [`Definitions::warnings`](crate::Definitions::warnings).
//!
//! # Example
//!
//! ```
//! # use threedo_parser::error::{Diagnostic, ErrorCode};
//! # use threedo_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::error("`wall` is defined multiple times")
//!     .with_code(ErrorCode::E400)
//!     .with_label(span, "duplicate definition")
//!     .with_secondary_label(original_span, "first defined here")
//!     .with_help("rename one of them or pass --allow-dup");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
