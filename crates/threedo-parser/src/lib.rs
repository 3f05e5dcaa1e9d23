//! # Threedo Parser
//!
//! Parser for the `.3d` object description language. A document is a list
//! of `NAME : VALUE ;` definitions; this crate turns it into a table of
//! [`ast::Node`] trees keyed by name.
//!
//! ## Usage
//!
//! ```
//! # use threedo_parser::{parse_document, LoadOptions, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"3D VERSION 3.0;
//!         red : [<0, 0, 0>, c, <5>];
//!         p1 : [<0, 0, 0>];
//!         p2 : [<10, 0, 0>];
//!         p3 : [<0, 10, 0>];
//!         tri : POLY red.c {p1, p2, p3};
//!     "#;
//!
//!     let definitions = parse_document(source, LoadOptions::default())?;
//!     assert!(definitions.contains("red.c"));
//!     Ok(())
//! }
//! ```

pub mod ast;
mod document;
pub mod error;
mod lexer;
mod parser;
#[cfg(test)]
mod parser_tests;
mod span;
mod tokens;

pub use document::{Definitions, LoadOptions, parse_document};
pub use error::ParseError;
pub use span::Span;
