//! The error type of the threedo pipeline.
//!
//! Each stage contributes one variant: reading files, loading the document,
//! configuration, lowering and exporting.

use std::io;

use thiserror::Error;

use threedo_parser::error::ParseError;

use crate::convert::ConvertError;

/// Any failure of a load-convert-export run.
///
/// Only [`ThreedoError::Parse`] has source locations; it keeps the document
/// text so its diagnostics can be rendered later.
#[derive(Debug, Error)]
pub enum ThreedoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for ThreedoError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl ThreedoError {
    /// A `Parse` error paired with the document it was raised for.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
