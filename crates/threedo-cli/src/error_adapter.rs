//! Bridges [`ThreedoError`] to miette reports.
//!
//! A failed document load carries one diagnostic per bad definition; each
//! becomes its own [`Reportable`] rendered against the document text.
//! Conversion, I/O and export failures have no span and become a single
//! report with a `threedo::*` code and, where one applies, a hint.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity, SourceCode, SourceSpan};

use threedo::{ConvertError, ThreedoError, TrackHashError};
use threedo_parser::{Span, error::Diagnostic};

/// One renderable failure.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A document diagnostic with its source text.
    Document {
        diagnostic: &'a Diagnostic,
        src: &'a str,
    },
    /// A pipeline error without a location.
    Pipeline(&'a ThreedoError),
}

impl Reportable<'_> {
    fn code_str(&self) -> Option<&'static str> {
        match self {
            Reportable::Document { diagnostic, .. } => diagnostic.code().map(|c| c.as_str()),
            Reportable::Pipeline(err) => Some(pipeline_code(err)),
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Document { diagnostic, .. } => match diagnostic.definition() {
                Some(name) => write!(f, "in `{name}`: {}", diagnostic.message()),
                None => f.write_str(diagnostic.message()),
            },
            Reportable::Pipeline(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Document { .. } => None,
            Reportable::Pipeline(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code_str()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<Severity> {
        match self {
            Reportable::Document { diagnostic, .. } if diagnostic.severity().is_warning() => {
                Some(Severity::Warning)
            }
            _ => Some(Severity::Error),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Document { diagnostic, .. } => diagnostic
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
            Reportable::Pipeline(ThreedoError::Convert(err)) => {
                convert_hint(err).map(|hint| Box::new(hint) as Box<dyn fmt::Display>)
            }
            Reportable::Pipeline(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Reportable::Document { src, .. } => Some(src as &dyn SourceCode),
            Reportable::Pipeline(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Reportable::Document { diagnostic, .. } = self else {
            return None;
        };
        if diagnostic.labels().is_empty() {
            return None;
        }

        Some(Box::new(diagnostic.labels().iter().map(|label| {
            let span = to_source_span(label.span());
            let text = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        })))
    }
}

fn pipeline_code(err: &ThreedoError) -> &'static str {
    match err {
        ThreedoError::Io(_) => "threedo::io",
        ThreedoError::Parse { .. } => "threedo::parse",
        ThreedoError::Config(_) => "threedo::config",
        ThreedoError::Convert(ConvertError::TrackHash(_)) => "threedo::track_hash",
        ThreedoError::Convert(_) => "threedo::convert",
        ThreedoError::Export(_) => "threedo::export",
    }
}

fn convert_hint(err: &ConvertError) -> Option<String> {
    let hint = match err {
        ConvertError::UndefinedReference(name) => {
            format!("add a `{name} : ...;` statement or fix the reference")
        }
        ConvertError::CyclicReference(name) => {
            format!("`{name}` must not contain itself, directly or through other definitions")
        }
        ConvertError::PlaneOutOfRange { .. } => {
            "move the plane points closer together or lower the scale".to_string()
        }
        ConvertError::TrackHash(TrackHashError::MissingDefinition(name)) => {
            format!("define the hash as `{name} : <0, 1, ...>;`")
        }
        ConvertError::TrackHash(TrackHashError::HashNotFirst(name)) => {
            format!("write the track as `LIST ({name}, section1, section2, ...)`")
        }
        ConvertError::TrackHash(TrackHashError::PayloadLength { .. }) => {
            "a track section lists 7 detail levels followed by its DATA record".to_string()
        }
        ConvertError::TrackHash(TrackHashError::IndexOutOfRange { len, .. }) => {
            format!("hash indices count sections from 0 to {}", len.saturating_sub(1))
        }
        _ => return None,
    };
    Some(hint)
}

fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Split a [`ThreedoError`] into the reports to render.
///
/// A document error yields one report per diagnostic, in document order.
pub fn to_reportables(err: &ThreedoError) -> Vec<Reportable<'_>> {
    match err {
        ThreedoError::Parse { err: parse, src } => parse
            .diagnostics()
            .iter()
            .map(|diagnostic| Reportable::Document { diagnostic, src })
            .collect(),
        other => vec![Reportable::Pipeline(other)],
    }
}
