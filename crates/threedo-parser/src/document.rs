//! Loading a whole `.3d` document into a table of named definitions.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};

use crate::{
    ast::Node,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lexer, parser,
    span::Span,
};

/// Options for [`parse_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Let a later definition replace an earlier one with the same name.
    pub allow_duplicates: bool,
}

/// Named definitions of a document, in first-definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    nodes: IndexMap<String, Node>,
    warnings: Vec<Diagnostic>,
}

impl Definitions {
    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Definition names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Name of the first definition.
    pub fn first_name(&self) -> Option<&str> {
        self.nodes.keys().next().map(String::as_str)
    }

    /// Problems that did not stop the load.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Add a `<name>.c` entry for every value with a `c` attribute.
    fn add_colors(&mut self) -> Vec<Diagnostic> {
        let mut colors = Vec::new();
        let mut diagnostics = Vec::new();

        for (name, node) in &self.nodes {
            let Node::Value(value) = node else {
                continue;
            };
            let Some(color) = value.attribute("c") else {
                continue;
            };
            match color.first_number() {
                Some(index) => colors.push((format!("{name}.c"), index as i64)),
                None => diagnostics.push(
                    Diagnostic::error(format!("colour `{color}` is not a number"))
                        .with_code(ErrorCode::E103)
                        .in_definition(name.clone()),
                ),
            }
        }

        for (name, index) in colors {
            assert!(
                !self.nodes.contains_key(&name),
                "colour entry `{name}` collides with a definition"
            );
            debug!(name:% = name, index; "Added colour entry");
            self.nodes.insert(name, Node::Color(index));
        }
        diagnostics
    }
}

impl FromIterator<(String, Node)> for Definitions {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
            warnings: Vec::new(),
        }
    }
}

impl<'a> IntoIterator for &'a Definitions {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Parse a `.3d` document into its definitions.
///
/// Every statement is parsed even after an error, so the returned
/// [`ParseError`] carries the diagnostics of all bad definitions.
pub fn parse_document(source: &str, options: LoadOptions) -> Result<Definitions, ParseError> {
    let text = lexer::clean_text(source);
    let statements = lexer::split_statements(&text);
    info!(statements = statements.len(); "Loading document");

    let mut collector = DiagnosticCollector::new();
    let mut definitions = Definitions::default();
    let mut name_spans: HashMap<String, Span> = HashMap::new();

    if !lexer::has_version_header(source) {
        let first_line = source.find('\n').unwrap_or(source.len());
        collector.emit(
            Diagnostic::warning("document has no version header")
                .with_label(Span::new(0..first_line), "expected `3D VERSION 3.0;` here"),
        );
    }

    for statement in &statements {
        let parts = match statement.split_definition() {
            Ok(parts) => parts,
            Err(diagnostic) => {
                collector.emit(diagnostic);
                continue;
            }
        };

        if let Some(first) = name_spans.get(parts.name) {
            if !options.allow_duplicates {
                collector.emit(
                    Diagnostic::error(format!("`{}` is defined more than once", parts.name))
                        .with_code(ErrorCode::E400)
                        .with_label(parts.name_span, "defined again here")
                        .with_secondary_label(*first, "first defined here")
                        .with_help("pass --allow-dup to keep the last definition"),
                );
                continue;
            }
            info!(name = parts.name; "Replacing duplicate definition");
        } else {
            name_spans.insert(parts.name.to_string(), parts.name_span);
        }

        let tokens = match lexer::tokenize(parts.value, parts.value_offset) {
            Ok(tokens) => tokens,
            Err(err) => {
                for diagnostic in err.into_diagnostics() {
                    collector.emit(diagnostic.in_definition(parts.name));
                }
                continue;
            }
        };

        let end = statement.span().end();
        match parser::parse_statement(&tokens, Span::new(end..end)) {
            Ok((node, trailing)) => {
                if let Some(first) = tokens.len().checked_sub(trailing).and_then(|i| tokens.get(i)) {
                    let span = tokens.last().map_or(first.span, |last| first.span.union(last.span));
                    collector.emit(
                        Diagnostic::warning(format!("{trailing} trailing token(s) ignored"))
                            .with_label(span, "not part of the value")
                            .in_definition(parts.name),
                    );
                }
                debug!(name = parts.name, kind = node.kind(); "Parsed definition");
                definitions.nodes.insert(parts.name.to_string(), node);
            }
            Err(diagnostic) => collector.emit(diagnostic.in_definition(parts.name)),
        }
    }

    for diagnostic in definitions.add_colors() {
        collector.emit(diagnostic);
    }
    definitions.warnings = collector.finish()?;

    info!(
        definitions = definitions.len(),
        warnings = definitions.warnings.len();
        "Document loaded"
    );
    Ok(definitions)
}
