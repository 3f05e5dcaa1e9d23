//! Lexical analysis of `.3d` documents.
//!
//! Lexing happens in three steps:
//!
//! 1. [`clean_text`] blanks the version header and `%` comment lines. Bytes
//!    are replaced by spaces so every span still points into the original
//!    document.
//! 2. [`split_statements`] cuts the text into statements at each `;` that
//!    ends a line. A `;` with more text after it on the same line belongs to
//!    the statement.
//! 3. [`tokenize`] turns the value of one statement into [`Token`]s: brackets
//!    and `=` are single-character tokens, whitespace and `,` separate tokens,
//!    `"..."` is one quoted token and anything else is a word.

use log::trace;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::take_while,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError, Result},
    span::Span,
    tokens::{PositionedToken, Token},
};

const VERSION_HEADER: &str = "3D VERSION";

/// Blank the leading version header and every `%` comment line.
pub(crate) fn clean_text(source: &str) -> String {
    let mut cleaned = String::with_capacity(source.len());

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let is_header = index == 0 && content.starts_with(VERSION_HEADER);
        let is_comment = content.trim_start().starts_with('%');

        if is_header || is_comment {
            cleaned.extend(std::iter::repeat_n(' ', content.len()));
            cleaned.push_str(&line[content.len()..]);
        } else {
            cleaned.push_str(line);
        }
    }

    cleaned
}

/// Whether the first line is the `3D VERSION` header.
pub(crate) fn has_version_header(source: &str) -> bool {
    source.starts_with(VERSION_HEADER)
}

/// One `;`-terminated statement, trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Statement<'src> {
    text: &'src str,
    offset: usize,
}

/// The `NAME : VALUE` halves of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatementParts<'src> {
    pub name: &'src str,
    pub name_span: Span,
    pub value: &'src str,
    pub value_offset: usize,
}

impl<'src> Statement<'src> {
    pub fn span(&self) -> Span {
        Span::new(self.offset..self.offset + self.text.len())
    }

    /// Split the statement at its first `:`.
    pub fn split_definition(&self) -> Result<StatementParts<'src>> {
        let malformed = || {
            Diagnostic::error("statement is not a definition")
                .with_code(ErrorCode::E401)
                .with_label(self.span(), "expected `NAME : VALUE`")
        };

        let colon = self.text.find(':').ok_or_else(malformed)?;
        let name = self.text[..colon].trim_end();
        if name.is_empty() {
            return Err(malformed());
        }

        let raw_value = &self.text[colon + 1..];
        let value = raw_value.trim_start();
        let value_offset = self.offset + colon + 1 + (raw_value.len() - value.len());

        Ok(StatementParts {
            name,
            name_span: Span::new(self.offset..self.offset + name.len()),
            value,
            value_offset,
        })
    }
}

/// Split cleaned text into statements on each `;` that ends its line.
pub(crate) fn split_statements(text: &str) -> Vec<Statement<'_>> {
    let mut statements = Vec::new();
    let mut start = 0;

    for (index, _) in text.match_indices(';') {
        let rest_of_line = text[index + 1..].split('\n').next().unwrap_or_default();
        if rest_of_line.trim().is_empty() {
            push_statement(&mut statements, text, start, index);
            start = index + 1;
        }
    }
    push_statement(&mut statements, text, start, text.len());

    statements
}

fn push_statement<'src>(
    statements: &mut Vec<Statement<'src>>,
    text: &'src str,
    start: usize,
    end: usize,
) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = raw.len() - raw.trim_start().len();
    statements.push(Statement {
        text: trimmed,
        offset: start + leading,
    });
}

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | '<' | '>' | '=' | '"')
}

/// Whitespace and commas
fn separator<'a>(input: &mut Input<'a>) -> IResult<()> {
    take_while(1.., is_separator).void().parse_next(input)
}

/// A `"..."` literal; everything up to the next quote is taken verbatim.
fn quoted<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    preceded(
        '"',
        cut_err(terminated(take_while(0.., |c: char| c != '"'), '"')).context(
            LexerDiagnostic {
                code: ErrorCode::E001,
                message: "unterminated quoted name",
                help: Some("add a closing `\"`"),
                start,
            },
        ),
    )
    .map(Token::Quoted)
    .parse_next(input)
}

fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '<'.value(Token::LeftAngle),
        '>'.value(Token::RightAngle),
        '='.value(Token::Equals),
    ))
    .parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| !is_separator(c) && !is_delimiter(c))
        .map(Token::Word)
        .parse_next(input)
}

/// Parse one token, or `None` for a run of separators.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<Option<PositionedToken<'a>>> {
    let start = input.current_token_start();

    let token = alt((
        separator.value(None),
        quoted.map(Some),
        single_char_token.map(Some),
        word.map(Some),
    ))
    .parse_next(input)?;

    let end = input.current_token_start();
    Ok(token.map(|token| PositionedToken::new(token, Span::new(start..end))))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
    base: usize,
}

impl<'a> Lexer<'a> {
    fn new(base: usize) -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            base,
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(Some(mut token)) => {
                    token.span = token.span.shifted(self.base);
                    self.tokens.push(token);
                }
                Ok(None) => {}
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = self.convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> std::result::Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|_| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos).shifted(self.base);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1)).shifted(self.base);
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E100)
            .with_label(span, ErrorCode::E100.description())
    }
}

/// Tokenize the value of one statement.
///
/// `base` is the byte offset of `value` inside the document; token spans
/// are document offsets.
pub(crate) fn tokenize(
    value: &str,
    base: usize,
) -> std::result::Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new(base);
    lexer.tokenize(LocatingSlice::new(value));
    let tokens = lexer.finish()?;
    trace!(base, count = tokens.len(); "Tokenized statement");
    Ok(tokens)
}
