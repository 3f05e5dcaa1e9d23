//! Parser for the tokens of one statement.
//!
//! The grammar is pull-based. Keywords take their payload in one of two
//! ways:
//!
//! - [`Parser::next_item`] pulls exactly one item, so `LIST`, `MATERIAL` and
//!   the split-plane keywords consume a fixed number of items.
//! - [`Parser::collect_rest`] pulls items up to the end of the enclosing
//!   bracket, without consuming the closer. It also stops right after an
//!   unbracketed `{...}` group, which is how `POLY c {a, b, c}` ends. `POLY`,
//!   `LINE` and `DYNAMIC` take their payload this way.
//!
//! Bracketed groups nest strictly: `(` must be closed by `)`, `<` by `>` and
//! so on. An unbracketed `{...}` inside a group also ends that group's item
//! list; the items between it and the closer are parsed and dropped. `=` is a
//! no-op separator everywhere.
//!
//! Single-token rules (separators, closers, keywords) are winnow parsers over
//! the token slice; the item grammar drives them through [`Parser::eat`].

use winnow::{
    Parser as _,
    combinator::repeat,
    error::ModalResult,
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    ast::{
        Bsp, BspKind, Dynamic, Material, Node, Polygon, SuperObject, Switch, SwitchEntry, Value,
        parse_integer, parse_number,
    },
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Longest `MIP`/`EXTERN` filename, in characters.
const MAX_FILENAME_LEN: usize = 8;

/// Number of `DYNAMIC` items: seven numbers plus `EXTERN = "name"`.
const DYNAMIC_ITEMS: usize = 8;

/// A parsed item with the span it was parsed from.
#[derive(Debug)]
struct Parsed {
    node: Node,
    span: Span,
    /// The item was an unbracketed `{...}` group.
    ends_collection: bool,
}

type Tokens<'t, 'src> = TokenSlice<'t, PositionedToken<'src>>;

/// Zero or more `=` separators.
fn separators(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| token.token == Token::Equals)
            .void(),
    )
    .parse_next(input)
}

/// The closing bracket `closer`.
fn closing<'t, 'src: 't>(
    closer: Token<'static>,
) -> impl FnMut(&mut Tokens<'t, 'src>) -> ModalResult<&'t PositionedToken<'src>> {
    move |input: &mut Tokens<'t, 'src>| {
        any.verify(|token: &PositionedToken<'_>| token.token == closer)
            .parse_next(input)
    }
}

/// The bare word `word`.
fn keyword<'t, 'src: 't>(
    word: &'static str,
) -> impl FnMut(&mut Tokens<'t, 'src>) -> ModalResult<&'t PositionedToken<'src>> {
    move |input: &mut Tokens<'t, 'src>| {
        any.verify(|token: &PositionedToken<'_>| token.token == Token::Word(word))
            .parse_next(input)
    }
}

struct Parser<'t, 'src> {
    input: Tokens<'t, 'src>,
    /// Span of the last consumed token.
    last: Span,
    /// Empty span just past the statement, for end-of-input errors.
    end: Span,
}

impl<'t, 'src> Parser<'t, 'src> {
    fn new(tokens: &'t [PositionedToken<'src>], end: Span) -> Self {
        Self {
            input: TokenSlice::new(tokens),
            last: end,
            end,
        }
    }

    fn peek(&self) -> Option<&'t PositionedToken<'src>> {
        self.input.peek_token()
    }

    fn advance(&mut self) -> Option<&'t PositionedToken<'src>> {
        let token = self.input.next_token()?;
        self.last = token.span;
        Some(token)
    }

    /// Run a single-token rule. On a match the token is consumed; otherwise
    /// the input is left untouched.
    fn eat<F>(&mut self, mut rule: F) -> Option<&'t PositionedToken<'src>>
    where
        F: FnMut(&mut Tokens<'t, 'src>) -> ModalResult<&'t PositionedToken<'src>>,
    {
        let token = rule.parse_next(&mut self.input).ok()?;
        self.last = token.span;
        Some(token)
    }

    fn skip_equals(&mut self) {
        // `any` only backtracks, so the repetition stops without an error.
        let _ = separators.parse_next(&mut self.input);
    }

    /// Span of the next token, or the end of the statement.
    fn here(&self) -> Span {
        self.peek().map_or(self.end, |t| t.span)
    }

    fn remaining(&self) -> usize {
        self.input.eof_offset()
    }

    /// Pull exactly one item. Returns `None` at a closing bracket or at the
    /// end of the statement.
    fn next_item(&mut self) -> Result<Option<Parsed>> {
        self.skip_equals();
        match self.peek() {
            None => Ok(None),
            Some(token) if token.is_closer() => Ok(None),
            Some(_) => self.item().map(Some),
        }
    }

    /// Pull one item that must be present.
    fn require_item(&mut self, what: &str) -> Result<Parsed> {
        match self.next_item()? {
            Some(parsed) => Ok(parsed),
            None => Err(self.incomplete(what)),
        }
    }

    /// Pull items to the end of the enclosing level.
    fn collect_rest(&mut self) -> Result<Vec<Parsed>> {
        let mut items = Vec::new();
        while let Some(parsed) = self.next_item()? {
            let ends = parsed.ends_collection;
            items.push(parsed);
            if ends {
                break;
            }
        }
        Ok(items)
    }

    fn incomplete(&self, what: &str) -> Diagnostic {
        let found = match self.peek() {
            Some(token) => format!("`{token}`"),
            None => "end of statement".to_string(),
        };
        Diagnostic::error(format!("expected {what}, found {found}"))
            .with_code(ErrorCode::E101)
            .with_label(self.here(), format!("expected {what}"))
    }

    fn item(&mut self) -> Result<Parsed> {
        let Some(token) = self.advance() else {
            return Err(self.incomplete("an item"));
        };
        let start = token.span;

        let (node, ends_collection) = match &token.token {
            Token::Word(word) => (self.keyword_or_word(word, start)?, false),
            Token::Quoted(text) => (Node::Quoted(text.to_string()), false),
            Token::LeftAngle => (self.vector(token)?, false),
            Token::LeftBracket => (self.value(token)?, false),
            Token::LeftParen => (Node::Items(self.nodes(token)?), false),
            Token::LeftBrace => (Node::Items(self.nodes(token)?), true),
            other => {
                return Err(Diagnostic::error(format!("unexpected `{other}`"))
                    .with_code(ErrorCode::E100)
                    .with_label(start, ErrorCode::E100.description()));
            }
        };

        Ok(Parsed {
            node,
            span: start.union(self.last),
            ends_collection,
        })
    }

    /// Items up to the bracket closing `open`.
    fn sequence(&mut self, open: &PositionedToken<'src>) -> Result<Vec<Parsed>> {
        let Some(closer) = open.closer() else {
            return Err(Diagnostic::error(format!("`{open}` does not open a group"))
                .with_code(ErrorCode::E100)
                .with_label(open.span, ErrorCode::E100.description()));
        };

        let mut items = Vec::new();
        let mut ended = false;
        loop {
            self.skip_equals();
            if self.eat(closing(closer.clone())).is_some() {
                return Ok(items);
            }
            match self.peek() {
                None => {
                    return Err(Diagnostic::error(format!("unclosed `{open}`"))
                        .with_code(ErrorCode::E101)
                        .with_label(self.end, format!("expected `{closer}`"))
                        .with_secondary_label(open.span, "opened here"));
                }
                Some(token) if token.is_closer() => {
                    return Err(Diagnostic::error(format!(
                        "mismatched `{token}`, expected `{closer}`"
                    ))
                    .with_code(ErrorCode::E102)
                    .with_label(token.span, ErrorCode::E102.description())
                    .with_secondary_label(open.span, "opened here"));
                }
                Some(_) => {
                    let parsed = self.item()?;
                    if !ended {
                        ended = parsed.ends_collection;
                        items.push(parsed);
                    }
                }
            }
        }
    }

    fn nodes(&mut self, open: &PositionedToken<'src>) -> Result<Vec<Node>> {
        Ok(self.sequence(open)?.into_iter().map(|p| p.node).collect())
    }

    /// `<...>`
    fn vector(&mut self, open: &PositionedToken<'src>) -> Result<Node> {
        let numbers = self
            .sequence(open)?
            .into_iter()
            .map(|item| expect_number(&item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::Vector(numbers))
    }

    /// `[primary, key, value, ...]`
    fn value(&mut self, open: &PositionedToken<'src>) -> Result<Node> {
        let mut items = self.sequence(open)?.into_iter();
        let Some(primary) = items.next() else {
            return Err(Diagnostic::error("empty value")
                .with_code(ErrorCode::E101)
                .with_label(open.span.union(self.last), "expected a primary item"));
        };

        let mut value = match primary.node {
            Node::Word(word) => match parse_number(&word) {
                Some(n) => Value::new(vec![n]),
                None => Value::marker_value(word),
            },
            node @ (Node::Vector(_) | Node::Items(_)) => match node.numbers() {
                Some(numbers) => Value::new(numbers),
                None => {
                    return Err(Diagnostic::error("value payload is not numeric")
                        .with_code(ErrorCode::E103)
                        .with_label(primary.span, ErrorCode::E103.description()));
                }
            },
            other => {
                return Err(Diagnostic::error(format!(
                    "unexpected {} as value payload",
                    other.kind()
                ))
                .with_code(ErrorCode::E100)
                .with_label(primary.span, ErrorCode::E100.description()));
            }
        };

        while let Some(key) = items.next() {
            let Node::Word(name) = &key.node else {
                return Err(Diagnostic::error(format!(
                    "attribute name must be a word, found {}",
                    key.node.kind()
                ))
                .with_code(ErrorCode::E100)
                .with_label(key.span, "expected attribute name"));
            };
            let Some(attribute) = items.next() else {
                return Err(Diagnostic::error(format!("attribute `{name}` has no value"))
                    .with_code(ErrorCode::E101)
                    .with_label(key.span, "expected a value after this"));
            };
            value = value.with_attribute(name, attribute.node);
        }

        Ok(Node::Value(value))
    }

    fn keyword_or_word(&mut self, word: &str, span: Span) -> Result<Node> {
        match word {
            "NIL" => Ok(Node::Nil),
            "POLY" => self.polygon("POLY", span).map(Node::Poly),
            "LINE" => self.polygon("LINE", span).map(Node::Line),
            "MATERIAL" => self.material(),
            "DYNAMIC" => self.dynamic(span),
            "SWITCH" => self.switch(),
            "SUPEROBJ" => self.super_object(),
            "LIST" => self.list(),
            "DYNO" => self.integers("DYNO").map(Node::Dyno),
            "DATA" => self.integers("DATA").map(Node::Data),
            _ => match BspKind::from_keyword(word) {
                Some(kind) => self.bsp(kind),
                None => Ok(Node::Word(word.to_string())),
            },
        }
    }

    /// `POLY [T] colour {vertices}`
    fn polygon(&mut self, keyword: &str, span: Span) -> Result<Polygon> {
        let mut items = self.collect_rest()?;

        let (Some(vertices), Some(color)) = (items.pop(), items.pop()) else {
            return Err(Diagnostic::error(format!(
                "{keyword} needs a colour and a vertex list"
            ))
            .with_code(ErrorCode::E101)
            .with_label(span.union(self.last), "incomplete polygon"));
        };

        let Node::Items(vertex_nodes) = vertices.node else {
            return Err(Diagnostic::error(format!(
                "{keyword} expects a vertex list, found {}",
                vertices.node.kind()
            ))
            .with_code(ErrorCode::E100)
            .with_label(vertices.span, "expected `{...}` or `(...)`"));
        };

        if color.node.is_texture_marker() {
            return Err(Diagnostic::error(format!("{keyword} has no colour"))
                .with_code(ErrorCode::E101)
                .with_label(color.span, "texture marker where a colour is expected")
                .with_help(format!("write `{keyword} T colour {{...}}`")));
        }
        let textured = items.iter().any(|item| item.node.is_texture_marker());

        Ok(Polygon {
            textured,
            color: Box::new(color.node),
            vertices: vertex_nodes,
        })
    }

    /// `MATERIAL [GROUP = n] [MIP = "name"] child`
    fn material(&mut self) -> Result<Node> {
        let mut group = None;
        let mut mip = None;

        loop {
            let parsed = self.require_item("a MATERIAL child")?;
            match parsed.node.as_word() {
                Some("GROUP") => {
                    if group.is_some() {
                        return Err(repeated_attribute("GROUP", parsed.span));
                    }
                    let id = self.require_item("a texture group")?;
                    let number = id.node.as_word().and_then(parse_integer).ok_or_else(|| {
                        Diagnostic::error("texture group must be an integer")
                            .with_code(ErrorCode::E103)
                            .with_label(id.span, ErrorCode::E103.description())
                    })?;
                    group = Some(number);
                }
                Some("MIP") => {
                    if mip.is_some() {
                        return Err(repeated_attribute("MIP", parsed.span));
                    }
                    mip = Some(self.filename("MIP")?);
                }
                _ => {
                    return Ok(Node::Material(Material {
                        group,
                        mip,
                        child: Box::new(parsed.node),
                    }));
                }
            }
        }
    }

    /// The quoted filename following `MIP` or `EXTERN`.
    fn filename(&mut self, keyword: &str) -> Result<String> {
        let parsed = self.require_item(&format!("a {keyword} filename"))?;
        let Node::Quoted(name) = parsed.node else {
            return Err(Diagnostic::error(format!(
                "{keyword} expects a quoted filename, found {}",
                parsed.node.kind()
            ))
            .with_code(ErrorCode::E100)
            .with_label(parsed.span, "expected `\"name\"`"));
        };

        let len = name.chars().count();
        if len > MAX_FILENAME_LEN {
            return Err(Diagnostic::error(format!(
                "{keyword} filename `{name}` is {len} characters long"
            ))
            .with_code(ErrorCode::E300)
            .with_label(parsed.span, format!("longer than {MAX_FILENAME_LEN} characters"))
            .with_help(format!(
                "filenames are limited to {MAX_FILENAME_LEN} characters, excluding quotes"
            )));
        }
        Ok(name)
    }

    /// `DYNAMIC x y z rx ry rz n EXTERN = "name"`
    fn dynamic(&mut self, span: Span) -> Result<Node> {
        let mut fields = Vec::new();
        let mut external = None;
        let mut count = 0;

        while let Some(item) = self.next_item()? {
            count += 1;
            let ends = item.ends_collection;
            if item.node.as_word() == Some("EXTERN") {
                external = Some(self.filename("EXTERN")?);
            } else {
                fields.push(item);
            }
            if ends {
                break;
            }
        }

        if count != DYNAMIC_ITEMS {
            return Err(Diagnostic::error(format!(
                "DYNAMIC expects {DYNAMIC_ITEMS} items, found {count}"
            ))
            .with_code(ErrorCode::E200)
            .with_label(span.union(self.last), format!("{count} items"))
            .with_help("write 7 numbers followed by EXTERN = \"name\""));
        }

        let Some(external) = external else {
            return Err(Diagnostic::error("DYNAMIC has no EXTERN filename")
                .with_code(ErrorCode::E101)
                .with_label(span.union(self.last), "expected EXTERN = \"name\""));
        };

        let numbers = fields
            .iter()
            .map(expect_number)
            .collect::<Result<Vec<_>>>()?;
        let fields: [f64; 7] = numbers.try_into().map_err(|numbers: Vec<f64>| {
            Diagnostic::error(format!("DYNAMIC expects 7 numbers, found {}", numbers.len()))
                .with_code(ErrorCode::E200)
                .with_label(span.union(self.last), ErrorCode::E200.description())
        })?;

        Ok(Node::Dynamic(Dynamic { fields, external }))
    }

    /// `SWITCH DISTANCE origin symbol ((distance, target), ...)`
    fn switch(&mut self) -> Result<Node> {
        if self.eat(keyword("DISTANCE")).is_none() {
            let (found, span) = match self.peek() {
                Some(token) => (format!("`{token}`"), token.span),
                None => ("end of statement".to_string(), self.end),
            };
            return Err(Diagnostic::error(format!(
                "SWITCH must be followed by DISTANCE, found {found}"
            ))
            .with_code(ErrorCode::E200)
            .with_label(span, "expected DISTANCE"));
        }

        let origin = self.require_item("a switch origin")?;
        let origin = match origin.node {
            Node::Items(items) => items.into_iter().next().ok_or_else(|| {
                Diagnostic::error("switch origin is empty")
                    .with_code(ErrorCode::E101)
                    .with_label(origin.span, "expected an origin vertex")
            })?,
            other => other,
        };

        let Some(symbol) = self.advance() else {
            return Err(self.incomplete("a switch symbol"));
        };
        let symbol = symbol.token.to_string();

        let payload = self.require_item("switch entries")?;
        let Node::Items(entries) = payload.node else {
            return Err(Diagnostic::error(format!(
                "SWITCH expects a sequence of entries, found {}",
                payload.node.kind()
            ))
            .with_code(ErrorCode::E100)
            .with_label(payload.span, ErrorCode::E100.description()));
        };

        let entries = entries
            .into_iter()
            .map(|entry| switch_entry(entry, payload.span))
            .collect::<Result<Vec<_>>>()?;

        Ok(Node::Switch(Switch {
            origin: Box::new(origin),
            symbol,
            entries,
        }))
    }

    /// `KEYWORD (p1, p2, p3) child...`
    fn bsp(&mut self, kind: BspKind) -> Result<Node> {
        let keyword = kind.keyword();
        let planes = self.require_item(&format!("{keyword} plane references"))?;
        let Node::Items(refs) = planes.node else {
            return Err(Diagnostic::error(format!(
                "{keyword} expects a sequence of 3 plane references, found {}",
                planes.node.kind()
            ))
            .with_code(ErrorCode::E100)
            .with_label(planes.span, ErrorCode::E100.description()));
        };
        let planes: [Node; 3] = refs.try_into().map_err(|refs: Vec<Node>| {
            Diagnostic::error(format!(
                "{keyword} expects 3 plane references, found {}",
                refs.len()
            ))
            .with_code(ErrorCode::E200)
            .with_label(planes.span, format!("{} plane references", refs.len()))
        })?;

        let expected = kind.child_count();
        let mut children = Vec::with_capacity(expected);
        while children.len() < expected {
            match self.next_item()? {
                Some(child) => children.push(child.node),
                None => {
                    return Err(Diagnostic::error(format!(
                        "{keyword} expects {expected} child items, found {}",
                        children.len()
                    ))
                    .with_code(ErrorCode::E200)
                    .with_label(self.here(), format!("expected {expected} child items")));
                }
            }
        }

        Ok(Node::Bsp(Box::new(Bsp {
            kind,
            planes,
            children,
        })))
    }

    /// `SUPEROBJ pointer (children)`
    fn super_object(&mut self) -> Result<Node> {
        let pointer = self.require_item("a SUPEROBJ pointer")?;
        let children = self.require_item("SUPEROBJ children")?;
        let Node::Items(children) = children.node else {
            return Err(expected_sequence("SUPEROBJ", &children));
        };
        Ok(Node::SuperObject(SuperObject {
            pointer: Box::new(pointer.node),
            children,
        }))
    }

    /// `LIST (items)`
    fn list(&mut self) -> Result<Node> {
        let payload = self.require_item("a LIST payload")?;
        match payload.node {
            Node::Items(items) => Ok(Node::List(items)),
            _ => Err(expected_sequence("LIST", &payload)),
        }
    }

    /// `DYNO`/`DATA` payload: a sequence or vector of integers.
    fn integers(&mut self, keyword: &str) -> Result<Vec<i64>> {
        let payload = self.require_item(&format!("a {keyword} payload"))?;
        let not_integer = || {
            Diagnostic::error(format!("{keyword} payload must contain integers"))
                .with_code(ErrorCode::E103)
                .with_label(payload.span, ErrorCode::E103.description())
        };

        match &payload.node {
            Node::Vector(numbers) => numbers
                .iter()
                .map(|n| (n.fract() == 0.0).then_some(*n as i64))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(not_integer),
            Node::Items(items) => items
                .iter()
                .map(|item| item.as_word().and_then(parse_integer))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(not_integer),
            _ => Err(expected_sequence(keyword, &payload)),
        }
    }
}

fn expect_number(item: &Parsed) -> Result<f64> {
    item.node
        .as_word()
        .and_then(parse_number)
        .ok_or_else(|| {
            Diagnostic::error(format!("expected a number, found `{}`", item.node))
                .with_code(ErrorCode::E103)
                .with_label(item.span, ErrorCode::E103.description())
        })
}

fn repeated_attribute(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("MATERIAL sets {name} more than once"))
        .with_code(ErrorCode::E100)
        .with_label(span, "repeated here")
}

fn expected_sequence(keyword: &str, found: &Parsed) -> Diagnostic {
    Diagnostic::error(format!(
        "{keyword} expects a sequence, found {}",
        found.node.kind()
    ))
    .with_code(ErrorCode::E100)
    .with_label(found.span, "expected `(...)` or `{...}`")
}

/// `(distance, target)` or `(distance, symbol, target)`.
fn switch_entry(entry: Node, span: Span) -> Result<SwitchEntry> {
    let invalid = |found: usize| {
        Diagnostic::error(format!(
            "switch entry expects (distance, target), found {found} items"
        ))
        .with_code(ErrorCode::E200)
        .with_label(span, ErrorCode::E200.description())
    };

    let Node::Items(mut items) = entry else {
        return Err(invalid(1));
    };
    if items.len() < 2 {
        return Err(invalid(items.len()));
    }

    let distance = items[0].first_number().ok_or_else(|| {
        Diagnostic::error(format!("switch distance `{}` is not a number", items[0]))
            .with_code(ErrorCode::E103)
            .with_label(span, ErrorCode::E103.description())
    })?;
    let target = if items.len() == 2 {
        items.swap_remove(1)
    } else {
        items.swap_remove(2)
    };

    Ok(SwitchEntry {
        distance: distance as i64,
        target,
    })
}

/// Parse the first item of a statement value.
///
/// Returns the node and the number of trailing tokens left unparsed.
pub(crate) fn parse_statement(
    tokens: &[PositionedToken<'_>],
    end: Span,
) -> Result<(Node, usize)> {
    let mut parser = Parser::new(tokens, end);
    match parser.next_item()? {
        Some(parsed) => Ok((parsed.node, parser.remaining())),
        None => match parser.peek() {
            Some(token) => Err(Diagnostic::error(format!("unexpected `{token}`"))
                .with_code(ErrorCode::E100)
                .with_label(token.span, ErrorCode::E100.description())),
            None => Err(Diagnostic::error("definition has no value")
                .with_code(ErrorCode::E101)
                .with_label(end, "expected a value")),
        },
    }
}
