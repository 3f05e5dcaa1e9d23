use std::fmt;

use crate::span::Span;

/// Token types for the `.3d` value grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    // Brackets
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftAngle,    // <
    RightAngle,   // >

    Equals, // =

    /// Quote-delimited literal, stored without its quotes.
    Quoted(&'src str),
    /// Any other run of characters.
    Word(&'src str),
}

impl Token<'_> {
    /// The closing token matching an opening bracket.
    pub fn closer(&self) -> Option<Token<'static>> {
        match self {
            Token::LeftBrace => Some(Token::RightBrace),
            Token::LeftParen => Some(Token::RightParen),
            Token::LeftBracket => Some(Token::RightBracket),
            Token::LeftAngle => Some(Token::RightAngle),
            _ => None,
        }
    }

    pub fn is_closer(&self) -> bool {
        matches!(
            self,
            Token::RightBrace | Token::RightParen | Token::RightBracket | Token::RightAngle
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftAngle => write!(f, "<"),
            Token::RightAngle => write!(f, ">"),
            Token::Equals => write!(f, "="),
            Token::Quoted(text) => write!(f, "\"{text}\""),
            Token::Word(text) => write!(f, "{text}"),
        }
    }
}

/// A token with its position in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}
