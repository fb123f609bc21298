use std::error::Error;
use std::fmt::{Display, Formatter};
use crate::token::{Token, TokenKind};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LexError {
    UnexpectedCharacter {
        character: char,
        line: usize
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedCharacter { character, line } => write!(f, "unexpected character {character:?} on line {line}")
        }
    }
}

impl Error for LexError {}

/// Scan position of a [`Lexer`]; handing it back to [`Lexer::restore`] rewinds the lexer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
    line: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    cursor: Cursor,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, cursor: Cursor { pos: 0, line: 1 } }
    }

    pub fn line(&self) -> usize {
        self.cursor.line
    }

    pub fn save(&self) -> Cursor {
        self.cursor
    }

    pub fn restore(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Consumes the next token. Once the input is exhausted every call yields `End`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let rest = &self.source[self.cursor.pos..];
        let line = self.cursor.line;
        let Some(c) = rest.chars().next() else {
            return Ok(Token::end(line));
        };
        let (kind, len) = match c {
            '\n' => (TokenKind::Newline, 1),
            '+' => (TokenKind::Plus, 1),
            '-' => (TokenKind::Minus, 1),
            c if c.is_whitespace() => (TokenKind::Space, c.len_utf8()),
            c if c.is_ascii_digit() => (TokenKind::Num, run_length(rest, char::is_ascii_digit)),
            c if c.is_ascii_alphabetic() => {
                let len = run_length(rest, char::is_ascii_alphanumeric);
                (TokenKind::keyword(&rest[..len]).unwrap_or(TokenKind::Id), len)
            }
            character => return Err(LexError::UnexpectedCharacter { character, line })
        };
        self.cursor.pos += len;
        if kind == TokenKind::Newline {
            self.cursor.line += 1;
        }
        Ok(Token::new(kind, &rest[..len], line))
    }
}

fn run_length(text: &str, accept: fn(&char) -> bool) -> usize {
    text.chars().take_while(accept).map(char::len_utf8).sum()
}
