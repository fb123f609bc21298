use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Space,
    Newline,
    Plus,
    Minus,
    Num,
    Id,
    Sub,
    Print,
    Call,
    Set,
    End,
}

impl TokenKind {
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "sub" => Some(TokenKind::Sub),
            "print" => Some(TokenKind::Print),
            "call" => Some(TokenKind::Call),
            "set" => Some(TokenKind::Set),
            _ => None
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, line: usize) -> Self {
        Self { kind, text: text.to_string(), line }
    }

    pub fn end(line: usize) -> Self {
        Self { kind: TokenKind::End, text: String::new(), line }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Space => write!(f, "{}({:?})", self.kind, self.text),
            TokenKind::Newline => write!(f, "{}(\\n)", self.kind),
            TokenKind::End => write!(f, "{}", self.kind),
            _ => write!(f, "{}({})", self.kind, self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::token::{Token, TokenKind};

    #[test]
    fn keywords() {
        assert_eq!(TokenKind::keyword("sub"), Some(TokenKind::Sub));
        assert_eq!(TokenKind::keyword("print"), Some(TokenKind::Print));
        assert_eq!(TokenKind::keyword("call"), Some(TokenKind::Call));
        assert_eq!(TokenKind::keyword("set"), Some(TokenKind::Set));
        assert_eq!(TokenKind::keyword("Set"), None);
        assert_eq!(TokenKind::keyword("subs"), None);
    }

    #[test]
    fn display() {
        assert_eq!(Token::new(TokenKind::Id, "foo", 1).to_string(), "Id(foo)");
        assert_eq!(Token::new(TokenKind::Space, "\t", 1).to_string(), "Space(\"\\t\")");
        assert_eq!(Token::new(TokenKind::Newline, "\n", 1).to_string(), "Newline(\\n)");
        assert_eq!(Token::end(3).to_string(), "End");
    }
}
