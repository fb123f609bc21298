use std::error::Error;
use std::fmt::{Display, Formatter};
use log::debug;
use crate::ast::{Node, Operator, Param};
use crate::lexer::{LexError, Lexer};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Lex(LexError),
    UnexpectedToken {
        token: String,
        line: usize
    },
    LiteralTooLarge {
        text: String,
        line: usize
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(error) => write!(f, "{error}"),
            ParseError::UnexpectedToken { token, line } => write!(f, "unexpected token {token} on line {line}"),
            ParseError::LiteralTooLarge { text, line } => write!(f, "integer literal {text} on line {line} does not fit in 64 bits"),
        }
    }
}

impl Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::Lex(error)
    }
}

/// `Ok(None)` rejects the alternative and lets the caller rewind; `Err` is a real syntax error.
type Attempt = Result<Option<Node>, ParseError>;

pub fn parse(source: &str) -> Result<Node, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}

// program    ::= statement (NEWLINE+ statement)* NEWLINE*
// statement  ::= SPACE* command SPACE*
// command    ::= print | call | set | sub
// print      ::= PRINT SPACE param
// call       ::= CALL SPACE ID
// set        ::= SET SPACE ID SPACE param
// sub        ::= SUB SPACE ID
// param      ::= ID | integer
// integer    ::= (PLUS | MINUS)? NUM
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let mut statements = Vec::new();
        self.skip(TokenKind::Newline)?;
        while self.current.kind != TokenKind::End {
            statements.push(self.statement()?);
            if self.skip(TokenKind::Newline)? == 0 && self.current.kind != TokenKind::End {
                return Err(self.unexpected());
            }
        }
        debug!("parsed {} statements over {} lines", statements.len(), self.lexer.line());
        Ok(Node::Root { statements })
    }

    fn statement(&mut self) -> Result<Node, ParseError> {
        self.skip(TokenKind::Space)?;
        let node = self.command()?;
        self.skip(TokenKind::Space)?;
        Ok(node)
    }

    fn command(&mut self) -> Result<Node, ParseError> {
        let alternatives: [fn(&mut Self) -> Attempt; 4] = [Self::print, Self::call, Self::set, Self::sub];
        for alternative in alternatives {
            if let Some(node) = self.attempt(alternative)? {
                return Ok(node);
            }
        }
        Err(self.unexpected())
    }

    fn attempt(&mut self, alternative: fn(&mut Self) -> Attempt) -> Attempt {
        let cursor = self.lexer.save();
        let token = self.current.clone();
        let result = alternative(self)?;
        if result.is_none() {
            self.lexer.restore(cursor);
            self.current = token;
        }
        Ok(result)
    }

    fn print(&mut self) -> Attempt {
        let Some(keyword) = self.eat(TokenKind::Print)? else { return Ok(None) };
        if self.eat(TokenKind::Space)?.is_none() {
            return Ok(None);
        }
        let Some(operand) = self.param()? else { return Ok(None) };
        Ok(Some(Node::UnaryOp { op: Operator::Print, operand: Box::new(operand), line: keyword.line }))
    }

    fn call(&mut self) -> Attempt {
        let Some(keyword) = self.eat(TokenKind::Call)? else { return Ok(None) };
        if self.eat(TokenKind::Space)?.is_none() {
            return Ok(None);
        }
        let Some(name) = self.eat(TokenKind::Id)? else { return Ok(None) };
        let operand = Node::Param(Param::Variable(name.text));
        Ok(Some(Node::UnaryOp { op: Operator::Call, operand: Box::new(operand), line: keyword.line }))
    }

    fn set(&mut self) -> Attempt {
        let Some(keyword) = self.eat(TokenKind::Set)? else { return Ok(None) };
        if self.eat(TokenKind::Space)?.is_none() {
            return Ok(None);
        }
        let Some(name) = self.eat(TokenKind::Id)? else { return Ok(None) };
        if self.eat(TokenKind::Space)?.is_none() {
            return Ok(None);
        }
        let Some(value) = self.param()? else { return Ok(None) };
        Ok(Some(Node::BinOp {
            op: Operator::Set,
            lhs: Box::new(Node::Param(Param::Variable(name.text))),
            rhs: Box::new(value),
            line: keyword.line,
        }))
    }

    fn sub(&mut self) -> Attempt {
        let Some(keyword) = self.eat(TokenKind::Sub)? else { return Ok(None) };
        if self.eat(TokenKind::Space)?.is_none() {
            return Ok(None);
        }
        let Some(name) = self.eat(TokenKind::Id)? else { return Ok(None) };
        Ok(Some(Node::ProcDecl { name: name.text, line: keyword.line }))
    }

    fn param(&mut self) -> Attempt {
        if let Some(name) = self.eat(TokenKind::Id)? {
            return Ok(Some(Node::Param(Param::Variable(name.text))));
        }
        self.integer()
    }

    fn integer(&mut self) -> Attempt {
        let negative = if self.eat(TokenKind::Plus)?.is_some() { false } else { self.eat(TokenKind::Minus)?.is_some() };
        let Some(digits) = self.eat(TokenKind::Num)? else { return Ok(None) };
        let text = if negative { format!("-{}", digits.text) } else { digits.text };
        match text.parse::<i64>() {
            Ok(value) => Ok(Some(Node::Param(Param::Integer(value)))),
            Err(_) => Err(ParseError::LiteralTooLarge { text, line: digits.line }),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        if self.current.kind != kind {
            return Ok(None);
        }
        let next = self.lexer.next_token()?;
        Ok(Some(std::mem::replace(&mut self.current, next)))
    }

    fn skip(&mut self, kind: TokenKind) -> Result<usize, ParseError> {
        let mut count = 0;
        while self.eat(kind)?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken { token: self.current.to_string(), line: self.current.line }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Node, Operator, Param};
    use crate::lexer::LexError;
    use crate::parser::{parse, ParseError};

    fn variable(name: &str) -> Box<Node> {
        Box::new(Node::Param(Param::Variable(name.to_string())))
    }

    fn integer(value: i64) -> Box<Node> {
        Box::new(Node::Param(Param::Integer(value)))
    }

    fn unexpected(token: &str, line: usize) -> ParseError {
        ParseError::UnexpectedToken { token: token.to_string(), line }
    }

    #[test]
    fn parse_program() {
        assert_eq!(parse("sub main\nset a -5\nprint a\ncall foo\nprint +7\n"), Ok(Node::Root {
            statements: vec![
                Node::ProcDecl { name: "main".to_string(), line: 1 },
                Node::BinOp { op: Operator::Set, lhs: variable("a"), rhs: integer(-5), line: 2 },
                Node::UnaryOp { op: Operator::Print, operand: variable("a"), line: 3 },
                Node::UnaryOp { op: Operator::Call, operand: variable("foo"), line: 4 },
                Node::UnaryOp { op: Operator::Print, operand: integer(7), line: 5 },
            ]
        }));
    }

    #[test]
    fn blank_lines_and_padding() {
        assert_eq!(parse("\n\n  sub main  \n\n\n\tset b a \n\n"), Ok(Node::Root {
            statements: vec![
                Node::ProcDecl { name: "main".to_string(), line: 3 },
                Node::BinOp { op: Operator::Set, lhs: variable("b"), rhs: variable("a"), line: 6 },
            ]
        }));
        assert_eq!(parse("sub main"), Ok(Node::Root { statements: vec![Node::ProcDecl { name: "main".to_string(), line: 1 }] }));
        assert_eq!(parse(""), Ok(Node::Root { statements: vec![] }));
        assert_eq!(parse("\n\n"), Ok(Node::Root { statements: vec![] }));
    }

    #[test]
    fn keywords_are_not_names() {
        assert_eq!(parse("call print"), Err(unexpected("Call(call)", 1)));
        assert_eq!(parse("set sub 1"), Err(unexpected("Set(set)", 1)));
        assert_eq!(parse("sub setter\nset subs 1"), Ok(Node::Root {
            statements: vec![
                Node::ProcDecl { name: "setter".to_string(), line: 1 },
                Node::BinOp { op: Operator::Set, lhs: variable("subs"), rhs: integer(1), line: 2 },
            ]
        }));
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(parse("sub main\nprint"), Err(unexpected("Print(print)", 2)));
        assert_eq!(parse("sub main\nprint1"), Err(unexpected("Id(print1)", 2)));
        assert_eq!(parse("sub main\nprint  1"), Err(unexpected("Print(print)", 2)));
        assert_eq!(parse("call 5"), Err(unexpected("Call(call)", 1)));
        assert_eq!(parse("set 5 a"), Err(unexpected("Set(set)", 1)));
        assert_eq!(parse("print -a"), Err(unexpected("Print(print)", 1)));
        assert_eq!(parse("print 1 2"), Err(unexpected("Num(2)", 1)));
        assert_eq!(parse("sub main print 1"), Err(unexpected("Print(print)", 1)));
        assert_eq!(parse("\n\n+"), Err(unexpected("Plus(+)", 3)));
    }

    #[test]
    fn lex_errors_surface() {
        assert_eq!(parse("sub main\nprint 1#"), Err(ParseError::Lex(LexError::UnexpectedCharacter { character: '#', line: 2 })));
        assert_eq!(parse("@"), Err(ParseError::Lex(LexError::UnexpectedCharacter { character: '@', line: 1 })));
    }

    #[test]
    fn integer_range() {
        assert_eq!(parse("print -9223372036854775808"), Ok(Node::Root {
            statements: vec![Node::UnaryOp { op: Operator::Print, operand: integer(i64::MIN), line: 1 }]
        }));
        assert_eq!(parse("\nprint 9223372036854775808"), Err(ParseError::LiteralTooLarge { text: "9223372036854775808".to_string(), line: 2 }));
    }
}
