//! Recursive-descent parser for constraint expressions.
//!
//! Precedence, loosest first: `or`, `and`, comparisons, `+ -`, `* / %`,
//! then unary `not` and `-`.

use crate::document::Scalar;

use super::lexer::{tokenize, Spanned, Token};
use super::{ExprError, MEMBERSHIP_FN};

const SUBJECT: &str = "v";

/// Deepest expression tree the parser will build, counting both
/// parenthesised nesting and chains of binary operators.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Scalar),
    Subject,
    Not(Box<Expr>),
    Neg(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    In(Box<Expr>, Vec<Scalar>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(src)?,
        cursor: 0,
        depth: 0,
    };
    let expr = parser.or()?;
    parser.expect(Token::End, "an operator or end of expression")?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with `End`, which is never consumed past.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)].token
    }

    fn advance(&mut self) -> Spanned {
        let index = self.cursor.min(self.tokens.len() - 1);
        if self.tokens[index].token != Token::End {
            self.cursor += 1;
        }
        self.tokens[index].clone()
    }

    fn pos(&self) -> usize {
        self.tokens[self.cursor.min(self.tokens.len() - 1)].pos
    }

    /// Accounts for one more level of tree depth.
    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep { pos: self.pos() });
        }
        Ok(())
    }

    /// Parses with `f` one level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        self.descend()?;
        let parsed = f(self);
        self.depth -= 1;
        parsed
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ExprError> {
        let next = self.advance();
        if next.token == token {
            Ok(())
        } else {
            Err(unexpected(next, expected))
        }
    }

    fn or(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            self.descend()?;
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut lhs = self.comparison()?;
        while self.eat(&Token::And) {
            self.descend()?;
            let rhs = self.comparison()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinaryOp::Eq,
                Token::Ne => BinaryOp::Ne,
                Token::Lt => BinaryOp::Lt,
                Token::Le => BinaryOp::Le,
                Token::Gt => BinaryOp::Gt,
                Token::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let rhs = self.additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let base = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = base;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.nested(Self::unary)?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.nested(Self::unary)?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let next = self.advance();
        match next.token {
            Token::Int(i) => Ok(Expr::Literal(Scalar::Int(i))),
            Token::Float(x) => Ok(Expr::Literal(Scalar::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Scalar::String(s))),
            Token::True => Ok(Expr::Literal(Scalar::Bool(true))),
            Token::False => Ok(Expr::Literal(Scalar::Bool(false))),
            Token::LParen => {
                let inner = self.nested(Self::or)?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Ident(name) if name == SUBJECT => Ok(Expr::Subject),
            Token::Ident(name) if name == MEMBERSHIP_FN => self.membership(),
            Token::Ident(name) => Err(ExprError::UnknownName {
                name,
                pos: next.pos,
            }),
            token => Err(unexpected(
                Spanned {
                    token,
                    pos: next.pos,
                },
                "a value",
            )),
        }
    }

    /// `ops_in(expr, {literal, ...})`, after the name has been consumed.
    fn membership(&mut self) -> Result<Expr, ExprError> {
        self.expect(Token::LParen, "'(' after ops_in")?;
        let needle = self.nested(Self::or)?;
        self.expect(Token::Comma, "','")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut set = Vec::new();
        while !self.eat(&Token::RBrace) {
            set.push(self.literal()?);
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace, "',' or '}'")?;
                break;
            }
        }

        self.expect(Token::RParen, "')'")?;
        Ok(Expr::In(Box::new(needle), set))
    }

    fn literal(&mut self) -> Result<Scalar, ExprError> {
        let negative = self.eat(&Token::Minus);
        let next = self.advance();
        let value = match (next.token, negative) {
            (Token::Int(i), false) => Scalar::Int(i),
            (Token::Int(i), true) => Scalar::Int(-i),
            (Token::Float(x), false) => Scalar::Float(x),
            (Token::Float(x), true) => Scalar::Float(-x),
            (Token::Str(s), false) => Scalar::String(s),
            (Token::True, false) => Scalar::Bool(true),
            (Token::False, false) => Scalar::Bool(false),
            (token, _) => {
                return Err(unexpected(
                    Spanned {
                        token,
                        pos: next.pos,
                    },
                    "a literal",
                ))
            }
        };
        Ok(value)
    }
}

fn unexpected(found: Spanned, expected: &'static str) -> ExprError {
    ExprError::UnexpectedToken {
        expected,
        found: found.token.to_string(),
        pos: found.pos,
    }
}
