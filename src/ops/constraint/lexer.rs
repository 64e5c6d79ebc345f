use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(i) => write!(f, "number {i}"),
            Token::Float(x) => write!(f, "number {x}"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Ident(name) => write!(f, "'{name}'"),
            Token::True => f.write_str("'true'"),
            Token::False => f.write_str("'false'"),
            Token::And => f.write_str("'and'"),
            Token::Or => f.write_str("'or'"),
            Token::Not => f.write_str("'not'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Percent => f.write_str("'%'"),
            Token::Eq => f.write_str("'=='"),
            Token::Ne => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::Le => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::Ge => f.write_str("'>='"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::Comma => f.write_str("','"),
            Token::End => f.write_str("end of expression"),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Splits `src` into tokens, always ending with [`Token::End`].
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut lexer = Lexer {
        src,
        chars: src.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::End;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Spanned, ExprError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some((pos, ch)) = self.chars.next() else {
            return Ok(Spanned {
                token: Token::End,
                pos: self.src.len(),
            });
        };

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            '<' => self.with_equals(Token::Le, Token::Lt),
            '>' => self.with_equals(Token::Ge, Token::Gt),
            '=' | '!' | '~' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(ExprError::UnexpectedChar { ch, pos });
                }
                if ch == '=' {
                    Token::Eq
                } else {
                    Token::Ne
                }
            }
            '\'' | '"' => self.string(ch, pos)?,
            c if c.is_ascii_digit() => self.number(pos)?,
            '.' if self.peek_is_digit() => self.number(pos)?,
            c if c.is_alphabetic() || c == '_' => self.word(pos),
            _ => return Err(ExprError::UnexpectedChar { ch, pos }),
        };

        Ok(Spanned { token, pos })
    }

    fn with_equals(&mut self, with: Token, without: Token) -> Token {
        if self.chars.next_if(|(_, c)| *c == '=').is_some() {
            with
        } else {
            without
        }
    }

    fn peek_is_digit(&mut self) -> bool {
        matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_digit())
    }

    fn end_of(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |(i, _)| *i)
    }

    fn word(&mut self, start: usize) -> Token {
        while self
            .chars
            .next_if(|(_, c)| c.is_alphanumeric() || *c == '_')
            .is_some()
        {}
        let end = self.end_of();
        match &self.src[start..end] {
            "true" => Token::True,
            "false" => Token::False,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            name => Token::Ident(name.to_string()),
        }
    }

    fn number(&mut self, start: usize) -> Result<Token, ExprError> {
        let mut is_float = self.src[start..].starts_with('.');
        loop {
            match self.chars.peek().copied() {
                Some((_, c)) if c.is_ascii_digit() => {}
                Some((_, '.')) if !is_float => is_float = true,
                Some((_, 'e' | 'E')) => {
                    is_float = true;
                    self.chars.next();
                    self.chars.next_if(|(_, c)| *c == '+' || *c == '-');
                    continue;
                }
                _ => break,
            }
            self.chars.next();
        }
        let end = self.end_of();
        let text = &self.src[start..end];
        let invalid = || ExprError::InvalidNumber {
            text: text.to_string(),
            pos: start,
        };
        if is_float {
            text.parse().map(Token::Float).map_err(|_| invalid())
        } else {
            text.parse().map(Token::Int).map_err(|_| invalid())
        }
    }

    fn string(&mut self, quote: char, start: usize) -> Result<Token, ExprError> {
        let mut value = String::new();
        while let Some((pos, ch)) = self.chars.next() {
            match ch {
                c if c == quote => return Ok(Token::Str(value)),
                '\\' => {
                    let Some((_, escaped)) = self.chars.next() else {
                        break;
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        '\\' | '\'' | '"' => escaped,
                        other => return Err(ExprError::InvalidEscape { ch: other, pos }),
                    });
                }
                c => value.push(c),
            }
        }
        Err(ExprError::UnterminatedString { pos: start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_comparison_and_keywords() {
        assert_eq!(
            tokens("v >= 0 and v < 150"),
            [
                Token::Ident("v".into()),
                Token::Ge,
                Token::Int(0),
                Token::And,
                Token::Ident("v".into()),
                Token::Lt,
                Token::Int(150),
                Token::End,
            ]
        );
    }

    #[test]
    fn test_not_equal_spellings() {
        assert_eq!(tokens("!= ~="), [Token::Ne, Token::Ne, Token::End]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("12 1.5 .25 2e3 7E-1"),
            [
                Token::Int(12),
                Token::Float(1.5),
                Token::Float(0.25),
                Token::Float(2000.0),
                Token::Float(0.7),
                Token::End,
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            tokens(r#"'Water Music' "it\'s" 'a\nb'"#),
            [
                Token::Str("Water Music".into()),
                Token::Str("it's".into()),
                Token::Str("a\nb".into()),
                Token::End,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let spanned = tokenize("  v == 'x'").unwrap();
        let positions: Vec<usize> = spanned.iter().map(|s| s.pos).collect();
        assert_eq!(positions, [2, 4, 7, 10]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize("v = 1"),
            Err(ExprError::UnexpectedChar { ch: '=', pos: 2 })
        );
        assert_eq!(
            tokenize("v == 'open"),
            Err(ExprError::UnterminatedString { pos: 5 })
        );
        assert_eq!(
            tokenize("v # 1"),
            Err(ExprError::UnexpectedChar { ch: '#', pos: 2 })
        );
        assert!(matches!(
            tokenize("99999999999999999999"),
            Err(ExprError::InvalidNumber { .. })
        ));
        assert!(matches!(
            tokenize(r"'\q'"),
            Err(ExprError::InvalidEscape { ch: 'q', .. })
        ));
    }
}
