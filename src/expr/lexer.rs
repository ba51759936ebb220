use crate::expr::error::{ExprError, ExprResult};
use crate::expr::eval::is_function_name;
use crate::expr::token::{Span, Token, TokenKind};

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> ExprResult<Vec<Token>> {
        while !self.is_at_end() {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            let token = self.next_token()?;
            // Insert implicit multiplication if applicable
            if let Some(prev) = self.tokens.last() {
                if prev.kind.can_end_implicit_mul() && token.kind.can_start_implicit_mul() {
                    // Don't insert implicit mul between a function name and '('
                    // (that's a function application, not multiplication)
                    let is_func_call = matches!(&prev.kind, TokenKind::Ident(name) if is_function_name(name))
                        && matches!(&token.kind, TokenKind::LParen);
                    if !is_func_call {
                        let span = Span::new(prev.span.end, token.span.start);
                        self.tokens.push(Token::new(TokenKind::Star, span));
                    }
                }
            }
            self.tokens.push(token);
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, Span::new(self.pos, self.pos)));
        Ok(self.tokens)
    }

    fn next_token(&mut self) -> ExprResult<Token> {
        let start = self.pos;
        let ch = self.advance();

        match ch {
            '+' => Ok(Token::new(TokenKind::Plus, Span::new(start, self.pos))),
            '-' => Ok(Token::new(TokenKind::Minus, Span::new(start, self.pos))),
            '*' => Ok(Token::new(TokenKind::Star, Span::new(start, self.pos))),
            '/' => Ok(Token::new(TokenKind::Slash, Span::new(start, self.pos))),
            '^' => Ok(Token::new(TokenKind::Caret, Span::new(start, self.pos))),
            '(' => Ok(Token::new(TokenKind::LParen, Span::new(start, self.pos))),
            ')' => Ok(Token::new(TokenKind::RParen, Span::new(start, self.pos))),
            c if c.is_ascii_digit() => self.read_number(start),
            '.' if self.peek().map_or(false, |c| c.is_ascii_digit()) => self.read_number(start),
            c if c.is_ascii_alphabetic() => self.read_identifier(start),
            _ => Err(
                ExprError::lex(format!("unexpected character: '{}'", ch))
                    .with_span(Span::new(start, self.pos)),
            ),
        }
    }

    fn read_number(&mut self, start: usize) -> ExprResult<Token> {
        // Integer part
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        // Fractional part
        if self.peek() == Some('.') {
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        // Scientific notation: only when the exponent actually follows,
        // so `2e` still lexes as `2` times the constant `e`.
        if self.peek() == Some('e') || self.peek() == Some('E') {
            let mut lookahead = 1;
            if self.peek_at(lookahead) == Some('+') || self.peek_at(lookahead) == Some('-') {
                lookahead += 1;
            }
            if self.peek_at(lookahead).map_or(false, |c| c.is_ascii_digit()) {
                self.advance(); // 'e' / 'E'
                if self.peek() == Some('+') || self.peek() == Some('-') {
                    self.advance();
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let text: String = self.source[start..self.pos].iter().collect();
        let val: f64 = text
            .parse()
            .map_err(|_| {
                ExprError::lex(format!("invalid number: {}", text))
                    .with_span(Span::new(start, self.pos))
            })?;
        Ok(Token::new(TokenKind::Number(val), Span::new(start, self.pos)))
    }

    fn read_identifier(&mut self, start: usize) -> ExprResult<Token> {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.source[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::Ident(text), Span::new(start, self.pos)))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.pos];
        self.pos += 1;
        ch
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}
