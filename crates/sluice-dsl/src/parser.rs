use crate::ast::{Call, Literal, Program};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenWithPos};

/// Deepest allowed nesting of blocks and literals combined.
pub const MAX_NESTING: usize = 128;

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current_pos(&self) -> (usize, usize) {
        self.tokens
            .get(self.pos)
            .map(|t| (t.line, t.col))
            .or_else(|| self.tokens.last().map(|t| (t.line, t.col)))
            .unwrap_or((1, 1))
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|t| &t.token).unwrap_or(&Token::Eof)
    }

    fn peek_line(&self) -> usize {
        self.current_pos().0
    }

    /// Line of the last consumed token.
    fn prev_line(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos)
            .map(|t| t.token.clone())
            .unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.current_pos();
        ParseError::new(msg, line, col)
    }

    fn enter(&self, depth: usize) -> Result<usize, ParseError> {
        if depth >= MAX_NESTING {
            Err(self.err(format!("nesting deeper than {} levels", MAX_NESTING)))
        } else {
            Ok(depth + 1)
        }
    }

    // ── Program ───────────────────────────────────────────────────────────

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let calls = self.parse_calls(&Token::Eof, 0)?;
        Ok(Program { calls })
    }

    /// Parse calls until `end` (consumed unless it is `Eof`).
    fn parse_calls(&mut self, end: &Token, depth: usize) -> Result<Vec<Call>, ParseError> {
        let mut calls = Vec::new();
        loop {
            match self.peek() {
                Token::Semicolon => { self.advance(); }
                tok if tok == end => {
                    if *end != Token::Eof {
                        self.advance();
                    }
                    break;
                }
                Token::Eof => return Err(self.err("unclosed '{' block")),
                Token::Ident(_) => calls.push(self.parse_call(depth)?),
                tok => {
                    return Err(self.err(format!("expected a call, got {:?}", tok)));
                }
            }
        }
        Ok(calls)
    }

    // ── Call ──────────────────────────────────────────────────────────────

    /// Parse `name`, `name(args)` or `name args`, each optionally followed
    /// by a `{ }` block.
    ///
    /// Bare arguments end at the line break. The first one must stay on the
    /// call's line, and a block opener must stay on the line where the
    /// arguments end:
    ///
    /// ```text
    /// foo "a" { b 1 }     // block of foo
    /// foo "a"
    /// { b 1 }             // error: a block cannot start a statement
    /// ```
    ///
    /// A parenthesised argument list or a bare name is closed explicitly, and
    /// a `{` on the following line still opens its block.
    fn parse_call(&mut self, depth: usize) -> Result<Call, ParseError> {
        let (line, col) = self.current_pos();
        let name = match self.advance() {
            Token::Ident(s) => s,
            tok => return Err(self.err(format!("expected identifier, got {:?}", tok))),
        };

        let mut bare = false;
        let args = if self.peek() == &Token::LParen {
            self.parse_paren_args(depth)?
        } else if self.peek().starts_literal() && self.peek_line() == line {
            bare = true;
            self.parse_bare_args(depth)?
        } else {
            Vec::new()
        };

        // A `{` here is always a block, never a mapping literal.
        let opens_block = self.peek() == &Token::LBrace
            && (!bare || self.peek_line() == self.prev_line());
        let block = if opens_block {
            let inner = self.enter(depth)?;
            self.advance(); // consume `{`
            Some(self.parse_calls(&Token::RBrace, inner)?)
        } else {
            None
        };

        Ok(Call { name, args, block, line, col })
    }

    fn parse_paren_args(&mut self, depth: usize) -> Result<Vec<Literal>, ParseError> {
        self.advance(); // consume `(`
        let mut args = Vec::new();
        loop {
            if self.peek() == &Token::RParen {
                self.advance();
                break;
            }
            args.push(self.parse_literal(depth)?);
            match self.peek() {
                Token::Comma => { self.advance(); }
                Token::RParen => {}
                tok => return Err(self.err(format!("expected ',' or ')' in arguments, got {:?}", tok))),
            }
        }
        Ok(args)
    }

    fn parse_bare_args(&mut self, depth: usize) -> Result<Vec<Literal>, ParseError> {
        let mut args = vec![self.parse_literal(depth)?];
        while self.peek() == &Token::Comma {
            self.advance();
            args.push(self.parse_literal(depth)?);
        }
        Ok(args)
    }

    // ── Literal ───────────────────────────────────────────────────────────

    fn parse_literal(&mut self, depth: usize) -> Result<Literal, ParseError> {
        match self.peek() {
            Token::LBracket => return self.parse_seq(depth),
            Token::LBrace => return self.parse_map(depth),
            _ => {}
        }
        match self.advance() {
            Token::Str(s)     => Ok(Literal::Str(s)),
            Token::Integer(n) => Ok(Literal::Integer(n)),
            Token::Float(n)   => Ok(Literal::Float(n)),
            Token::True       => Ok(Literal::Bool(true)),
            Token::False      => Ok(Literal::Bool(false)),
            Token::Null       => Ok(Literal::Null),
            tok => Err(self.err(format!("expected a value, got {:?}", tok))),
        }
    }

    fn parse_seq(&mut self, depth: usize) -> Result<Literal, ParseError> {
        let inner = self.enter(depth)?;
        self.advance(); // consume `[`
        let mut items = Vec::new();
        loop {
            if self.peek() == &Token::RBracket {
                self.advance();
                break;
            }
            items.push(self.parse_literal(inner)?);
            match self.peek() {
                Token::Comma => { self.advance(); }
                Token::RBracket => {}
                tok => return Err(self.err(format!("expected ',' or ']' in sequence, got {:?}", tok))),
            }
        }
        Ok(Literal::Seq(items))
    }

    /// Parse `{ key: value, ... }`. A repeated key keeps its first position
    /// and takes the last value.
    fn parse_map(&mut self, depth: usize) -> Result<Literal, ParseError> {
        let inner = self.enter(depth)?;
        self.advance(); // consume `{`
        let mut entries: Vec<(String, Literal)> = Vec::new();
        loop {
            let key = match self.advance() {
                Token::RBrace => break,
                Token::Ident(s) | Token::Str(s) => s,
                tok => return Err(self.err(format!("expected a mapping key, got {:?}", tok))),
            };
            match self.advance() {
                Token::Colon => {}
                tok => return Err(self.err(format!("expected ':' after key {:?}, got {:?}", key, tok))),
            }
            let value = self.parse_literal(inner)?;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
            match self.peek() {
                Token::Comma => { self.advance(); }
                Token::RBrace => {}
                tok => return Err(self.err(format!("expected ',' or '}}' in mapping, got {:?}", tok))),
            }
        }
        Ok(Literal::Map(entries))
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse sluice DSL source into a [`Program`].
pub fn parse_str(src: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_program()
}
