use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Ident(String),
    Str(String),
    Integer(i64),
    Float(f64),
    // Keywords
    True,
    False,
    /// `null`, or its Ruby spelling `nil`.
    Null,
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    // Sentinel
    Eof,
}

impl Token {
    /// True if this token can open an argument literal.
    pub fn starts_literal(&self) -> bool {
        matches!(
            self,
            Token::Str(_)
                | Token::Integer(_)
                | Token::Float(_)
                | Token::True
                | Token::False
                | Token::Null
                | Token::LBracket
        )
    }
}

/// A token plus the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithPos {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, line: 1, col: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let (line, col) = (self.line, self.col);
            let token = self.next_token()?;
            let eof = token == Token::Eof;
            tokens.push(TokenWithPos { token, line, col });
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.line, self.col)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            // `#` and `//` both run to end of line
            let rest = &self.src[self.pos..];
            if rest.starts_with('#') || rest.starts_with("//") {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let ch = match self.peek() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        let punct = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ',' => Some(Token::Comma),
            ':' => Some(Token::Colon),
            ';' => Some(Token::Semicolon),
            _ => None,
        };
        if let Some(tok) = punct {
            self.advance();
            return Ok(tok);
        }

        match ch {
            '"' | '\'' => self.lex_string(ch),
            c if c.is_ascii_digit() => self.lex_number(),
            '-' if matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) => self.lex_number(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_ident_or_keyword()),
            other => Err(self.err(format!("unexpected character {:?}", other))),
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, ParseError> {
        self.advance(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(self.err("unterminated string literal")),
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('0') => s.push('\0'),
                    Some(c) => s.push(c),
                    None => return Err(self.err("unterminated escape sequence")),
                },
                Some(c) => s.push(c),
            }
        }
        Ok(Token::Str(s))
    }

    fn eat_digits(&mut self, into: &mut String) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                into.push(c);
                count += 1;
            } else if c != '_' {
                break;
            }
            self.advance();
        }
        count
    }

    fn lex_number(&mut self) -> Result<Token, ParseError> {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        if self.peek() == Some('-') {
            self.advance();
            text.push('-');
        }
        self.eat_digits(&mut text);

        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            text.push('.');
            self.eat_digits(&mut text);
            is_float = true;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.advance();
                text.push(sign);
            }
            if self.eat_digits(&mut text) == 0 {
                return Err(ParseError::new(format!("malformed number {:?}", text), line, col));
            }
            is_float = true;
        }

        if is_float {
            let value = text.parse::<f64>()
                .map_err(|_| ParseError::new(format!("malformed number {:?}", text), line, col))?;
            if !value.is_finite() {
                return Err(ParseError::new(format!("float literal {} out of range", text), line, col));
            }
            Ok(Token::Float(value))
        } else {
            text.parse::<i64>().map(Token::Integer).map_err(|_| {
                ParseError::new(format!("integer literal {} out of range", text), line, col)
            })
        }
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let word = &self.src[start..self.pos];
        // `nil:` is a label like `name:`, so keywords can be mapping keys
        if self.peek() == Some(':') {
            return Token::Ident(word.to_string());
        }
        match word {
            "true" => Token::True,
            "false" => Token::False,
            "null" | "nil" => Token::Null,
            _ => Token::Ident(word.to_string()),
        }
    }
}
