use core::{iter::Peekable, str::Chars};

use crate::{
    error::{LexerError, Location},
    token::Token,
};

/// Tokenizer for the selection-expression (SEX) language.
///
/// Whitespace is skipped implicitly; the lexer never emits a whitespace
/// token. Call [`Lexer::tokenize`] to drain the whole input at once.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    location: Location,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            iter: input.chars().peekable(),
            location: Location { line: 1, column: 1 },
        }
    }

    /// The lexer's current position in the input.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Tokenizes the whole input, returning a token stream terminated by
    /// exactly one [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        tokens.push(Token::Eof);
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_whitespace();
        match self.iter.peek().copied() {
            None => Ok(None),
            Some(ch) => match ch {
                '\'' | '"' => {
                    self.next_char();
                    Ok(Some(Token::Str(self.tokenize_string(ch)?)))
                }
                c if c.is_ascii_digit() => Ok(Some(self.tokenize_number()?)),
                '.' => {
                    // `.digits` is a real literal; a bare `.` is not valid SEX syntax.
                    let mut lookahead = self.iter.clone();
                    lookahead.next();
                    if lookahead.next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                        Ok(Some(self.tokenize_number()?))
                    } else {
                        self.next_char();
                        self.error(format!("unexpected character '{}'", '.'))
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    Ok(Some(Token::Field(self.tokenize_ident())))
                }
                _ => self.tokenize_symbol(),
            },
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.iter.peek() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn tokenize_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&ch) = self.iter.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.next_char();
            } else {
                break;
            }
        }
        ident
    }

    fn tokenize_string(&mut self, quote: char) -> Result<String, LexerError> {
        let mut value = String::new();
        loop {
            match self.next_char() {
                None => return self.error("unterminated string literal"),
                Some('\\') => match self.next_char() {
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return self.error("unterminated escape in string literal"),
                },
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
            }
        }
    }

    fn tokenize_number(&mut self) -> Result<Token, LexerError> {
        let mut raw = String::new();

        // hex: 0x... / 0X...
        if self.iter.peek() == Some(&'0') {
            let mut lookahead = self.iter.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some('x') | Some('X')) {
                self.next_char(); // '0'
                self.next_char(); // 'x'/'X'
                let digits = self.take_while(|c| c.is_ascii_hexdigit());
                if digits.is_empty() {
                    return self.error("malformed hexadecimal integer literal");
                }
                let value = i64::from_str_radix(&digits, 16).unwrap_or(0);
                return Ok(Token::Integer(value));
            }
        }

        raw.push_str(&self.take_while(|c| c.is_ascii_digit()));

        let mut is_real = false;
        if self.iter.peek() == Some(&'.') {
            let mut lookahead = self.iter.clone();
            lookahead.next();
            if lookahead.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) || !raw.is_empty() {
                is_real = true;
                self.next_char();
                raw.push('.');
                raw.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }

        if is_real {
            let value: f64 = raw.parse().unwrap_or(0.0);
            return Ok(Token::Real(value));
        }

        // octal: leading zero, more than one digit, no '.'
        if raw.len() > 1 && raw.starts_with('0') {
            let value = i64::from_str_radix(&raw, 8).unwrap_or(0);
            return Ok(Token::Integer(value));
        }

        let value: i64 = raw.parse().unwrap_or(0);
        Ok(Token::Integer(value))
    }

    fn tokenize_symbol(&mut self) -> Result<Option<Token>, LexerError> {
        let ch = self.next_char().expect("peeked non-empty");
        let token = match ch {
            '?' => Token::Question,
            ':' => Token::Colon,
            '~' => Token::Tilde,
            '+' => Token::Plus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '#' => Token::Hash,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' => {
                // `==` is accepted as a spelling of `=`, not a distinct operator.
                self.next_if_is('=');
                if self.next_if_is('>') {
                    Token::Implies
                } else {
                    Token::Equal
                }
            }
            '!' => {
                if self.next_if_is('=') {
                    Token::NotEqual
                } else {
                    Token::Bang
                }
            }
            '<' => {
                if self.next_if_is('<') {
                    Token::DateBefore
                } else if self.next_if_is('=') {
                    Token::LessEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                if self.next_if_is('>') {
                    Token::DateAfter
                } else if self.next_if_is('=') {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '&' => {
                if self.next_if_is('&') {
                    Token::AndAnd
                } else {
                    Token::Amp
                }
            }
            '|' => {
                if self.next_if_is('|') {
                    Token::OrOr
                } else {
                    return self.error("unexpected character '|'");
                }
            }
            '-' => Token::Minus,
            other => return self.error(format!("unexpected character '{}'", other)),
        };
        Ok(Some(token))
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> String {
        let mut value = String::new();
        while let Some(&ch) = self.iter.peek() {
            if predicate(ch) {
                value.push(ch);
                self.next_char();
            } else {
                break;
            }
        }
        value
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.iter.next()?;
        self.location.advance(ch);
        Some(ch)
    }

    fn next_if_is(&mut self, expected: char) -> bool {
        if self.iter.peek() == Some(&expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn error<R>(&self, message: impl Into<String>) -> Result<R, LexerError> {
        self.location.into_error(message)
    }
}
