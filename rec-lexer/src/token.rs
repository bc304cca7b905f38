use core::fmt;

/// A single lexical token of the selection-expression (SEX) language.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// An integer literal, already parsed (decimal, `0x`-hex, or leading-zero octal).
    Integer(i64),
    /// A real-number literal, already parsed.
    Real(f64),
    /// A single- or double-quoted string literal, with escapes already resolved.
    Str(String),
    /// A field-name identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Field(String),

    /// `?`
    Question,
    /// `:`
    Colon,
    /// `=>`
    Implies,
    /// `||`
    OrOr,
    /// `&&`
    AndAnd,
    /// `!`
    Bang,
    /// `=` or `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`
    DateBefore,
    /// `>>`
    DateAfter,
    /// `~`
    Tilde,
    /// `&`
    Amp,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `#`
    Hash,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// End of input.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{}", n),
            Token::Real(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "{:?}", s),
            Token::Field(s) => write!(f, "{}", s),
            Token::Question => f.write_str("?"),
            Token::Colon => f.write_str(":"),
            Token::Implies => f.write_str("=>"),
            Token::OrOr => f.write_str("||"),
            Token::AndAnd => f.write_str("&&"),
            Token::Bang => f.write_str("!"),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("!="),
            Token::Less => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::Greater => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
            Token::DateBefore => f.write_str("<<"),
            Token::DateAfter => f.write_str(">>"),
            Token::Tilde => f.write_str("~"),
            Token::Amp => f.write_str("&"),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::Hash => f.write_str("#"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Eof => f.write_str("<eof>"),
        }
    }
}
