use core::fmt;

use rec_lexer::LexerError;

/// An error produced while parsing a selection expression.
///
/// Runtime coercion failures (an unparseable date under `<<`/`>>`, a bad
/// regex pattern) are not represented here: per the evaluator's failure
/// model they resolve to `false` rather than aborting. `ParserError` is only
/// for syntax the precedence-climbing parser could not make sense of.
#[derive(Clone, Debug, PartialEq)]
pub enum ParserError {
    /// The input could not be tokenized.
    TokenizeError(String),
    /// The token stream did not match the expression grammar.
    ParseError(String),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::TokenizeError(s) => f.write_str(s),
            ParserError::ParseError(s) => f.write_str(s),
        }
    }
}

impl std::error::Error for ParserError {}

impl From<LexerError> for ParserError {
    fn from(err: LexerError) -> Self {
        Self::TokenizeError(err.to_string())
    }
}

pub(crate) fn parse_error<R>(message: impl Into<String>) -> Result<R, ParserError> {
    Err(ParserError::ParseError(message.into()))
}
