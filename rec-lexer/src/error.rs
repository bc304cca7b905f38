use core::fmt;

/// A line/column position in the source of a selection expression.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Location {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
}

impl Location {
    pub(crate) fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub(crate) fn into_error<R>(self, message: impl Into<String>) -> Result<R, LexerError> {
        Err(LexerError {
            message: message.into(),
            line: self.line,
            column: self.column,
        })
    }
}

/// An error produced while tokenizing a selection expression.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexerError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// 1-based line of the offending character.
    pub line: u64,
    /// 1-based column of the offending character.
    pub column: u64,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for LexerError {}
