//! The crate-level error for conditions that abort an operation outright,
//! as opposed to [`rec_core::Diagnostic`], which accumulates alongside a
//! result instead of aborting it.

use core::fmt;

/// An error that prevents a `rec` operation from producing a result at all.
///
/// `Diagnostic`s (missing mandatory fields, duplicate keys, ...) are
/// reported *alongside* a result; a `RecError` means there is no result to
/// report alongside. This is the library-level analogue of the CLI's
/// "invalid invocation" exit code, as distinct from the exit code used for
/// integrity errors, which surface here as `Diagnostic`s instead.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RecError {
    /// `recsel` was invoked without `--type` and the database holds more
    /// than one record type.
    SeveralRecordTypes,
    /// A malformed `-n`/`--number` index/range list.
    InvalidIndexList(String),
    /// A malformed `-e`/`--expression` selection expression.
    InvalidExpression(String),
}

impl fmt::Display for RecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecError::SeveralRecordTypes => {
                write!(f, "several record types found in database, please use the -t option")
            }
            RecError::InvalidIndexList(s) => write!(f, "invalid index list '{}'", s),
            RecError::InvalidExpression(s) => write!(f, "invalid selection expression: {}", s),
        }
    }
}

impl std::error::Error for RecError {}
