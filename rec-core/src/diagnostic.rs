#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;

/// The severity of a [`Diagnostic`].
///
/// Only `Error` affects whether a check or a transform is considered to have
/// failed; `Warning` is informational.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Informational; does not cause a check to fail.
    Warning,
    /// Causes a check to fail and gates destructive transforms unless forced.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A single diagnostic produced by the format parser, the integrity checker,
/// or a transform.
///
/// Diagnostics are accumulated rather than aborting the operation that
/// produced them: the parser resynchronises at the next blank line, the
/// checker keeps walking every record set, and transforms record what went
/// wrong instead of panicking.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Severity of the diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Record type the diagnostic applies to, if known.
    pub record_type: Option<String>,
    /// Zero-based index of the record within its record set, if applicable.
    pub record_index: Option<usize>,
    /// Name of the field the diagnostic is about, if applicable.
    pub field_name: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic with no context beyond severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            record_type: None,
            record_index: None,
            field_name: None,
        }
    }

    /// Creates an `error`-severity diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a `warning`-severity diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Attaches a record type to this diagnostic.
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Attaches a record index to this diagnostic.
    pub fn with_record_index(mut self, index: usize) -> Self {
        self.record_index = Some(index);
        self
    }

    /// Attaches a field name to this diagnostic.
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// True iff this diagnostic's severity is `Error`.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(rt) = &self.record_type {
            write!(f, " (record type {})", rt)?;
        }
        if let Some(idx) = self.record_index {
            write!(f, " (record #{})", idx)?;
        }
        if let Some(field) = &self.field_name {
            write!(f, " (field {})", field)?;
        }
        Ok(())
    }
}

/// Returns true iff none of `diagnostics` has [`Severity::Error`].
pub fn all_ok(diagnostics: &[Diagnostic]) -> bool {
    !diagnostics.iter().any(Diagnostic::is_error)
}
