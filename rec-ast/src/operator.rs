use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Prefix operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOperator {
    /// `-x`: numeric negation.
    Neg,
    /// `!x`: logical not.
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neg => "-",
            Self::Not => "!",
        })
    }
}

/// Binary (infix) operators, ordered here from lowest to highest precedence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOperator {
    /// `=>`: logical implication, `A => B` is `!A || B`.
    Implies,
    /// `||`: logical or.
    Or,
    /// `&&`: logical and.
    And,
    /// `=` or `==`: equality.
    Equal,
    /// `!=`: inequality.
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`: date-before.
    DateBefore,
    /// `>>`: date-after.
    DateAfter,
    /// `~`: regex match.
    Match,
    /// `&`: string concatenation.
    Concat,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Implies => "=>",
            Self::Or => "||",
            Self::And => "&&",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::DateBefore => "<<",
            Self::DateAfter => ">>",
            Self::Match => "~",
            Self::Concat => "&",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        })
    }
}
