#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::operator::{BinaryOperator, UnaryOperator};

/// A literal value in a selection expression.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// An integer literal.
    Int(i64),
    /// A real-number literal.
    Real(f64),
    /// A string literal.
    Str(String),
}

/// A selection-expression abstract syntax tree node.
///
/// Modeled as a small tagged union, walked directly by the evaluator with no
/// separate lowering pass: `Lit`, `Field`, `Count`, `Unary`, `Binary` and
/// `Ternary` cover the whole selection-expression grammar.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),
    /// A field reference, optionally subscripted: `F` or `F[i]`.
    Field {
        /// The referenced field name.
        name: String,
        /// The `[i]` subscript, if present.
        index: Option<Box<Expr>>,
    },
    /// `#F`: the multiplicity of field `F`.
    Count(Box<Expr>),
    /// A prefix unary operation.
    Unary {
        /// The operator.
        op: UnaryOperator,
        /// The operand.
        expr: Box<Expr>,
    },
    /// An infix binary operation.
    Binary {
        /// The left operand.
        left: Box<Expr>,
        /// The operator.
        op: BinaryOperator,
        /// The right operand.
        right: Box<Expr>,
    },
    /// `C ? X : Y`.
    Ternary {
        /// The condition.
        cond: Box<Expr>,
        /// The value when `cond` is truthy.
        then_branch: Box<Expr>,
        /// The value when `cond` is not truthy.
        else_branch: Box<Expr>,
    },
}
