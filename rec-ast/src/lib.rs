//! # rec-ast
//!
//! Abstract syntax tree for the selection-expression (SEX) language.

#![warn(missing_docs)]
#![warn(unused_imports)]

mod expr;
mod operator;

pub use self::{
    expr::{Expr, Literal},
    operator::{BinaryOperator, UnaryOperator},
};
