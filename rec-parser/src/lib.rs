//! # rec-parser
//!
//! Precedence-climbing parser and tree-walking evaluator for the
//! selection-expression (SEX) language used by `%constraint` directives and
//! the `-e` selector filter.

#![warn(missing_docs)]
#![warn(unused_imports)]

mod error;
mod eval;
mod parser;

pub use self::{
    error::ParserError,
    eval::{eval, eval_bool, EvalContext, Value},
    parser::{parse, Parser},
};
