//! # rec-lexer
//!
//! Tokenizer for the selection-expression (SEX) language used by `%constraint`,
//! `%size`, and selector `-e` expressions.

#![warn(missing_docs)]
#![warn(unused_imports)]

mod error;
mod lexer;
mod token;

pub use self::{
    error::{LexerError, Location},
    lexer::Lexer,
    token::Token,
};
