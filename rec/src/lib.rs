//! # rec
//!
//! `rec` is a library and toolkit for the plain-text, human-readable rec
//! record database format: selection, integrity checking, and derived
//! transforms (sort, auto-field generation, confidential-field
//! encryption/decryption) over a database of typed, schema-like record sets.
//!
//! The workspace splits the selection-expression ("SEX") language into its
//! own lexer/AST/parser crates, re-exported here as [`lexer`], [`ast`] and
//! [`parser`]. [`core`] holds the shared data model and diagnostic type.

#![warn(missing_docs)]
#![warn(unused_imports)]

pub use rec_ast as ast;
pub use rec_core as core;
pub use rec_lexer as lexer;
pub use rec_parser as parser;

pub mod check;
pub mod error;
pub mod fix;
pub mod format;
pub mod schema;
pub mod select;
pub mod serialize;
pub mod transform;

pub use self::{
    check::check,
    error::RecError,
    fix::{run as fix, FixOptions, FixResult},
    format::parse,
    schema::Schema,
    select::{select, SelectionOutcome, SelectionResult, SelectorOptions},
    serialize::to_string as serialize,
};
pub use rec_core::{all_ok, Database, Diagnostic, Field, Record, RecordDescriptor, RecordSet, Severity};
