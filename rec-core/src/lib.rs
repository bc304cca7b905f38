//! # rec-core
//!
//! rec-core is the foundation crate for the `rec` toolkit: the value types
//! that make up a parsed database (fields, records, descriptors, record
//! sets), and the diagnostic type every stage of the pipeline reports
//! through.

#![warn(missing_docs)]
#![warn(unused_imports)]

mod diagnostic;
mod model;

pub use self::{
    diagnostic::{all_ok, Diagnostic, Severity},
    model::{is_valid_field_name, Database, Field, Record, RecordDescriptor, RecordSet},
};
