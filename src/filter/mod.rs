//! # Filter Module
//!
//! Filter grammar: values, expression tree, and the parser that builds it.

pub mod ast;
pub mod parser;
pub mod value;

pub use ast::{FilterLeaf, FilterNode, FilterOperator};
pub use parser::{decode_filters, parse_filters};
pub use value::FilterValue;
