//! Parser for the section-based diagram language

pub mod arrow;
pub mod ast;
mod document;
mod grammar;
pub mod lexer;

pub use arrow::{split_arrow, ArrowHead, ArrowSpec, LineStyle};
pub use ast::*;
pub use document::{parse, validate, Parsed};
pub use grammar::{parse_layout, parse_reference, parse_relate};
