//! Layout engine for computing node positions and sizes
//!
//! This module takes a parsed `Source` tree and computes the spatial layout,
//! producing a `LayoutResult` of absolutely positioned nodes.

pub mod config;
pub mod engine;
pub mod text;
pub mod types;

pub use config::{Font, LayoutConfig};
pub use engine::layout;
pub use text::{CharWidthMeasurer, TextBlock, TextMeasurer};
pub use types::*;
