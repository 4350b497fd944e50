//! SVG rendering backend
//!
//! Draws positioned nodes and routed connectors as an SVG document with CSS
//! classes and custom properties for styling.

pub mod config;
mod markers;
pub mod svg;

pub use config::SvgConfig;
pub use svg::render_svg;
