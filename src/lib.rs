//! Boxwire - nested box diagrams with routed connectors, from plain text
//!
//! This library provides a parser, layout engine, connector router and SVG
//! renderer for a small section-based diagram language.
//!
//! # Example
//!
//! ```rust
//! use boxwire::render;
//!
//! let rendered = render("Layout:\n[Client][Server]\nRelate:\n[Client]->[Server]\n");
//! assert!(rendered.diagnostics.is_empty());
//! assert!(rendered.svg.contains("<svg"));
//! ```

pub mod error;
pub mod geometry;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod routing;
pub mod stylesheet;

pub use error::{Diagnostic, Severity};
pub use layout::{CharWidthMeasurer, LayoutConfig, LayoutResult, Node, TextMeasurer};
pub use parser::{parse, validate, Parsed, Source};
pub use renderer::{render_svg, SvgConfig};
pub use routing::{route, Connector, RoutingConfig};
pub use stylesheet::{Stylesheet, StylesheetError};

use log::info;

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderConfig {
    /// Layout configuration, before stylesheet overrides
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    pub stylesheet: Stylesheet,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the routing configuration
    pub fn with_routing(mut self, config: RoutingConfig) -> Self {
        self.routing = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet for fonts, spacing and colours
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Layout configuration with the stylesheet's font and spacing applied
    pub fn effective_layout(&self) -> LayoutConfig {
        self.stylesheet.apply(self.layout.clone())
    }
}

/// Everything the pipeline produced for one diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub source: Source,
    pub layout: LayoutResult,
    pub connectors: Vec<Connector>,
    /// Parse, validation and routing problems, in that order
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagram {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// SVG output plus the diagnostics collected on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub svg: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse, lay out and route a diagram, estimating text widths from
/// character classes
pub fn build(text: &str, config: &RenderConfig) -> Diagram {
    build_with_measurer(text, config, &CharWidthMeasurer)
}

/// Parse, lay out and route a diagram with a caller-supplied text measurer
pub fn build_with_measurer(text: &str, config: &RenderConfig, measurer: &dyn TextMeasurer) -> Diagram {
    let Parsed {
        source,
        mut diagnostics,
    } = parse(text);

    let layout_config = config.effective_layout();
    let layout = layout::layout(&source, measurer, &layout_config);
    let routed = route(&source, &layout, measurer, &layout_config, &config.routing);
    diagnostics.extend(routed.diagnostics);

    info!(
        nodes = layout.iter().count(),
        connectors = routed.connectors.len(),
        diagnostics = diagnostics.len();
        "Diagram built"
    );
    Diagram {
        source,
        layout,
        connectors: routed.connectors,
        diagnostics,
    }
}

/// Render diagram text to SVG with default configuration
///
/// Problems in the text never abort rendering: whatever could be laid out is
/// drawn and the problems come back as diagnostics.
pub fn render(text: &str) -> Rendered {
    render_with_config(text, RenderConfig::default())
}

/// Render diagram text to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use boxwire::{render_with_config, LayoutConfig, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_layout(LayoutConfig::default().with_node_margin(30.0))
///     .with_svg(SvgConfig::default().with_standalone(false));
///
/// let rendered = render_with_config("Layout:\n[A][B]\n", config);
/// assert!(rendered.svg.starts_with("<svg"));
/// ```
pub fn render_with_config(text: &str, config: RenderConfig) -> Rendered {
    let diagram = build(text, &config);
    let svg = render_svg(&diagram, &config);
    Rendered {
        svg,
        diagnostics: diagram.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_render_simple_row() {
        let rendered = render("Layout:\n[Client][Server]\n");
        assert!(rendered.diagnostics.is_empty());
        assert!(rendered.svg.contains("<svg"));
        assert!(rendered.svg.contains("</svg>"));
        assert!(rendered.svg.contains("Client"));
        assert!(rendered.svg.contains("Server"));
    }

    #[test]
    fn test_render_connection() {
        let rendered = render("Layout:\n[A][B]\nRelate:\n[A]->[B]\n");
        assert!(rendered.svg.contains("bw-connector"));
        assert!(rendered.svg.contains(r#"marker-end="url(#bw-arrow)""#));
        assert!(!rendered.svg.contains("marker-start"));
    }

    #[test]
    fn test_missing_section_still_renders() {
        let rendered = render("Layout:\n[A]\n[A]:\nRelate:\n");
        assert!(rendered.has_errors());
        assert!(rendered.svg.contains(">A</text>"));
    }

    #[test]
    fn test_stylesheet_changes_layout() {
        let text = "Layout:\n[A][B]\n";
        let plain = build(text, &RenderConfig::default());
        let spaced = build(
            text,
            &RenderConfig::new().with_stylesheet(Stylesheet {
                margin: Some(100.0),
                ..Stylesheet::default()
            }),
        );
        let gap = |d: &Diagram| d.layout.nodes[1].absolute_area.x - d.layout.nodes[0].absolute_area.right();
        assert_approx_eq!(f64, gap(&plain), 20.0, epsilon = 1e-9);
        assert_approx_eq!(f64, gap(&spaced), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_custom_measurer() {
        let wide = |_: &layout::Font, text: &str| text.len() as f64 * 20.0;
        let diagram = build_with_measurer("Layout:\n[Hello]\n", &RenderConfig::default(), &wide);
        let node = &diagram.layout.nodes[0];
        assert_eq!(node.label_layout.width, 100.0);
    }
}
