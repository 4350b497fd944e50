//! Configuration for the layout engine

/// Font used to measure and draw text
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 12.0,
        }
    }
}

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Gap between sibling nodes in a row and between rows
    pub node_margin: f64,

    /// Padding inside a node around its label, define block and children
    pub node_padding: f64,

    /// Vertical gap between the label, define block and nested diagram
    pub section_spacing: f64,

    /// Blank border around the whole diagram
    pub canvas_margin: f64,

    /// Height of one line of text
    pub line_height: f64,

    pub font: Font,

    /// Equalize sizes of similar nodes across the diagram
    pub uniform_sizing: bool,

    /// Relative size difference within which nodes are equalized
    pub size_variance: f64,

    /// Width to height ratio wrapped labels aim for
    pub golden_ratio: f64,

    /// Wrapped labels narrower than this ratio keep widening
    pub min_label_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_margin: 20.0,
            node_padding: 8.0,
            section_spacing: 6.0,
            canvas_margin: 10.0,
            line_height: 16.0,
            font: Font::default(),
            uniform_sizing: true,
            size_variance: 0.3,
            golden_ratio: 1.6,
            min_label_ratio: 1.2,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap between sibling nodes
    pub fn with_node_margin(mut self, margin: f64) -> Self {
        self.node_margin = margin;
        self
    }

    /// Set the padding inside nodes
    pub fn with_node_padding(mut self, padding: f64) -> Self {
        self.node_padding = padding;
        self
    }

    pub fn with_font(mut self, family: impl Into<String>, size: f64) -> Self {
        self.font = Font {
            family: family.into(),
            size,
        };
        self
    }

    pub fn with_line_height(mut self, height: f64) -> Self {
        self.line_height = height;
        self
    }

    /// Turn the uniform sizing pass on or off
    pub fn with_uniform_sizing(mut self, enabled: bool) -> Self {
        self.uniform_sizing = enabled;
        self
    }

    pub fn with_size_variance(mut self, variance: f64) -> Self {
        self.size_variance = variance;
        self
    }
}
