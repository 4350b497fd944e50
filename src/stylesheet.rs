//! Stylesheets: font, spacing and colours loaded from TOML
//!
//! A stylesheet overrides parts of the layout configuration and supplies the
//! colour palette the SVG backend writes as CSS custom properties. Every
//! section is optional; anything left out keeps its default.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::layout::LayoutConfig;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Colour tokens the renderer understands, with their defaults
pub const COLOR_TOKENS: [(&str, &str); 5] = [
    ("node-fill", "#ffffff"),
    ("node-stroke", "#333333"),
    ("line", "#333333"),
    ("text", "#1a1a1a"),
    ("rule", "#999999"),
];

/// A parsed stylesheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    /// Gap between sibling scopes
    pub margin: Option<f64>,
    /// Padding inside scopes
    pub padding: Option<f64>,
    /// Colour overrides: token name -> CSS colour
    pub colors: BTreeMap<String, String>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    font: Option<TomlFont>,
    spacing: Option<TomlSpacing>,
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlFont {
    family: Option<String>,
    size: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSpacing {
    margin: Option<f64>,
    padding: Option<f64>,
}

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        debug!(path = path.display().to_string(); "Loading stylesheet");
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        for token in parsed.colors.keys() {
            if !COLOR_TOKENS.iter().any(|(known, _)| known == token) {
                warn!(token; "Unknown colour token in stylesheet");
            }
        }

        let font = parsed.font.unwrap_or(TomlFont {
            family: None,
            size: None,
        });
        let spacing = parsed.spacing.unwrap_or(TomlSpacing {
            margin: None,
            padding: None,
        });
        Ok(Stylesheet {
            name: parsed.metadata.and_then(|m| m.name),
            font_family: font.family,
            font_size: font.size,
            margin: spacing.margin,
            padding: spacing.padding,
            colors: parsed.colors,
        })
    }

    /// Resolve a colour token, falling back to the built-in palette
    pub fn color(&self, token: &str) -> &str {
        self.colors
            .get(token)
            .map(String::as_str)
            .or_else(|| {
                COLOR_TOKENS
                    .iter()
                    .find(|(known, _)| *known == token)
                    .map(|(_, value)| *value)
            })
            .unwrap_or("#333333")
    }

    /// Apply font and spacing overrides to a layout configuration
    pub fn apply(&self, mut config: LayoutConfig) -> LayoutConfig {
        if let Some(family) = &self.font_family {
            config.font.family = family.clone();
        }
        if let Some(size) = self.font_size {
            let line_height = config.line_height.max(size * 4.0 / 3.0);
            config.font.size = size;
            config = config.with_line_height(line_height);
        }
        if let Some(margin) = self.margin {
            config = config.with_node_margin(margin);
        }
        if let Some(padding) = self.padding {
            config = config.with_node_padding(padding);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.color("node-fill"), "#ffffff");
        assert_eq!(stylesheet.color("line"), "#333333");
        assert_eq!(stylesheet.color("nonexistent"), "#333333");
    }

    #[test]
    fn test_parse_full_stylesheet() {
        let toml_str = r##"
[metadata]
name = "Dark"

[font]
family = "monospace"
size = 15

[spacing]
margin = 30
padding = 12

[colors]
node-fill = "#222222"
text = "#eeeeee"
"##;
        let stylesheet = Stylesheet::from_str(toml_str).expect("Should parse");
        assert_eq!(stylesheet.name, Some("Dark".to_string()));
        assert_eq!(stylesheet.color("node-fill"), "#222222");
        assert_eq!(stylesheet.color("text"), "#eeeeee");
        assert_eq!(stylesheet.color("rule"), "#999999");

        let config = stylesheet.apply(LayoutConfig::default());
        assert_eq!(config.font.family, "monospace");
        assert_eq!(config.font.size, 15.0);
        assert_eq!(config.line_height, 20.0);
        assert_eq!(config.node_margin, 30.0);
        assert_eq!(config.node_padding, 12.0);
    }

    #[test]
    fn test_empty_stylesheet_keeps_defaults() {
        let stylesheet = Stylesheet::from_str("").expect("Should parse");
        assert_eq!(stylesheet, Stylesheet::default());
        assert_eq!(stylesheet.apply(LayoutConfig::default()), LayoutConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(Stylesheet::from_str("[shapes]\nround = true\n").is_err());
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        let result = Stylesheet::from_str(invalid);
        assert!(matches!(result, Err(StylesheetError::ParseError(_))));
    }
}
