//! SVG generation from a built diagram

use std::collections::BTreeSet;

use log::debug;

use crate::geometry::{Area, Point};
use crate::layout::{LayoutConfig, Node};
use crate::parser::{ArrowHead, LineStyle};
use crate::routing::{Connector, TextAnchor};
use crate::stylesheet::{Stylesheet, COLOR_TOKENS};
use crate::{Diagram, RenderConfig};

use super::markers::{marker_def, marker_id};
use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    styles: Vec<String>,
    elements: Vec<String>,
    connections: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            styles: vec![],
            elements: vec![],
            connections: vec![],
            indent: 1,
        }
    }

    /// Add CSS custom properties for the palette and the class rules using them
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet, layout: &LayoutConfig) {
        let prefix = self.prefix();
        let mut css = String::from(":root {");
        for (token, _) in COLOR_TOKENS {
            css.push_str(&format!(" --{}: {};", token, stylesheet.color(token)));
        }
        css.push_str(" }");
        self.styles.push(css);
        self.styles.push(format!(
            ".{p}node {{ fill: var(--node-fill); stroke: var(--node-stroke); stroke-width: 1; }}",
            p = prefix
        ));
        self.styles.push(format!(
            ".{p}label, .{p}define, .{p}edge-label {{ fill: var(--text); font-family: {}; font-size: {}px; }}",
            layout.font.family,
            layout.font.size,
            p = prefix
        ));
        self.styles.push(format!(".{p}label {{ font-weight: bold; }}", p = prefix));
        self.styles
            .push(format!(".{p}rule {{ stroke: var(--rule); stroke-width: 1; }}", p = prefix));
        self.styles.push(format!(
            ".{p}connector {{ fill: none; stroke: var(--line); stroke-width: 1.5; }}",
            p = prefix
        ));
        self.styles
            .push(format!(".{p}bold {{ stroke-width: 3; }}", p = prefix));
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the marker definition for an arrowhead
    pub fn add_marker(&mut self, head: ArrowHead, size: f64) {
        let prefix = self.prefix();
        self.defs.push(marker_def(&prefix, head, size));
    }

    /// Add a scope rectangle
    pub fn add_rect(&mut self, area: &Area) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<rect class="{}node" x="{}" y="{}" width="{}" height="{}"/>"#,
            self.indent_str(),
            prefix,
            area.x,
            area.y,
            area.width,
            area.height
        ));
    }

    /// Add a text element vertically centred on `y`
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAnchor, class: &str) {
        let line = format!(
            r#"{}<text class="{}{}" x="{}" y="{}" text-anchor="{}" dominant-baseline="central">{}</text>"#,
            self.indent_str(),
            self.prefix(),
            class,
            x,
            y,
            anchor.as_svg(),
            escape_xml(text)
        );
        self.elements.push(line);
    }

    /// Add a horizontal rule across a define block
    pub fn add_rule(&mut self, x1: f64, x2: f64, y: f64) {
        self.elements.push(format!(
            r#"{}<line class="{}rule" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            self.indent_str(),
            self.prefix(),
            x1,
            y,
            x2,
            y
        ));
    }

    /// Add the polyline of a connector
    pub fn add_connector_path(
        &mut self,
        path: &[Point],
        classes: &[String],
        dash: Option<&str>,
        marker_start: Option<ArrowHead>,
        marker_end: Option<ArrowHead>,
    ) {
        let prefix = self.prefix();
        let class_list = std::iter::once(format!("{}connector", prefix))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        let dash = dash
            .map(|d| format!(r#" stroke-dasharray="{}""#, d))
            .unwrap_or_default();
        let marker = |attr: &str, head: Option<ArrowHead>| {
            head.map(|h| format!(r#" {}="url(#{})""#, attr, marker_id(&prefix, h)))
                .unwrap_or_default()
        };

        self.connections.push(format!(
            r#"{}<path class="{}" d="{}"{}{}{}/>"#,
            self.indent_str(),
            class_list,
            path_to_d(path),
            dash,
            marker("marker-start", marker_start),
            marker("marker-end", marker_end)
        ));
    }

    /// Add a connector label, drawn above the connectors
    pub fn add_connector_label(&mut self, text: &str, position: Point, anchor: TextAnchor) {
        self.connections.push(format!(
            r#"{}<text class="{}edge-label" x="{}" y="{}" text-anchor="{}" dominant-baseline="central">{}</text>"#,
            self.indent_str(),
            self.prefix(),
            position.x,
            position.y,
            anchor.as_svg(),
            escape_xml(text)
        ));
    }

    /// Open a group for a scope and its contents
    pub fn start_group(&mut self, path: &str) {
        if !self.config.scope_groups {
            return;
        }
        self.elements.push(format!(
            r#"{}<g class="{}scope" data-path="{}">"#,
            self.indent_str(),
            self.prefix(),
            escape_xml(path)
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        if !self.config.scope_groups {
            return;
        }
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: Area) -> String {
        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            viewbox.x, viewbox.y, viewbox.width, viewbox.height, viewbox.width, viewbox.height
        ));
        svg.push_str(nl);

        if let Some(title) = &self.config.title {
            svg.push_str(&format!("  <title>{}</title>", escape_xml(title)));
            svg.push_str(nl);
        }

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        if !self.defs.is_empty() {
            svg.push_str("  <defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str("    ");
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str("  </defs>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        // Connectors go on top of the scopes
        for conn in &self.connections {
            svg.push_str(conn);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render a built diagram to an SVG string
pub fn render_svg(diagram: &Diagram, config: &RenderConfig) -> String {
    let layout_config = config.effective_layout();
    let mut builder = SvgBuilder::new(config.svg.clone());
    builder.add_stylesheet(&config.stylesheet, &layout_config);

    let heads: BTreeSet<&'static str> = diagram
        .connectors
        .iter()
        .flat_map(|c| [c.start_head, c.end_head])
        .flatten()
        .map(|h| h.name())
        .collect();
    for head in ArrowHead::ALL.iter().filter(|h| heads.contains(h.name())) {
        builder.add_marker(*head, config.routing.arrow_size);
    }

    for node in &diagram.layout.nodes {
        render_node(node, &layout_config, &mut builder);
    }

    for connector in &diagram.connectors {
        render_connector(connector, &mut builder);
    }

    let viewbox = viewbox(diagram, layout_config.canvas_margin);
    debug!(
        nodes = diagram.layout.nodes.len(),
        connectors = diagram.connectors.len(),
        width = viewbox.width,
        height = viewbox.height;
        "Rendered SVG"
    );
    builder.build(viewbox)
}

/// Canvas area grown to take in connectors that leave it, such as curls
/// climbing above the top row
fn viewbox(diagram: &Diagram, margin: f64) -> Area {
    let canvas = Area::new(0.0, 0.0, diagram.layout.width, diagram.layout.height);
    diagram
        .connectors
        .iter()
        .flat_map(|c| {
            c.points
                .iter()
                .copied()
                .chain(c.labels.iter().map(|l| l.position))
        })
        .fold(canvas, |area, p| {
            area.union(&Area::new(p.x, p.y, 0.0, 0.0).inflate(margin))
        })
}

fn render_node(node: &Node, config: &LayoutConfig, builder: &mut SvgBuilder) {
    let area = node.absolute_area;
    let line_height = config.line_height;
    builder.start_group(&node.dotted_path());
    builder.add_rect(&area);

    let label = &node.label_layout;
    let top = if node.is_header {
        area.y + node.bands.label_y
    } else {
        area.y + (area.height - label.height) / 2.0
    };
    for (i, line) in label.lines.iter().enumerate() {
        let y = top + line_height * (i as f64 + 0.5);
        builder.add_text(line, area.center().x, y, TextAnchor::Middle, "label");
    }

    if let Some(define) = &node.define_layout {
        let top = area.y + node.bands.define_y;
        let x = area.x + config.node_padding;
        builder.add_rule(area.x, area.right(), top - config.section_spacing / 2.0);
        for (i, line) in define.lines.iter().enumerate() {
            let y = top + line_height * (i as f64 + 0.5);
            builder.add_text(line, x, y, TextAnchor::Start, "define");
        }
        for &after in &define.rules {
            builder.add_rule(area.x, area.right(), top + line_height * after as f64);
        }
    }

    for child in &node.children {
        render_node(child, config, builder);
    }
    builder.end_group();
}

fn render_connector(connector: &Connector, builder: &mut SvgBuilder) {
    let mut classes = vec![];
    if connector.bold {
        classes.push(format!("{}bold", builder.prefix()));
    }
    let dash = match connector.style {
        LineStyle::Solid => None,
        LineStyle::Dashed => Some("6 4"),
        LineStyle::Dotted => Some("2 3"),
    };

    builder.add_connector_path(
        &connector.points,
        &classes,
        dash,
        connector.start_head,
        connector.end_head,
    );

    for label in &connector.labels {
        builder.add_connector_label(&label.text, label.position, label.anchor);
    }
}

/// Convert a path of points to an SVG path d attribute
fn path_to_d(path: &[Point]) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut d = format!("M{} {}", path[0].x, path[0].y);
    for point in &path[1..] {
        d.push_str(&format!(" L{} {}", point.x, point.y));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
