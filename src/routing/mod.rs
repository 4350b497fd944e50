//! Connector routing
//!
//! Turns the relations of a `Source` tree into drawable connectors between
//! the positioned nodes of a `LayoutResult`. For each edge, candidate paths
//! are generated from how the two endpoint rectangles sit relative to each
//! other, the first one that keeps clear of unrelated scopes is chosen,
//! parallel straight lines that would coincide are fanned out, and labels
//! are placed along the final polyline.

pub mod candidates;
pub mod coincide;
pub mod labels;
pub mod path;
pub mod select;

use log::{debug, info, warn};

use crate::error::Diagnostic;
use crate::geometry::{Area, Point};
use crate::layout::{LayoutConfig, LayoutResult, Node, TextMeasurer};
use crate::parser::{Address, ArrowHead, ArrowSpec, EdgeLabels, LineStyle, Source};

pub use labels::{LabelLayout, LabelPlacer, LabelSlot, TextAnchor};
pub use path::PathKind;
pub use select::Route;

use candidates::{classify, generate, Relation};

/// Configuration options for connector routing
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Clearance kept between a connector and the scopes it avoids
    pub gap: f64,

    /// How far above both endpoints a curl may climb
    pub curl_reach: f64,

    /// Length of an arrowhead along its line
    pub arrow_size: f64,

    /// Distance between a label and its line
    pub label_offset: f64,

    /// Horizontal inset of a curl's diagonal shoulders
    pub curl_inset: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            gap: 6.0,
            curl_reach: 30.0,
            arrow_size: 8.0,
            label_offset: 4.0,
            curl_inset: 8.0,
        }
    }
}

impl RoutingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_curl_reach(mut self, reach: f64) -> Self {
        self.curl_reach = reach;
        self
    }

    pub fn with_arrow_size(mut self, size: f64) -> Self {
        self.arrow_size = size;
        self
    }

    pub fn with_label_offset(mut self, offset: f64) -> Self {
        self.label_offset = offset;
        self
    }

    pub fn with_curl_inset(mut self, inset: f64) -> Self {
        self.curl_inset = inset;
        self
    }
}

/// A routed relation edge, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// Dotted label path of the start node
    pub from: String,
    /// Dotted label path of the end node
    pub to: String,
    pub points: Vec<Point>,
    /// `None` for a direct diagonal line
    pub kind: Option<PathKind>,
    pub style: LineStyle,
    pub bold: bool,
    pub start_head: Option<ArrowHead>,
    pub end_head: Option<ArrowHead>,
    pub labels: Vec<LabelLayout>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteResult {
    pub connectors: Vec<Connector>,
    pub diagnostics: Vec<Diagnostic>,
}

/// An edge whose endpoints were found, waiting to be routed
struct Edge<'a> {
    from: &'a Node,
    to: &'a Node,
    spec: ArrowSpec,
    labels: &'a EdgeLabels,
}

/// Route every relation in `source` between nodes of `layout`
pub fn route(
    source: &Source,
    layout: &LayoutResult,
    measurer: &dyn TextMeasurer,
    layout_config: &LayoutConfig,
    config: &RoutingConfig,
) -> RouteResult {
    let mut diagnostics = Vec::new();
    let edges = collect_edges(source, layout, &mut diagnostics);
    debug!(edges = edges.len(); "Routing relations");

    let mut routes = Vec::with_capacity(edges.len());
    let mut routed = Vec::with_capacity(edges.len());
    for edge in &edges {
        let (from, to) = (edge.from.absolute_area, edge.to.absolute_area);
        if edge.from.path == edge.to.path || classify(&from, &to) == Relation::Overlapping {
            warn!(from = edge.from.dotted_path(), to = edge.to.dotted_path(); "Overlapping endpoints");
            diagnostics.push(Diagnostic::OverlappingEndpoints {
                from: edge.from.dotted_path(),
                to: edge.to.dotted_path(),
            });
            continue;
        }

        let obstacles = obstacles(layout, edge.from, edge.to);
        let (candidates, direct) = generate(&from, &to, config);
        let Some(selection) = select::select(&candidates, direct, &obstacles, config) else {
            continue;
        };
        if selection.unroutable {
            warn!(from = edge.from.dotted_path(), to = edge.to.dotted_path(); "No clear route");
            diagnostics.push(Diagnostic::UnroutableConnector {
                from: edge.from.dotted_path(),
                to: edge.to.dotted_path(),
            });
        }
        routes.push(selection.route);
        routed.push(edge);
    }

    coincide::separate(&mut routes);

    let placer = LabelPlacer {
        measurer,
        font: &layout_config.font,
        line_height: layout_config.line_height,
        config,
    };
    let connectors: Vec<Connector> = routed
        .into_iter()
        .zip(routes)
        .map(|(edge, route)| {
            let (points, kind) = match route {
                Route::Path(path) => (path.drawn_points(config.curl_inset), Some(path.kind)),
                Route::Direct(line) => (vec![line.start, line.end], None),
            };
            let labels = placer.place(
                &points,
                edge.labels,
                edge.spec.start.is_some(),
                edge.spec.end.is_some(),
            );
            Connector {
                from: edge.from.dotted_path(),
                to: edge.to.dotted_path(),
                points,
                kind,
                style: edge.spec.style,
                bold: edge.spec.bold,
                start_head: edge.spec.start,
                end_head: edge.spec.end,
                labels,
            }
        })
        .collect();

    info!(connectors = connectors.len(), diagnostics = diagnostics.len(); "Routing complete");
    RouteResult {
        connectors,
        diagnostics,
    }
}

/// Expand every relation record into edges between positioned nodes
fn collect_edges<'a>(
    source: &'a Source,
    layout: &'a LayoutResult,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Edge<'a>> {
    let mut edges = Vec::new();
    source.walk(&mut Vec::new(), &mut |scope_path, scope| {
        let Some(records) = &scope.relate else {
            return;
        };
        for record in records {
            let spec = record.arrow_spec();
            for (start, end) in record.edges() {
                let from = find_node(layout, scope_path, start);
                let to = find_node(layout, scope_path, end);
                for (address, found) in [(start, from), (end, to)] {
                    if found.is_none() {
                        warn!(address:% = address; "Relation endpoint not laid out");
                        diagnostics.push(Diagnostic::UnresolvedAddress {
                            address: address.to_string(),
                            scope: scope_path.join("."),
                        });
                    }
                }
                if let (Some(from), Some(to)) = (from, to) {
                    edges.push(Edge {
                        from,
                        to,
                        spec,
                        labels: &record.labels,
                    });
                }
            }
        }
    });
    edges
}

/// Resolve a relation endpoint: a label path from the root first, then
/// relative to the relating scope; aliases anywhere
fn find_node<'a>(layout: &'a LayoutResult, scope: &[String], address: &Address) -> Option<&'a Node> {
    match address {
        Address::Path(path) => layout
            .find_dotted(path)
            .or_else(|| layout.find_path(scope)?.find_dotted(path)),
        Address::Alias(alias) => layout.find_alias(alias),
        Address::AliasPath(alias, path) => layout.find_alias(alias)?.find_dotted(path),
    }
}

/// Areas a connector must keep out of: every node that is neither an
/// endpoint nor related to one by nesting
fn obstacles(layout: &LayoutResult, from: &Node, to: &Node) -> Vec<Area> {
    let related = |node: &Node| {
        [from, to].iter().any(|end| {
            node.path == end.path || node.is_ancestor_of(end) || end.is_ancestor_of(node)
        })
    };
    layout
        .iter()
        .filter(|node| !related(node))
        .map(|node| node.absolute_area)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, CharWidthMeasurer};
    use crate::parser::parse;
    use crate::routing::select::crosses;

    fn run(text: &str) -> (LayoutResult, RouteResult) {
        run_with(text, &RoutingConfig::default())
    }

    fn run_with(text: &str, routing: &RoutingConfig) -> (LayoutResult, RouteResult) {
        let parsed = parse(text);
        let config = LayoutConfig::default();
        let result = layout(&parsed.source, &CharWidthMeasurer, &config);
        let routed = route(&parsed.source, &result, &CharWidthMeasurer, &config, routing);
        (result, routed)
    }

    #[test]
    fn test_side_by_side_arrow() {
        let (layout, routed) = run("Layout:\n[A][B]\nRelate:\n[A]->[B]\n");
        assert!(routed.diagnostics.is_empty());
        assert_eq!(routed.connectors.len(), 1);
        let connector = &routed.connectors[0];
        assert_eq!(connector.kind, Some(PathKind::Straight));
        assert_eq!(connector.start_head, None);
        assert_eq!(connector.end_head, Some(ArrowHead::Arrow));

        let a = layout.find_path(&["A".to_string()]).unwrap().absolute_area;
        let b = layout.find_path(&["B".to_string()]).unwrap().absolute_area;
        assert_eq!(connector.points.len(), 2);
        assert_eq!(connector.points[0].x, a.right());
        assert_eq!(connector.points[1].x, b.x);
    }

    #[test]
    fn test_cross_product_and_coincidence() {
        let (_, routed) = run("Layout:\n[A][B]\nRelate:\n[A]->[B]\n[A]-->[B]\n[B]->[A]\n");
        assert_eq!(routed.connectors.len(), 3);
        let ys: Vec<f64> = routed.connectors.iter().map(|c| c.points[0].y).collect();
        assert_ne!(ys[0], ys[1]);
        assert_ne!(ys[1], ys[2]);
        assert_ne!(ys[0], ys[2]);
        assert_eq!(routed.connectors[1].style, LineStyle::Dashed);
    }

    #[test]
    fn test_unknown_endpoint_reported() {
        let (_, routed) = run("Layout:\n[A][B]\nRelate:\n[A]->[Nowhere]\n");
        assert!(routed.connectors.is_empty());
        assert!(matches!(
            &routed.diagnostics[..],
            [Diagnostic::UnresolvedAddress { address, .. }] if address == "[Nowhere]"
        ));
    }

    #[test]
    fn test_relation_to_parent_overlaps() {
        let text = "Layout:\n[A]\n[A]:\nLayout:\n[B]\nRelate:\n[B]->[A]\n";
        let (_, routed) = run(text);
        assert!(routed.connectors.is_empty());
        assert!(matches!(
            routed.diagnostics[..],
            [Diagnostic::OverlappingEndpoints { .. }]
        ));
    }

    #[test]
    fn test_nested_scope_relation_resolves_relative_path() {
        let text = "Layout:\n[Box]\n[Box]:\nLayout:\n[Left][Right]\nRelate:\n[Left]->[Right] \"calls\"\n";
        let (_, routed) = run(text);
        assert_eq!(routed.connectors.len(), 1);
        let connector = &routed.connectors[0];
        assert_eq!(connector.from, "Box.Left");
        assert_eq!(connector.to, "Box.Right");
        assert_eq!(connector.labels.len(), 1);
        assert_eq!(connector.labels[0].slot, LabelSlot::Middle);
    }

    #[test]
    fn test_root_path_wins_over_relative_path() {
        let text = "Layout:\n[Left][Box]\n[Box]:\nLayout:\n[Left][Right]\nRelate:\n[Left]->[Right]\n";
        let (_, routed) = run(text);
        let ends: Vec<(&str, &str)> = routed
            .connectors
            .iter()
            .map(|c| (c.from.as_str(), c.to.as_str()))
            .collect();
        assert_eq!(ends, vec![("Left", "Box.Right")]);
    }

    #[test]
    fn test_endpoint_label_with_dot() {
        let text = "Layout:\n[v1.2][Other]\nRelate:\n[v1.2]->[Other]\n[v1.2]:\nDefine:\nnotes\n";
        let (layout, routed) = run(text);
        assert!(routed.diagnostics.is_empty(), "{:?}", routed.diagnostics);
        assert_eq!(routed.connectors.len(), 1);
        assert_eq!(routed.connectors[0].from, "v1.2");
        assert!(layout.find_dotted("v1.2").unwrap().define_layout.is_some());
    }

    #[test]
    fn test_curl_inset_bends_shoulders() {
        let text = "Layout:\n[A][Wall][B]\nRelate:\n[A]->[B]\n";
        let shoulder = |inset: f64| {
            let (_, routed) = run_with(text, &RoutingConfig::new().with_curl_inset(inset));
            let connector = &routed.connectors[0];
            assert_eq!(connector.kind, Some(PathKind::Curl));
            connector.points[1].x - connector.points[0].x
        };
        assert_eq!(shoulder(0.0), 0.0);
        assert!(shoulder(8.0) > 0.0);
    }

    #[test]
    fn test_route_avoids_unrelated_nodes() {
        let (layout, routed) = run("Layout:\n[A][Wall][B]\nRelate:\n[A]->[B]\n");
        let wall = layout.find_path(&["Wall".to_string()]).unwrap().absolute_area;
        assert_eq!(routed.connectors.len(), 1);
        assert!(!crosses(&routed.connectors[0].points, &[wall]));
    }
}
