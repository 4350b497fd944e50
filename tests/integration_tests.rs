//! End-to-end tests for the boxwire pipeline

use boxwire::geometry::{Area, Line};
use boxwire::parser::{Address, ArrowHead, LineStyle};
use boxwire::{build, parse, render, render_with_config, Diagnostic, Diagram, RenderConfig, Stylesheet};

fn diagram(text: &str) -> Diagram {
    build(text, &RenderConfig::default())
}

fn area(diagram: &Diagram, dotted: &str) -> Area {
    diagram
        .layout
        .find_dotted(dotted)
        .unwrap_or_else(|| panic!("no node at {}", dotted))
        .absolute_area
}

fn passes_through(points: &[boxwire::geometry::Point], obstacle: &Area) -> bool {
    Line::segments(points).any(|segment| obstacle.passes_through(&segment))
}

#[test]
fn test_two_nodes_one_arrow() {
    let d = diagram("Layout:\n[A][B]\nRelate:\n[A]->[B]");
    assert!(d.diagnostics.is_empty());
    assert_eq!(d.layout.iter().count(), 2);
    assert_eq!(d.connectors.len(), 1);

    let connector = &d.connectors[0];
    assert_eq!(connector.start_head, None);
    assert_eq!(connector.end_head, Some(ArrowHead::Arrow));
    assert_eq!(connector.style, LineStyle::Solid);

    let (a, b) = (area(&d, "A"), area(&d, "B"));
    let first = connector.points[0];
    let last = connector.points[connector.points.len() - 1];
    assert_eq!(first.x, a.right());
    assert_eq!(last.x, b.x);
    assert!(last.x > first.x, "arrow should point right, towards B");
}

#[test]
fn test_left_arrow_puts_head_at_start() {
    let d = diagram("Layout:\n[A][B]\nRelate:\n[A]<-[B]\n");
    let connector = &d.connectors[0];
    assert_eq!(connector.start_head, Some(ArrowHead::Arrow));
    assert_eq!(connector.end_head, None);
}

#[test]
fn test_route_to_nested_descendant_avoids_sibling() {
    let text = "\
Layout:
[Client][Gateway][Backend]
Relate:
[Client]->[Backend.Api]
[Backend]:
Layout:
[Api]
[Db]
";
    let d = diagram(text);
    assert!(
        !d.diagnostics
            .iter()
            .any(|diag| matches!(diag, Diagnostic::UnroutableConnector { .. })),
        "{:?}",
        d.diagnostics
    );
    assert_eq!(d.connectors.len(), 1);

    let connector = &d.connectors[0];
    assert_eq!(connector.from, "Client");
    assert_eq!(connector.to, "Backend.Api");

    let gateway = area(&d, "Gateway");
    let direct = Line::new(area(&d, "Client").center(), area(&d, "Backend.Api").center());
    assert!(gateway.passes_through(&direct), "the sibling should be in the way");
    assert!(!passes_through(&connector.points, &gateway));
    assert!(!passes_through(&connector.points, &area(&d, "Backend.Db")));
}

#[test]
fn test_coincident_connectors_are_separated() {
    let text = "Layout:\n[A][B]\nRelate:\n[A]->[B]\n[A]-->[B]\n[A]=>[B]\n";
    let d = diagram(text);
    assert_eq!(d.connectors.len(), 3);

    let (a, b) = (area(&d, "A"), area(&d, "B"));
    let shared = a.y_range().intersect(&b.y_range()).unwrap();
    let ys: Vec<f64> = d.connectors.iter().map(|c| c.points[0].y).collect();
    for (i, y) in ys.iter().enumerate() {
        assert!(shared.contains(*y));
        for other in &ys[i + 1..] {
            assert_ne!(y, other);
        }
    }
    assert!(d.connectors[2].bold);
}

#[test]
fn test_validation_error_iff_scope_lacks_sections() {
    let valid = parse("Layout:\n[A]\n[A]:\nDefine:\nsome text\n");
    assert!(!valid.has_errors());

    let invalid = parse("Layout:\n[A]\n[A]:\nRelate:\n");
    assert!(invalid.has_errors());
    assert!(matches!(
        &invalid.diagnostics[..],
        [Diagnostic::MissingSection { scope, .. }] if scope == "A"
    ));
}

#[test]
fn test_alias_is_path_independent() {
    let text = "\
Layout:
{S}[Store][Other]
Relate:
{S}.[Shelf]->[Other]
[Other]:
Relate:
[Other]->{S}
{S}:
Layout:
[Shelf]
";
    let parsed = parse(text);
    let store = parsed.source.find_alias("S").unwrap();
    assert_eq!(store.label, "Store");
    let other = parsed.source.child("Other").unwrap();
    assert_eq!(other.relate.as_ref().map(Vec::len), Some(1));
    assert!(parsed
        .source
        .resolve(&Address::AliasPath("S".to_string(), "Shelf".to_string()))
        .is_some());

    let d = diagram(text);
    let ends: Vec<(&str, &str)> = d
        .connectors
        .iter()
        .map(|c| (c.from.as_str(), c.to.as_str()))
        .collect();
    assert_eq!(ends, vec![("Store.Shelf", "Other"), ("Other", "Store")]);
}

#[test]
fn test_scope_label_containing_dot() {
    let text = "Layout:\n[v1.2][Other]\nRelate:\n[v1.2]->[Other]\n[v1.2]:\nDefine:\nnotes\n";
    let d = diagram(text);
    assert!(d.diagnostics.is_empty(), "{:?}", d.diagnostics);

    let labels: Vec<&str> = d.source.children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["v1.2"]);
    let release = d.layout.find_dotted("v1.2").unwrap();
    assert!(release.define_layout.is_some());

    assert_eq!(d.connectors.len(), 1);
    assert_eq!(d.connectors[0].from, "v1.2");
    assert_eq!(d.connectors[0].to, "Other");
}

#[test]
fn test_malformed_line_reported_with_context() {
    let text = "Layout:\n[A][B]\nRelate:\nthis is not a relation\n";
    let rendered = render(text);
    assert!(rendered.has_errors());
    let diagnostic = &rendered.diagnostics[0];
    assert!(matches!(diagnostic, Diagnostic::MalformedLine { .. }));
    let report = diagnostic.format(text, "input.bw");
    assert!(report.contains("input.bw"));
    assert!(report.contains("this is not a relation"));
    // The rest of the diagram is still drawn
    assert!(rendered.svg.contains(">A</text>"));
}

#[test]
fn test_stylesheet_reaches_svg() {
    let stylesheet = Stylesheet::from_str("[colors]\nnode-fill = \"#000000\"\n[font]\nfamily = \"serif\"\n")
        .expect("valid stylesheet");
    let rendered = render_with_config(
        "Layout:\n[A]\n",
        RenderConfig::new().with_stylesheet(stylesheet),
    );
    assert!(rendered.svg.contains("--node-fill: #000000;"));
    assert!(rendered.svg.contains("font-family: serif;"));
}

#[test]
fn test_viewbox_contains_detours() {
    let text = "Layout:\n[A][Wall][B]\nRelate:\n[A]->[B]\n";
    let d = diagram(text);
    let points = &d.connectors[0].points;
    assert!(points.len() > 2, "the wall forces a detour");

    let svg = render(text).svg;
    let viewbox: Vec<f64> = svg
        .split("viewBox=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .split(' ')
        .map(|v| v.parse().unwrap())
        .collect();
    let bounds = Area::new(viewbox[0], viewbox[1], viewbox[2], viewbox[3]);
    for point in points {
        assert!(bounds.contains(*point), "{:?} outside {:?}", point, bounds);
    }
}
