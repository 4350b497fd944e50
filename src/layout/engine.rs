//! Layout engine: sizes nodes bottom-up, places them in rows, then resolves
//! canvas coordinates top-down

use log::{debug, info};

use crate::geometry::{Area, Point, Size, EPSILON};
use crate::parser::ast::{LayoutRef, Source};

use super::config::LayoutConfig;
use super::text::{measure_lines, single_line, wrap_golden, TextBlock, TextMeasurer};
use super::types::{LayoutResult, Node, NodeBands};

/// Lay out the diagram described by `source`
pub fn layout(source: &Source, measurer: &dyn TextMeasurer, config: &LayoutConfig) -> LayoutResult {
    let mut ctx = Context {
        root: source,
        measurer,
        config,
        ancestors: vec![source],
    };

    if source.define.is_some() {
        debug!("Define text on the root scope has no rectangle to live in, ignoring it");
    }

    let (mut nodes, size) = ctx.layout_diagram(source, &[]);
    let origin = Point::new(config.canvas_margin, config.canvas_margin);
    place(&mut nodes, origin, config);

    let result = LayoutResult {
        nodes,
        width: size.width + 2.0 * config.canvas_margin,
        height: size.height + 2.0 * config.canvas_margin,
    };
    info!(nodes = result.iter().count(), width = result.width, height = result.height; "Layout complete");
    result
}

struct Context<'a> {
    root: &'a Source,
    measurer: &'a dyn TextMeasurer,
    config: &'a LayoutConfig,
    /// Scopes currently being laid out, to stop alias cycles
    ancestors: Vec<&'a Source>,
}

impl<'a> Context<'a> {
    /// Lay out the rows of `scope`, returning its nodes in relative
    /// coordinates and the bounding size of the whole diagram
    fn layout_diagram(&mut self, scope: &'a Source, parent_path: &[String]) -> (Vec<Node>, Size) {
        let mut nodes = Vec::new();
        let mut y = 0.0;

        for (row, entries) in scope.layout.iter().flatten().enumerate() {
            let mut x = 0.0;
            let mut row_height: f64 = 0.0;
            for (entry, is_right_align) in entries.entries() {
                let Some((label, alias, found)) = self.resolve(scope, entry) else {
                    debug!(entry:? = entry; "Skipping unresolved layout entry");
                    continue;
                };

                let mut path = parent_path.to_vec();
                path.push(label.clone());
                let mut node = self.build_node(label, alias, path, found);
                node.row = row;
                node.is_right_align = is_right_align;
                node.relative_area.x = x;
                node.relative_area.y = y;

                x += node.relative_area.width + self.config.node_margin;
                row_height = row_height.max(node.relative_area.height);
                nodes.push(node);
            }
            if row_height > 0.0 {
                y += row_height + self.config.node_margin;
            }
        }

        if self.config.uniform_sizing {
            uniform_widths(&mut nodes, self.config);
            uniform_heights(&mut nodes, self.config);
        }
        align_right(&mut nodes, self.config);

        let size = bounding_size(&nodes);
        (nodes, size)
    }

    /// Find the scope a layout entry names: `(label, alias, source)`.
    /// Label entries without a matching scope become plain boxes.
    fn resolve(
        &self,
        scope: &'a Source,
        entry: &LayoutRef,
    ) -> Option<(String, Option<String>, Option<&'a Source>)> {
        let (label, alias, found) = match (&entry.label, &entry.alias) {
            (Some(label), alias) => {
                let found = alias
                    .as_deref()
                    .and_then(|a| scope.child_with_alias(a).or_else(|| self.root.find_alias(a)))
                    .or_else(|| scope.child(label));
                let alias = alias.clone().or_else(|| found.and_then(|s| s.alias.clone()));
                (label.clone(), alias, found)
            }
            (None, Some(alias)) => {
                let found = self.root.find_alias(alias)?;
                (found.label.clone(), Some(alias.clone()), Some(found))
            }
            (None, None) => return None,
        };

        if found.is_some_and(|s| self.ancestors.iter().any(|a| std::ptr::eq(*a, s))) {
            debug!(label = label.as_str(); "Layout entry refers to an enclosing scope, skipping it");
            return None;
        }
        Some((label, alias, found))
    }

    fn build_node(
        &mut self,
        label: String,
        alias: Option<String>,
        path: Vec<String>,
        source: Option<&'a Source>,
    ) -> Node {
        let config = self.config;

        let (children, content) = match source {
            Some(s) if s.has_nested_layout() => {
                self.ancestors.push(s);
                let laid_out = self.layout_diagram(s, &path);
                self.ancestors.pop();
                laid_out
            }
            _ => (Vec::new(), Size::default()),
        };

        let define_layout = source
            .and_then(|s| s.define.as_ref())
            .filter(|d| !d.lines.is_empty())
            .map(|d| {
                let mut block = measure_lines(d.lines.clone(), self.measurer, config);
                block.rules = d.rules.clone();
                block
            });

        let is_header = source.is_some_and(Source::has_nested_layout) || define_layout.is_some();
        let label_layout = if is_header {
            single_line(&label, self.measurer, config)
        } else {
            wrap_golden(&label, self.measurer, config)
        };

        let (size, bands) = stack_sections(&label_layout, define_layout.as_ref(), !children.is_empty(), content, config);
        debug!(path:? = path, width = size.width, height = size.height; "Sized node");

        Node {
            label,
            alias,
            path,
            relative_area: Area::new(0.0, 0.0, size.width, size.height),
            absolute_area: Area::default(),
            label_layout,
            is_header,
            define_layout,
            children,
            is_right_align: false,
            row: 0,
            bands,
        }
    }
}

/// Stack label, define block and nested diagram vertically inside padding
fn stack_sections(
    label: &TextBlock,
    define: Option<&TextBlock>,
    has_content: bool,
    content: Size,
    config: &LayoutConfig,
) -> (Size, NodeBands) {
    let padding = config.node_padding;
    let spacing = config.section_spacing;

    let mut width = label.width;
    let mut cursor = padding;
    let label_y = cursor;
    cursor += label.height;

    let define_y = match define {
        Some(block) => {
            cursor += spacing;
            let y = cursor;
            cursor += block.height;
            width = width.max(block.width);
            y
        }
        None => cursor,
    };

    let content_y = if has_content {
        cursor += spacing;
        let y = cursor;
        cursor += content.height;
        width = width.max(content.width);
        y
    } else {
        cursor
    };

    (
        Size::new(width + 2.0 * padding, cursor + padding),
        NodeBands {
            label_y,
            define_y,
            content_y,
        },
    )
}

fn bounding_size(nodes: &[Node]) -> Size {
    nodes.iter().fold(Size::default(), |size, n| {
        Size::new(
            size.width.max(n.relative_area.right()),
            size.height.max(n.relative_area.bottom()),
        )
    })
}

/// Indices of `nodes` ordered by `key` descending; ties keep declaration order
fn descending_by(nodes: &[Node], key: impl Fn(&Node) -> f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| key(&nodes[b]).total_cmp(&key(&nodes[a])));
    order
}

/// Widen nodes that are within the variance of a wider reference node.
/// Later nodes in the same row move right by the added width.
fn uniform_widths(nodes: &mut [Node], config: &LayoutConfig) {
    let mut reference: Option<f64> = None;
    for i in descending_by(nodes, |n| n.relative_area.width) {
        let width = nodes[i].relative_area.width;
        match reference {
            Some(max) if width >= max * (1.0 - config.size_variance) => {
                let delta = max - width;
                if delta <= EPSILON {
                    continue;
                }
                let (row, x) = (nodes[i].row, nodes[i].relative_area.x);
                nodes[i].relative_area.width = max;
                for other in nodes.iter_mut() {
                    if other.row == row && other.relative_area.x > x + EPSILON {
                        other.relative_area.x += delta;
                    }
                }
            }
            _ => reference = Some(width),
        }
    }
}

/// Same clustering for heights. Rows below move down when a row grows.
fn uniform_heights(nodes: &mut [Node], config: &LayoutConfig) {
    let row_height = |nodes: &[Node], row: usize| {
        nodes
            .iter()
            .filter(|n| n.row == row)
            .map(|n| n.relative_area.height)
            .fold(0.0, f64::max)
    };

    let mut reference: Option<f64> = None;
    for i in descending_by(nodes, |n| n.relative_area.height) {
        let height = nodes[i].relative_area.height;
        match reference {
            Some(max) if height >= max * (1.0 - config.size_variance) => {
                if max - height <= EPSILON {
                    continue;
                }
                let row = nodes[i].row;
                let before = row_height(nodes, row);
                nodes[i].relative_area.height = max;
                let grown = row_height(nodes, row) - before;
                if grown > EPSILON {
                    for other in nodes.iter_mut().filter(|n| n.row > row) {
                        other.relative_area.y += grown;
                    }
                }
            }
            _ => reference = Some(height),
        }
    }
}

/// Move right-aligned entries of each row against the diagram's right edge
fn align_right(nodes: &mut [Node], config: &LayoutConfig) {
    let max_right = bounding_size(nodes).width;
    let rows = nodes.iter().map(|n| n.row).max().map_or(0, |r| r + 1);
    for row in 0..rows {
        let mut cursor = max_right;
        for node in nodes
            .iter_mut()
            .rev()
            .filter(|n| n.row == row && n.is_right_align)
        {
            node.relative_area.x = cursor - node.relative_area.width;
            cursor = node.relative_area.x - config.node_margin;
        }
    }
}

/// Resolve canvas coordinates from relative areas, parents first
fn place(nodes: &mut [Node], origin: Point, config: &LayoutConfig) {
    for node in nodes {
        node.absolute_area = node.relative_area.translate(origin.x, origin.y);
        let inner = Point::new(
            node.absolute_area.x + config.node_padding,
            node.absolute_area.y + node.bands.content_y,
        );
        place(&mut node.children, inner, config);
    }
}
