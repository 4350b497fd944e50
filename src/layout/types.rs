//! Core types for the layout engine

use crate::geometry::Area;
use crate::parser::ast::follow_dotted;

use super::text::TextBlock;

/// Vertical offsets of a node's stacked sections, from its top edge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeBands {
    pub label_y: f64,
    pub define_y: f64,
    pub content_y: f64,
}

/// A positioned scope
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub alias: Option<String>,
    /// Labels from the root down to and including this node
    pub path: Vec<String>,
    /// Position within the parent's content area
    pub relative_area: Area,
    /// Canvas coordinates
    pub absolute_area: Area,
    pub label_layout: TextBlock,
    /// True when the label is a one-line header above define text or children
    pub is_header: bool,
    pub define_layout: Option<TextBlock>,
    pub children: Vec<Node>,
    pub is_right_align: bool,
    /// Index of the layout row this node sits in
    pub row: usize,
    pub bands: NodeBands,
}

impl Node {
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// Depth-first iterator over this node and its descendants
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// Find a descendant by a dotted path relative to this node
    pub fn find_dotted(&self, dotted: &str) -> Option<&Node> {
        follow_dotted(&self.children, dotted, &node_parts)
    }

    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        other.path.len() > self.path.len() && other.path.starts_with(&self.path)
    }
}

fn node_parts(node: &Node) -> (&str, &[Node]) {
    (node.label.as_str(), node.children.as_slice())
}

/// Depth-first, pre-order traversal of a node forest
pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// The complete layout result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    /// Top-level nodes of the root diagram
    pub nodes: Vec<Node>,
    pub width: f64,
    pub height: f64,
}

impl LayoutResult {
    /// Every node, depth-first in declaration order
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter {
            stack: self.nodes.iter().rev().collect(),
        }
    }

    /// Find a node by its full label path
    pub fn find_path(&self, path: &[String]) -> Option<&Node> {
        let (head, rest) = path.split_first()?;
        let mut node = self.nodes.iter().find(|n| &n.label == head)?;
        for label in rest {
            node = node.children.iter().find(|n| &n.label == label)?;
        }
        Some(node)
    }

    /// Find a node by a dotted path from the root, where labels may contain
    /// dots of their own
    pub fn find_dotted(&self, dotted: &str) -> Option<&Node> {
        follow_dotted(&self.nodes, dotted, &node_parts)
    }

    /// Find a node by alias anywhere in the tree
    pub fn find_alias(&self, alias: &str) -> Option<&Node> {
        self.iter().find(|n| n.alias.as_deref() == Some(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &[&str], children: Vec<Node>) -> Node {
        Node {
            label: path.last().map(|s| s.to_string()).unwrap_or_default(),
            alias: None,
            path: path.iter().map(|s| s.to_string()).collect(),
            relative_area: Area::default(),
            absolute_area: Area::default(),
            label_layout: TextBlock::default(),
            is_header: false,
            define_layout: None,
            children,
            is_right_align: false,
            row: 0,
            bands: NodeBands::default(),
        }
    }

    #[test]
    fn test_iter_is_preorder() {
        let result = LayoutResult {
            nodes: vec![
                node(&["A"], vec![node(&["A", "B"], vec![]), node(&["A", "C"], vec![])]),
                node(&["D"], vec![]),
            ],
            width: 0.0,
            height: 0.0,
        };
        let order: Vec<String> = result.iter().map(|n| n.dotted_path()).collect();
        assert_eq!(order, vec!["A", "A.B", "A.C", "D"]);
    }

    #[test]
    fn test_find_path_and_ancestry() {
        let result = LayoutResult {
            nodes: vec![node(&["A"], vec![node(&["A", "B"], vec![])])],
            width: 0.0,
            height: 0.0,
        };
        let a = result.find_path(&["A".to_string()]).unwrap();
        let b = result.find_path(&["A".to_string(), "B".to_string()]).unwrap();
        assert!(a.is_ancestor_of(b));
        assert!(!b.is_ancestor_of(a));
        assert!(result.find_path(&["B".to_string()]).is_none());
        assert_eq!(result.find_dotted("A.B"), Some(b));
        assert_eq!(a.find_dotted("B"), Some(b));
    }

    #[test]
    fn test_find_dotted_label_with_dots() {
        let result = LayoutResult {
            nodes: vec![
                node(&["v1"], vec![]),
                node(&["v1.2"], vec![node(&["v1.2", "api"], vec![])]),
            ],
            width: 0.0,
            height: 0.0,
        };
        assert_eq!(result.find_dotted("v1").map(Node::dotted_path), Some("v1".to_string()));
        let api = result.find_dotted("v1.2.api").map(|n| n.path.clone());
        assert_eq!(api, Some(vec!["v1.2".to_string(), "api".to_string()]));
        assert!(result.find_dotted("v1.3").is_none());
    }
}
