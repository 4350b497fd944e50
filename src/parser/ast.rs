//! Source tree types produced by the parser

use std::fmt;

pub use super::lexer::Span;
use super::arrow::ArrowSpec;

/// A diagram scope: a named rectangle that may define text, lay out child
/// scopes, and relate scopes to each other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Source {
    /// Unique among siblings. Empty for the root.
    pub label: String,
    /// Tree-wide secondary name
    pub alias: Option<String>,
    pub define: Option<DefineBlock>,
    pub layout: Option<Vec<LayoutRow>>,
    pub relate: Option<Vec<RelateRecord>>,
    pub children: Vec<Source>,
    /// Header line that introduced this scope, if any
    pub span: Option<Span>,
}

impl Source {
    /// A scope with the given label and nothing else
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn child(&self, label: &str) -> Option<&Source> {
        self.children.iter().find(|c| c.label == label)
    }

    pub fn child_with_alias(&self, alias: &str) -> Option<&Source> {
        self.children
            .iter()
            .find(|c| c.alias.as_deref() == Some(alias))
    }

    /// Depth-first search for a scope carrying `alias`
    pub fn find_alias(&self, alias: &str) -> Option<&Source> {
        if self.alias.as_deref() == Some(alias) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_alias(alias))
    }

    /// Follow a dotted label path downwards from this scope. Labels may
    /// contain dots themselves, see [`follow_dotted`].
    pub fn descend(&self, dotted: &str) -> Option<&Source> {
        if dotted.is_empty() {
            return Some(self);
        }
        follow_dotted(&self.children, dotted, &source_parts)
    }

    /// Resolve an address the way section headers and aliases see the tree:
    /// dotted paths from this scope, aliases anywhere below it.
    pub fn resolve(&self, address: &Address) -> Option<&Source> {
        match address {
            Address::Path(path) => self.descend(path),
            Address::Alias(alias) => self.find_alias(alias),
            Address::AliasPath(alias, path) => self.find_alias(alias)?.descend(path),
        }
    }

    /// Has nested layout rows with at least one entry
    pub fn has_nested_layout(&self) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|rows| rows.iter().any(|r| !r.is_empty()))
    }

    /// Visit this scope and every descendant with its label path
    pub fn walk<'a>(&'a self, path: &mut Vec<String>, visit: &mut impl FnMut(&[String], &'a Source)) {
        visit(path, self);
        for child in &self.children {
            path.push(child.label.clone());
            child.walk(path, visit);
            path.pop();
        }
    }
}

fn source_parts(source: &Source) -> (&str, &[Source]) {
    (source.label.as_str(), source.children.as_slice())
}

/// Text lines of a Define section with horizontal-rule markers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefineBlock {
    pub lines: Vec<String>,
    /// A rule is drawn after `lines[i - 1]` for every `i` in this list
    pub rules: Vec<usize>,
}

impl DefineBlock {
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Record a rule after the last line; consecutive rules collapse into one
    pub fn push_rule(&mut self) {
        let after = self.lines.len();
        if after == 0 || self.rules.last() == Some(&after) {
            return;
        }
        self.rules.push(after);
    }

    pub fn has_rule_after(&self, index: usize) -> bool {
        self.rules.contains(&(index + 1))
    }
}

/// One row of a Layout section
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutRow {
    pub left: Vec<LayoutRef>,
    pub right: Vec<LayoutRef>,
}

impl LayoutRow {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Entries in placement order, flagged when right aligned
    pub fn entries(&self) -> impl Iterator<Item = (&LayoutRef, bool)> {
        self.left
            .iter()
            .map(|r| (r, false))
            .chain(self.right.iter().map(|r| (r, true)))
    }
}

/// A scope mentioned in a layout row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRef {
    /// Displayed label; `None` for a bare `{alias}` entry
    pub label: Option<String>,
    pub alias: Option<String>,
}

impl LayoutRef {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            alias: None,
        }
    }

    pub fn aliased(label: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            alias: Some(alias.into()),
        }
    }

    pub fn alias_only(alias: impl Into<String>) -> Self {
        Self {
            label: None,
            alias: Some(alias.into()),
        }
    }
}

/// How a relation endpoint or a reference section names a scope.
///
/// Paths stay as written: `[v1.2]` may name one scope labelled `v1.2`, so
/// the split into labels happens while matching against the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// `[A.B.C]`
    Path(String),
    /// `{X}`
    Alias(String),
    /// `{X}.[A.B]`
    AliasPath(String, String),
}

impl Address {
    pub fn path(dotted: &str) -> Self {
        Address::Path(dotted.trim().to_string())
    }
}

/// Find the node a dotted path names among `children`, descending through
/// their nested lists. A child matches when its label is the whole
/// remaining path, or when its label followed by `.` starts it. Exact
/// matches win; prefix matches are tried in order until one resolves.
pub fn follow_dotted<'t, T>(
    children: &'t [T],
    dotted: &str,
    parts: &impl Fn(&'t T) -> (&'t str, &'t [T]),
) -> Option<&'t T> {
    if let Some(exact) = children.iter().find(|c| parts(*c).0 == dotted) {
        return Some(exact);
    }
    children.iter().find_map(|child| {
        let (label, nested) = parts(child);
        let rest = dotted.strip_prefix(label)?.strip_prefix('.')?;
        follow_dotted(nested, rest, parts)
    })
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Path(path) => write!(f, "[{}]", path),
            Address::Alias(alias) => write!(f, "{{{}}}", alias),
            Address::AliasPath(alias, path) => write!(f, "{{{}}}.[{}]", alias, path),
        }
    }
}

/// Optional texts drawn along a connector
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeLabels {
    pub start: Option<String>,
    pub middle: Option<String>,
    pub end: Option<String>,
}

impl EdgeLabels {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.middle.is_none() && self.end.is_none()
    }
}

/// One parsed relation line
#[derive(Debug, Clone, PartialEq)]
pub struct RelateRecord {
    pub start: Vec<Address>,
    /// Raw arrow token, e.g. `<-->` or `-1N`
    pub arrow: String,
    pub end: Vec<Address>,
    pub labels: EdgeLabels,
    pub span: Option<Span>,
}

impl RelateRecord {
    pub fn arrow_spec(&self) -> ArrowSpec {
        ArrowSpec::parse(&self.arrow)
    }

    /// Every start term paired with every end term
    pub fn edges(&self) -> impl Iterator<Item = (&Address, &Address)> {
        self.start
            .iter()
            .flat_map(move |s| self.end.iter().map(move |e| (s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_collapse() {
        let mut block = DefineBlock::default();
        block.push_rule();
        block.push_line("a");
        block.push_rule();
        block.push_rule();
        block.push_line("b");
        assert_eq!(block.rules, vec![1]);
        assert!(block.has_rule_after(0));
        assert!(!block.has_rule_after(1));
    }

    #[test]
    fn test_edges_cross_product() {
        let record = RelateRecord {
            start: vec![Address::path("A"), Address::path("B")],
            arrow: "->".to_string(),
            end: vec![Address::path("C"), Address::Alias("d".to_string())],
            labels: EdgeLabels::default(),
            span: None,
        };
        assert_eq!(record.edges().count(), 4);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address::path("A.B").to_string(), "[A.B]");
        assert_eq!(Address::Alias("x".to_string()).to_string(), "{x}");
        assert_eq!(
            Address::AliasPath("x".to_string(), "y".to_string()).to_string(),
            "{x}.[y]"
        );
    }

    #[test]
    fn test_resolve_alias_path() {
        let mut root = Source::new("");
        let mut outer = Source::new("Outer").with_alias("o");
        outer.children.push(Source::new("Inner"));
        root.children.push(outer);
        let found = root.resolve(&Address::AliasPath("o".to_string(), "Inner".to_string()));
        assert_eq!(found.map(|s| s.label.as_str()), Some("Inner"));
        assert!(root.resolve(&Address::path("Outer.Missing")).is_none());
    }

    #[test]
    fn test_descend_labels_with_dots() {
        let mut root = Source::new("");
        let mut release = Source::new("v1.2");
        release.children.push(Source::new("notes.txt"));
        root.children.push(Source::new("v1"));
        root.children.push(release);

        let found = root.descend("v1.2.notes.txt");
        assert_eq!(found.map(|s| s.label.as_str()), Some("notes.txt"));
        assert_eq!(root.descend("v1.2").map(|s| s.label.as_str()), Some("v1.2"));
        assert_eq!(root.descend("v1").map(|s| s.label.as_str()), Some("v1"));
        assert!(root.descend("v1.3").is_none());
    }
}
