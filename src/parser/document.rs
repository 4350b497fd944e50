//! Whole-document parsing: sections, reference scopes and validation

use log::{debug, trace, warn};

use crate::error::Diagnostic;
use crate::parser::ast::{Address, DefineBlock, LayoutRef, Source, Span};
use crate::parser::grammar::{parse_layout, parse_reference, parse_relate};

/// Result of parsing a document: always a tree, plus whatever went wrong
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub source: Source,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// A non-blank line with leading indentation stripped
#[derive(Debug, Clone)]
struct Line<'a> {
    text: &'a str,
    span: Span,
}

#[derive(Debug, Clone, PartialEq)]
enum Header {
    Define,
    Layout,
    Relate,
    Reference(Address),
}

#[derive(Debug, Clone)]
struct Section<'a> {
    header: Header,
    span: Span,
    body: Vec<Line<'a>>,
}

/// Parse diagram text into a `Source` tree. Never fails; problems are
/// reported as diagnostics and the affected lines or scopes are skipped.
pub fn parse(text: &str) -> Parsed {
    let mut diagnostics = Vec::new();
    let sections = segment(&lines(text));

    // Sections before the first reference header describe the root
    let first_reference = sections
        .iter()
        .position(|s| matches!(s.header, Header::Reference(_)))
        .unwrap_or(sections.len());
    let (own, rest) = sections.split_at(first_reference);

    let mut root = Source::new("");
    apply_sections(&mut root, own, &mut diagnostics);

    // Each reference header absorbs the plain sections that follow it
    let mut index = 0;
    while index < rest.len() {
        let reference = &rest[index];
        let end = rest[index + 1..]
            .iter()
            .position(|s| matches!(s.header, Header::Reference(_)))
            .map(|p| index + 1 + p)
            .unwrap_or(rest.len());

        if let Header::Reference(address) = &reference.header {
            if !reference.body.is_empty() {
                debug!(address:% = address, lines = reference.body.len(); "Ignoring lines outside any section");
            }
            let mut scope = Source {
                span: Some(reference.span.clone()),
                ..Source::default()
            };
            apply_sections(&mut scope, &rest[index + 1..end], &mut diagnostics);
            add_sections(&mut root, address, scope, &mut diagnostics);
        }
        index = end;
    }

    diagnostics.extend(validate(&root));
    for diagnostic in &diagnostics {
        warn!(severity:? = diagnostic.severity(); "{}", diagnostic);
    }
    trace!(tree:? = root; "Parsed source tree");

    Parsed {
        source: root,
        diagnostics,
    }
}

fn lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    let mut out = Vec::new();
    for raw in text.split('\n') {
        let content = raw.trim_start();
        let start = offset + (raw.len() - content.len());
        let content = content.trim_end();
        if !content.is_empty() {
            out.push(Line {
                text: content,
                span: start..start + content.len(),
            });
        }
        offset += raw.len() + 1;
    }
    out
}

fn classify(line: &str) -> Option<Header> {
    let name = line.strip_suffix(':')?.trim();
    match name.to_ascii_lowercase().as_str() {
        "define" => Some(Header::Define),
        "layout" => Some(Header::Layout),
        "relate" => Some(Header::Relate),
        _ => parse_reference(line).map(Header::Reference),
    }
}

fn segment<'a>(lines: &[Line<'a>]) -> Vec<Section<'a>> {
    let mut sections: Vec<Section<'a>> = Vec::new();
    for line in lines {
        match classify(line.text) {
            Some(header) => sections.push(Section {
                header,
                span: line.span.clone(),
                body: Vec::new(),
            }),
            None => match sections.last_mut() {
                Some(section) => section.body.push(line.clone()),
                None => debug!(line = line.text; "Ignoring line before the first section"),
            },
        }
    }
    sections
}

/// Fill a scope from its Define, Layout and Relate sections
fn apply_sections(scope: &mut Source, sections: &[Section<'_>], diagnostics: &mut Vec<Diagnostic>) {
    for section in sections {
        match section.header {
            Header::Define => {
                let block = scope.define.get_or_insert_with(DefineBlock::default);
                for line in &section.body {
                    if line.text == "|" {
                        block.push_rule();
                    } else {
                        block.push_line(line.text);
                    }
                }
            }
            Header::Layout => {
                let rows = scope.layout.get_or_insert_with(Vec::new);
                for line in &section.body {
                    let row = parse_layout(line.text);
                    if row.is_empty() {
                        diagnostics.push(Diagnostic::MalformedLine {
                            section: "Layout".to_string(),
                            line: line.text.to_string(),
                            reason: "no scope entries".to_string(),
                            span: Some(line.span.clone()),
                        });
                        continue;
                    }
                    rows.push(row);
                }
            }
            Header::Relate => {
                let records = scope.relate.get_or_insert_with(Vec::new);
                for line in &section.body {
                    match parse_relate(line.text) {
                        Ok(mut record) => {
                            record.span = Some(line.span.clone());
                            records.push(record);
                        }
                        Err(reason) => diagnostics.push(Diagnostic::MalformedLine {
                            section: "Relate".to_string(),
                            line: line.text.to_string(),
                            reason,
                            span: Some(line.span.clone()),
                        }),
                    }
                }
            }
            Header::Reference(_) => {}
        }
    }
}

/// Attach a parsed scope to the tree at the place its header addresses
fn add_sections(target: &mut Source, address: &Address, scope: Source, diagnostics: &mut Vec<Diagnostic>) {
    match address {
        Address::Path(path) => {
            debug!(path = path.as_str(); "Adding sections by path");
            merge(descend_or_create(target, path), scope);
        }
        Address::Alias(alias) => match resolve_alias(target, alias) {
            Some(found) => merge(found, scope),
            None => diagnostics.push(Diagnostic::UnresolvedAlias {
                alias: alias.clone(),
                span: scope.span.clone(),
            }),
        },
        Address::AliasPath(alias, path) => match resolve_alias(target, alias) {
            Some(found) => add_sections(found, &Address::Path(path.clone()), scope, diagnostics),
            None => diagnostics.push(Diagnostic::UnresolvedAlias {
                alias: alias.clone(),
                span: scope.span.clone(),
            }),
        },
    }
}

/// Walk a dotted path from `source`, matching existing children by exact
/// label or by label prefix, and create whatever is missing
fn descend_or_create<'s>(source: &'s mut Source, dotted: &str) -> &'s mut Source {
    if dotted.is_empty() {
        return source;
    }
    let existing = source.children.iter().map(|c| c.label.as_str());
    let (label, rest) = match next_step(existing, dotted) {
        Some(step) => step,
        None => {
            let declared = source
                .layout
                .iter()
                .flatten()
                .flat_map(|row| row.entries())
                .filter_map(|(r, _)| r.label.as_deref());
            next_step(declared, dotted).unwrap_or_else(|| dotted.split_once('.').unwrap_or((dotted, "")))
        }
    };
    descend_or_create(child_or_create(source, label), rest)
}

/// The label among `labels` that `dotted` starts with, and what follows it.
/// A label equal to the whole path wins, then the longest prefix.
fn next_step<'l, 'd>(labels: impl Iterator<Item = &'l str>, dotted: &'d str) -> Option<(&'d str, &'d str)> {
    let mut best: Option<(&'d str, &'d str)> = None;
    for label in labels {
        if label == dotted {
            return Some((dotted, ""));
        }
        if let Some(rest) = dotted.strip_prefix(label).and_then(|r| r.strip_prefix('.')) {
            if best.map_or(true, |(b, _)| label.len() > b.len()) {
                best = Some((&dotted[..label.len()], rest));
            }
        }
    }
    best
}

fn child_or_create<'s>(source: &'s mut Source, label: &str) -> &'s mut Source {
    let index = match source.children.iter().position(|c| c.label == label) {
        Some(index) => index,
        None => {
            source.children.push(Source::new(label));
            source.children.len() - 1
        }
    };
    &mut source.children[index]
}

/// Find the scope carrying `alias`, creating it from a layout entry that
/// declares the alias if no such scope exists yet
fn resolve_alias<'s>(root: &'s mut Source, alias: &str) -> Option<&'s mut Source> {
    if let Some(indices) = locate(root, &|s| s.alias.as_deref() == Some(alias)) {
        return Some(at_mut(root, &indices));
    }

    let indices = locate(root, &|s| declared_label(s, alias).is_some())?;
    let owner = at_mut(root, &indices);
    let label = declared_label(owner, alias)?;
    debug!(alias, label = label.as_str(); "Creating scope for aliased layout entry");

    let child = child_or_create(owner, &label);
    child.alias = Some(alias.to_string());
    Some(child)
}

/// Label of the layout entry in `scope` that declares `alias`
fn declared_label(scope: &Source, alias: &str) -> Option<String> {
    scope
        .layout
        .iter()
        .flatten()
        .flat_map(|row| row.entries())
        .map(|(r, _)| r)
        .find_map(|r: &LayoutRef| match (&r.label, &r.alias) {
            (Some(label), Some(a)) if a == alias => Some(label.clone()),
            _ => None,
        })
}

/// Child index path of the first scope (pre-order) satisfying `pred`
fn locate(source: &Source, pred: &dyn Fn(&Source) -> bool) -> Option<Vec<usize>> {
    if pred(source) {
        return Some(Vec::new());
    }
    source.children.iter().enumerate().find_map(|(i, child)| {
        locate(child, pred).map(|mut rest| {
            rest.insert(0, i);
            rest
        })
    })
}

fn at_mut<'s>(source: &'s mut Source, indices: &[usize]) -> &'s mut Source {
    match indices.split_first() {
        Some((&i, rest)) => at_mut(&mut source.children[i], rest),
        None => source,
    }
}

fn merge(into: &mut Source, from: Source) {
    if into.span.is_none() {
        into.span = from.span;
    }
    if let Some(define) = from.define {
        let block = into.define.get_or_insert_with(DefineBlock::default);
        for (i, line) in define.lines.into_iter().enumerate() {
            block.push_line(line);
            if define.rules.contains(&(i + 1)) {
                block.push_rule();
            }
        }
    }
    if let Some(rows) = from.layout {
        into.layout.get_or_insert_with(Vec::new).extend(rows);
    }
    if let Some(records) = from.relate {
        into.relate.get_or_insert_with(Vec::new).extend(records);
    }
    for child in from.children {
        let label = child.label.clone();
        merge(child_or_create(into, &label), child);
    }
}

/// Report every scope that has neither a Define nor a Layout section.
/// Errors from nested scopes carry the labels of their ancestors.
pub fn validate(source: &Source) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if source.define.is_none() && source.layout.is_none() {
        let scope = if source.label.is_empty() {
            "<root>".to_string()
        } else {
            source.label.clone()
        };
        diagnostics.push(Diagnostic::MissingSection {
            scope,
            span: source.span.clone(),
        });
    }
    for child in &source.children {
        diagnostics.extend(
            validate(child)
                .into_iter()
                .map(|d| d.within(&source.label)),
        );
    }
    diagnostics
}
