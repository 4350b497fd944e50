//! SVG marker definitions for arrowheads and cardinality glyphs

use crate::parser::ArrowHead;

/// Glyph drawing in a 12x12 box, pointing right with its tip at (12, 6)
fn glyph(head: ArrowHead) -> &'static str {
    match head {
        ArrowHead::Arrow => r#"<path d="M0,0 L12,6 L0,12" fill="none"/>"#,
        ArrowHead::Triangle => r#"<path d="M0,0 L12,6 L0,12 Z" style="fill: var(--node-fill)"/>"#,
        ArrowHead::Circle => r#"<circle cx="6" cy="6" r="5" style="fill: var(--node-fill)"/>"#,
        ArrowHead::Cross => r#"<path d="M2,2 L10,10 M2,10 L10,2" fill="none"/>"#,
        ArrowHead::Zero => r#"<circle cx="6" cy="6" r="4" style="fill: var(--node-fill)"/>"#,
        ArrowHead::One => r#"<path d="M8,0 L8,12" fill="none"/>"#,
        ArrowHead::Many => r#"<path d="M0,6 L12,0 M0,6 L12,12 M0,6 L12,6" fill="none"/>"#,
        ArrowHead::ZeroOrOne => {
            r#"<circle cx="3.5" cy="6" r="3" style="fill: var(--node-fill)"/><path d="M10,0 L10,12" fill="none"/>"#
        }
        ArrowHead::OnlyOne => r#"<path d="M6,0 L6,12 M10,0 L10,12" fill="none"/>"#,
        ArrowHead::ZeroOrMany => {
            r#"<circle cx="3" cy="6" r="2.5" style="fill: var(--node-fill)"/><path d="M6,6 L12,0 M6,6 L12,12" fill="none"/>"#
        }
        ArrowHead::OneOrMany => r#"<path d="M3,0 L3,12 M5,6 L12,0 M5,6 L12,12" fill="none"/>"#,
    }
}

/// Marker id for a head, unique per class prefix
pub(super) fn marker_id(prefix: &str, head: ArrowHead) -> String {
    format!("{}{}", prefix, head.name())
}

/// A `<marker>` element. `auto-start-reverse` flips the glyph when it is
/// used at the start of a line, so one definition serves both ends.
pub(super) fn marker_def(prefix: &str, head: ArrowHead, size: f64) -> String {
    format!(
        r#"<marker id="{}" viewBox="0 0 12 12" refX="12" refY="6" markerWidth="{}" markerHeight="{}" markerUnits="userSpaceOnUse" orient="auto-start-reverse" stroke="context-stroke" stroke-width="1.5">{}</marker>"#,
        marker_id(prefix, head),
        size,
        size,
        glyph(head)
    )
}
