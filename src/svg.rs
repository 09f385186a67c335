//! Shared SVG plumbing: parsing rendered output, reading numeric
//! attributes, emitting marker elements and splicing text back into the
//! source document.

use std::ops::Range;

use roxmltree::{Document, Node};

use crate::error::Result;
use crate::model::NoteMarker;

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Parse rendered output (a bare SVG or an XHTML page fragment).
pub fn parse_document(source: &str) -> Result<Document<'_>> {
    // Renderers and page templates may carry a DOCTYPE.
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    Ok(Document::parse_with_options(source, options)?)
}

/// Read the first number of an SVG length-list attribute.
///
/// `x="10 20"` and `x="10,20"` both anchor at 10; a trailing `px` unit is
/// accepted.
pub(crate) fn first_length(node: &Node, name: &str) -> Option<f64> {
    let raw = node.attribute(name)?;
    let first = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .find(|s| !s.is_empty())?;
    first.trim_end_matches("px").parse::<f64>().ok()
}

/// Concatenated text content of an element, untrimmed.
pub(crate) fn text_content(node: &Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Whether an SVG element sits where the default namespace is not SVG, so
/// an unprefixed sibling would land outside the SVG namespace.
pub(crate) fn in_foreign_default_namespace(node: &Node) -> bool {
    node.tag_name().namespace() == Some(SVG_NS)
        && node
            .parent_element()
            .and_then(|p| p.lookup_namespace_uri(None))
            != Some(SVG_NS)
}

/// Qualified tag name of the element starting at `source[range.start]`,
/// e.g. `style` or `h:style`.
pub(crate) fn qualified_name(source: &str, range: &Range<usize>) -> String {
    source[range.clone()]
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Whether `node` is an element with the given local name, in the SVG
/// namespace or in no namespace at all.
pub(crate) fn is_svg_element(node: &Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && matches!(node.tag_name().namespace(), None | Some(SVG_NS))
}

/// Serialize a marker as an SVG `<circle>`.
///
/// Coordinates are written unrounded: they derive from the renderer's own
/// anchors and must stay equal to them.
pub(crate) fn circle_element(marker: &NoteMarker) -> String {
    let xmlns = if marker.glyph.foreign_default_namespace {
        format!(r#" xmlns="{SVG_NS}""#)
    } else {
        String::new()
    };
    format!(
        r#"<circle{} cx="{}" cy="{}" r="{}" class="{}"/>"#,
        xmlns,
        marker.center_x,
        marker.center_y,
        marker.radius,
        marker.class_attr()
    )
}

pub(crate) fn escape_text(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// An edit to apply to the source text: replace `range` with `text`.
/// An empty range is a pure insertion.
#[derive(Debug, Clone)]
pub(crate) struct Splice {
    pub(crate) range: Range<usize>,
    pub(crate) text: String,
}

/// Apply non-overlapping splices to `source`, returning the edited text.
///
/// Splices may be given in any order; insertions at the same offset keep
/// their relative order.
pub(crate) fn apply_splices(source: &str, mut splices: Vec<Splice>) -> String {
    splices.sort_by_key(|s| (s.range.start, s.range.end));

    let extra: usize = splices.iter().map(|s| s.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;
    for splice in &splices {
        if splice.range.start < cursor {
            // Overlapping edit; the earlier one wins.
            log::debug!("dropping overlapping splice at {:?}", splice.range);
            continue;
        }
        out.push_str(&source[cursor..splice.range.start]);
        out.push_str(&splice.text);
        cursor = splice.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_length_reads_length_lists() {
        let doc = Document::parse(r#"<text x="10 20" y="5,6" z="7px" w="abc"/>"#).unwrap();
        let node = doc.root_element();
        assert_eq!(first_length(&node, "x"), Some(10.0));
        assert_eq!(first_length(&node, "y"), Some(5.0));
        assert_eq!(first_length(&node, "z"), Some(7.0));
        assert_eq!(first_length(&node, "w"), None);
        assert_eq!(first_length(&node, "missing"), None);
    }

    #[test]
    fn text_content_keeps_surrounding_whitespace() {
        let doc = Document::parse("<text> 1<tspan>2</tspan> </text>").unwrap();
        assert_eq!(text_content(&doc.root_element()), " 12 ");
    }

    #[test]
    fn qualified_name_reads_prefix() {
        let source = r#"<h:style data-class=".note-1"/>"#;
        assert_eq!(qualified_name(source, &(0..source.len())), "h:style");
        let source = "<style>";
        assert_eq!(qualified_name(source, &(0..source.len())), "style");
    }

    #[test]
    fn splices_apply_in_offset_order() {
        let source = "abcdef";
        let out = apply_splices(
            source,
            vec![
                Splice { range: 4..4, text: "Y".into() },
                Splice { range: 1..3, text: "X".into() },
                Splice { range: 6..6, text: "Z".into() },
            ],
        );
        assert_eq!(out, "aXdYefZ");
    }
}
