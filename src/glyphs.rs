//! Fret glyph locator.
//!
//! The tablature renderer marks fret numbers by centering them vertically on
//! their anchor (`dominant-baseline="middle"`). Titles, tuning labels and
//! other decorative text use the default baseline and are ignored.

use roxmltree::Document;

use crate::error::Result;
use crate::model::FretGlyph;
use crate::svg::{
    first_length, in_foreign_default_namespace, is_svg_element, parse_document, text_content,
};

const FRET_BASELINE: &str = "middle";

/// Find every fret glyph in `doc`, in document order.
pub fn locate_glyphs(doc: &Document) -> Vec<FretGlyph> {
    let mut glyphs = Vec::new();

    for node in doc.descendants() {
        if !is_svg_element(&node, "text") {
            continue;
        }
        if node.attribute("dominant-baseline") != Some(FRET_BASELINE) {
            continue;
        }

        let (Some(anchor_x), Some(anchor_y)) = (first_length(&node, "x"), first_length(&node, "y"))
        else {
            log::debug!("skipping fret glyph without a numeric anchor at byte {}", node.range().start);
            continue;
        };

        glyphs.push(FretGlyph {
            anchor_x,
            anchor_y,
            label_text: text_content(&node),
            source_range: node.range(),
            foreign_default_namespace: in_foreign_default_namespace(&node),
        });
    }

    log::trace!("located {} fret glyphs", glyphs.len());
    glyphs
}

/// Parse `source` and locate its fret glyphs.
pub fn locate_glyphs_in(source: &str) -> Result<Vec<FretGlyph>> {
    let doc = parse_document(source)?;
    Ok(locate_glyphs(&doc))
}
