//! Fret marker overlay — one interval-tagged circle per fret glyph.
//!
//! Markers sit just past the right edge of the label. Labels are centered
//! on their anchor, so the offset grows with half the label length:
//!
//! ```text
//! center_x = anchor_x + (len(label) / 2 + 1) * glyph_spacing
//! ```
//!
//! which keeps the gap constant for "3" and "12" alike.

use serde::{Deserialize, Serialize};

use crate::error::{LickError, Result};
use crate::glyphs::locate_glyphs;
use crate::model::{FretGlyph, IntervalClass, NoteMarker};
use crate::svg::{apply_splices, circle_element, parse_document, Splice};

pub const DEFAULT_MARKER_RADIUS: f64 = 8.0;
/// Approximate half-advance of one label character, in SVG user units.
pub const DEFAULT_GLYPH_SPACING: f64 = 3.0;

/// Marker geometry knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub radius: f64,
    pub glyph_spacing: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_MARKER_RADIUS,
            glyph_spacing: DEFAULT_GLYPH_SPACING,
        }
    }
}

/// Horizontal marker center for a glyph.
pub fn marker_center_x(glyph: &FretGlyph, glyph_spacing: f64) -> f64 {
    glyph.anchor_x + (glyph.label_len() as f64 / 2.0 + 1.0) * glyph_spacing
}

/// Compute one marker per glyph, pairing glyphs and intervals by position.
///
/// Fails with [`LickError::ArityMismatch`] before producing anything when
/// the two sequences differ in length.
pub fn place_markers<'a>(
    glyphs: &'a [FretGlyph],
    intervals: &[IntervalClass],
    options: &OverlayOptions,
) -> Result<Vec<NoteMarker<'a>>> {
    if glyphs.len() != intervals.len() {
        return Err(LickError::ArityMismatch {
            glyphs: glyphs.len(),
            intervals: intervals.len(),
        });
    }

    Ok(glyphs
        .iter()
        .zip(intervals)
        .map(|(glyph, &interval)| NoteMarker {
            glyph,
            interval,
            center_x: marker_center_x(glyph, options.glyph_spacing),
            center_y: glyph.anchor_y,
            radius: options.radius,
        })
        .collect())
}

/// Insert each marker's `<circle>` immediately after its glyph's element.
///
/// `glyphs` must have been located in `source`.
pub fn insert_markers(source: &str, markers: &[NoteMarker]) -> String {
    let splices = markers
        .iter()
        .map(|m| {
            let end = m.glyph.source_range.end;
            Splice {
                range: end..end,
                text: circle_element(m),
            }
        })
        .collect();
    apply_splices(source, splices)
}

/// Locate the fret glyphs in `source`, place one marker per interval and
/// return the document with the markers inserted.
pub fn overlay_markers(
    source: &str,
    intervals: &[IntervalClass],
    options: &OverlayOptions,
) -> Result<String> {
    let doc = parse_document(source)?;
    let glyphs = locate_glyphs(&doc);
    let markers = place_markers(&glyphs, intervals, options)?;
    log::debug!("placing {} note markers", markers.len());
    Ok(insert_markers(source, &markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ic(v: u8) -> IntervalClass {
        IntervalClass::new(v).unwrap()
    }

    #[test]
    fn offset_accounts_for_label_width() {
        let glyphs = vec![FretGlyph::new(10.0, 5.0, "3"), FretGlyph::new(40.0, 5.0, "12")];
        let markers = place_markers(&glyphs, &[ic(0), ic(7)], &OverlayOptions::default()).unwrap();

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].center_x, 14.5);
        assert_eq!(markers[0].center_y, 5.0);
        assert_eq!(markers[0].class_attr(), "note note-0");
        assert_eq!(markers[1].center_x, 46.0);
        assert_eq!(markers[1].class_attr(), "note note-7");
        assert_eq!(markers[1].radius, 8.0);
        assert!(std::ptr::eq(markers[1].glyph, &glyphs[1]));
    }

    #[test]
    fn arity_mismatch_places_nothing() {
        let glyphs = vec![FretGlyph::new(10.0, 5.0, "3")];
        let err = place_markers(&glyphs, &[ic(0), ic(1)], &OverlayOptions::default()).unwrap_err();
        assert_eq!(err, LickError::ArityMismatch { glyphs: 1, intervals: 2 });
    }

    #[test]
    fn empty_input_is_valid() {
        let markers = place_markers(&[], &[], &OverlayOptions::default()).unwrap();
        assert!(markers.is_empty());
    }
}
