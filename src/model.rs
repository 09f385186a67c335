//! Data model for the geometry read from a rendered tablature and the
//! overlay/measure data derived from it.
//!
//! Everything here is recomputed per render pass; nothing carries an
//! identity across renders.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::LickError;

/// Semitone distance (0–11) from a reference tone.
///
/// Used as the key of both the marker class (`note-N`) and the color map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct IntervalClass(u8);

impl IntervalClass {
    pub const COUNT: usize = 12;

    /// Build an interval class, rejecting anything outside 0..=11.
    pub fn new(value: u8) -> Result<Self, LickError> {
        if (value as usize) < Self::COUNT {
            Ok(Self(value))
        } else {
            Err(LickError::InvalidInterval(value as i64))
        }
    }

    /// Reduce an arbitrary semitone distance (possibly negative or spanning
    /// several octaves) to its interval class.
    pub fn from_semitones(semitones: i32) -> Self {
        Self(semitones.rem_euclid(Self::COUNT as i32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// CSS class name carried by markers of this interval.
    pub fn class_name(self) -> String {
        format!("note-{}", self.0)
    }

    /// Selector of the style rule that governs markers of this interval.
    pub fn selector(self) -> String {
        format!(".note-{}", self.0)
    }

    /// All twelve classes in ascending order.
    pub fn all() -> impl Iterator<Item = IntervalClass> {
        (0..Self::COUNT as u8).map(IntervalClass)
    }
}

impl TryFrom<i64> for IntervalClass {
    type Error = LickError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..Self::COUNT as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(LickError::InvalidInterval(value))
        }
    }
}

impl From<IntervalClass> for u8 {
    fn from(ic: IntervalClass) -> u8 {
        ic.0
    }
}

impl fmt::Display for IntervalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered fret-number label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FretGlyph {
    /// X of the text anchor in SVG user units
    pub anchor_x: f64,
    /// Y of the text anchor (the label is vertically centered on it)
    pub anchor_y: f64,
    /// Fret number as rendered, e.g. "3" or "12"
    pub label_text: String,
    /// Byte span of the `<text>` element in the source document
    #[serde(skip)]
    pub source_range: Range<usize>,
    /// The glyph is an SVG element but its siblings default to another
    /// namespace (e.g. `<svg:text>` inside XHTML), so inserted markers must
    /// declare the SVG namespace themselves.
    #[serde(skip)]
    pub foreign_default_namespace: bool,
}

impl FretGlyph {
    pub fn new(anchor_x: f64, anchor_y: f64, label_text: impl Into<String>) -> Self {
        Self {
            anchor_x,
            anchor_y,
            label_text: label_text.into(),
            source_range: 0..0,
            foreign_default_namespace: false,
        }
    }

    /// Label length in characters, surrounding whitespace included.
    pub fn label_len(&self) -> usize {
        self.label_text.chars().count()
    }
}

/// A circle drawn just right of a fret glyph, colored by interval class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteMarker<'a> {
    /// The glyph this marker annotates
    pub glyph: &'a FretGlyph,
    pub interval: IntervalClass,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl NoteMarker<'_> {
    /// Value of the marker's `class` attribute.
    pub fn class_attr(&self) -> String {
        format!("note {}", self.interval.class_name())
    }
}

/// One `<rect>` of a rendered tablature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

impl GridRect {
    pub fn new(x: f64, y: f64, width: f64) -> Self {
        Self { x, y, width }
    }
}

/// One bar of a stave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// X of the measure's left edge in SVG units
    pub start_x: f64,
    /// Width of the measure in SVG units (always > 0)
    pub width: f64,
}

impl Measure {
    pub fn end_x(&self) -> f64 {
        self.start_x + self.width
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start_x && x < self.end_x()
    }
}

/// The measure grid recovered from one track's tablature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stave {
    /// 0-based position among the tablature SVGs (legend excluded)
    pub index: usize,
    /// Y of the rectangle that closed the first repeating unit, if the grid
    /// repeated at all
    pub vertical_offset: Option<f64>,
    /// Measures ordered by ascending `start_x`
    pub measures: Vec<Measure>,
}

impl Stave {
    /// The measure whose horizontal span contains `x`.
    pub fn measure_at(&self, x: f64) -> Option<&Measure> {
        // Measures are sorted, so the candidate is the last one starting at or before x.
        let idx = self.measures.partition_point(|m| m.start_x <= x);
        idx.checked_sub(1)
            .map(|i| &self.measures[i])
            .filter(|m| m.contains(x))
    }

    /// Summed width of all measures.
    pub fn total_width(&self) -> f64 {
        self.measures.iter().map(|m| m.width).sum()
    }
}
