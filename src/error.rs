//! Error taxonomy shared by every licklib component.

use thiserror::Error;

use crate::model::IntervalClass;

/// Errors produced by licklib operations.
///
/// Empty inputs (no glyphs, no rectangles) are never errors; they yield
/// empty results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LickError {
    /// Glyph count and interval count differ. No marker is placed.
    #[error("arity mismatch: {glyphs} fret glyphs but {intervals} intervals")]
    ArityMismatch { glyphs: usize, intervals: usize },

    #[error("interval class {0} is outside 0..=11")]
    InvalidInterval(i64),

    #[error("color map must have exactly 12 entries, got {0}")]
    ColorMapLength(usize),

    /// A color that would break out of its CSS declaration.
    #[error("invalid color '{0}': must not contain '{{', '}}' or ';'")]
    InvalidColor(String),

    /// A style rule for an interval class was not provisioned by the page
    /// template. Reported, never raised by `apply_colors`.
    #[error("no style rule provisioned for .note-{}", .0.value())]
    MissingStyleRule(IntervalClass),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The host's network request failed. Logged; never retried.
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unsupported tablature file '{0}': expected .gp3, .gp4 or .gp5")]
    UnsupportedTab(String),
}

impl From<roxmltree::Error> for LickError {
    fn from(e: roxmltree::Error) -> Self {
        LickError::Xml(e.to_string())
    }
}

impl From<serde_json::Error> for LickError {
    fn from(e: serde_json::Error) -> Self {
        LickError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LickError>;
