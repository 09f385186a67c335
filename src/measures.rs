//! Measure boundary detection — recovers each stave's bar grid from the
//! rectangles the tablature renderer emits.
//!
//! The renderer draws the measure grid once per string, so the sequence of
//! rectangles in one tablature SVG is a repeating unit: narrow rectangles
//! for string/grid lines and wide ones spanning a whole measure. Once the
//! scan comes back to the x where it started (past `repeat_check_index`
//! rectangles), one unit has been seen and every measure is known.
//!
//! The first SVG of a page is the legend/header and is never scanned.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{GridRect, Measure, Stave};
use crate::svg::{first_length, is_svg_element, parse_document};

pub const DEFAULT_WIDTH_THRESHOLD: f64 = 20.0;
pub const DEFAULT_REPEAT_CHECK_INDEX: usize = 6;

/// How far to scan each tablature's rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Stop at the first rectangle that returns to the starting x.
    #[default]
    EarlyExit,
    /// Examine every rectangle. Slower, same result for a repeating grid.
    FullScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectOptions {
    /// Rectangles at most this wide are grid/string lines, not measures
    pub width_threshold: f64,
    /// The scan may only stop on a rectangle whose index exceeds this
    pub repeat_check_index: usize,
    pub strategy: ScanStrategy,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            width_threshold: DEFAULT_WIDTH_THRESHOLD,
            repeat_check_index: DEFAULT_REPEAT_CHECK_INDEX,
            strategy: ScanStrategy::default(),
        }
    }
}

/// Measure key ordered by `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
struct StartX(f64);

impl StartX {
    fn new(x: f64) -> Self {
        // -0.0 and 0.0 are the same boundary
        Self(x + 0.0)
    }
}

impl PartialEq for StartX {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StartX {}

impl PartialOrd for StartX {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StartX {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Accumulator threaded through one stave's scan.
#[derive(Debug, Default)]
struct GridScan {
    /// X of the first rectangle scanned
    start: Option<f64>,
    /// Y of the rectangle that closed the first repeating unit
    vertical_offset: Option<f64>,
    /// Candidate measures keyed by start x; later rectangles overwrite
    widths: BTreeMap<StartX, f64>,
}

impl GridScan {
    /// Whether rectangle `j` returns to the starting x past the repeat
    /// check index.
    fn closes_unit(&self, j: usize, rect: &GridRect, options: &DetectOptions) -> bool {
        j > options.repeat_check_index && self.start == Some(rect.x)
    }

    fn record(&mut self, rect: &GridRect, options: &DetectOptions) {
        if rect.width > options.width_threshold.max(0.0) {
            self.widths.insert(StartX::new(rect.x), rect.width);
        }
    }

    fn into_stave(self, index: usize) -> Stave {
        Stave {
            index,
            vertical_offset: self.vertical_offset,
            measures: self
                .widths
                .into_iter()
                .map(|(start, width)| Measure {
                    start_x: start.0,
                    width,
                })
                .collect(),
        }
    }
}

/// Scan one tablature's rectangles into a stave.
pub fn scan_stave(index: usize, rects: &[GridRect], options: &DetectOptions) -> Stave {
    let mut scan = GridScan::default();

    for (j, rect) in rects.iter().enumerate() {
        log::trace!("stave {index} rect {j}: x={} y={} width={}", rect.x, rect.y, rect.width);
        if scan.start.is_none() {
            scan.start = Some(rect.x);
        }

        // The closing rectangle is a stop signal only; it belongs to the
        // next repetition of the grid and is not recorded.
        if scan.closes_unit(j, rect, options) {
            if scan.vertical_offset.is_none() {
                scan.vertical_offset = Some(rect.y);
            }
            match options.strategy {
                ScanStrategy::EarlyExit => {
                    log::debug!("stave {index}: grid repeats at rect {j}, stopping scan");
                    break;
                }
                ScanStrategy::FullScan => continue,
            }
        }

        scan.record(rect, options);
    }

    scan.into_stave(index)
}

/// Detect the measure grid of every tablature, skipping the first entry
/// (the legend/header SVG). Stave indices count from the first tablature.
pub fn detect_measures(tabs: &[Vec<GridRect>], options: &DetectOptions) -> Vec<Stave> {
    tabs.iter()
        .skip(1)
        .enumerate()
        .map(|(i, rects)| scan_stave(i, rects, options))
        .collect()
}

/// Every `<svg>` element of a page, in document order.
pub fn tablature_svgs<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| is_svg_element(n, "svg"))
        .collect()
}

/// The rectangles inside one SVG, in document order.
///
/// Missing `x`/`y`/`width` default to 0 as in SVG; rectangles with
/// non-finite geometry are dropped.
pub fn locate_rects(svg: Node) -> Vec<GridRect> {
    svg.descendants()
        .filter(|n| is_svg_element(n, "rect"))
        .map(|n| {
            GridRect::new(
                first_length(&n, "x").unwrap_or(0.0),
                first_length(&n, "y").unwrap_or(0.0),
                first_length(&n, "width").unwrap_or(0.0),
            )
        })
        .filter(|r| r.x.is_finite() && r.y.is_finite() && r.width.is_finite())
        .collect()
}

/// Parse a rendered page and detect the measure grid of each tablature.
pub fn detect_measures_in_page(source: &str, options: &DetectOptions) -> Result<Vec<Stave>> {
    let doc = parse_document(source)?;
    let tabs: Vec<Vec<GridRect>> = tablature_svgs(&doc)
        .into_iter()
        .map(locate_rects)
        .collect();
    let staves = detect_measures(&tabs, options);
    log::debug!(
        "detected {} measures across {} staves",
        staves.iter().map(|s| s.measures.len()).sum::<usize>(),
        staves.len()
    );
    Ok(staves)
}

/// Serialize detected staves to JSON.
pub fn staves_to_json(staves: &[Stave]) -> String {
    serde_json::to_string(staves).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rects(layout: &[(f64, f64)]) -> Vec<GridRect> {
        layout.iter().map(|&(x, w)| GridRect::new(x, 0.0, w)).collect()
    }

    #[test]
    fn closing_rectangle_stops_scan_without_recording() {
        let mut input = rects(&[
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 30.0),
            (50.0, 30.0),
        ]);
        input[7].y = 12.0;
        let stave = scan_stave(0, &input, &DetectOptions::default());
        assert_eq!(stave.vertical_offset, Some(12.0));
        assert!(stave.measures.is_empty());
    }

    #[test]
    fn full_scan_records_later_measures() {
        let input = rects(&[
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 5.0),
            (0.0, 30.0),
            (50.0, 30.0),
        ]);
        let options = DetectOptions {
            strategy: ScanStrategy::FullScan,
            ..Default::default()
        };
        let stave = scan_stave(0, &input, &options);
        assert_eq!(stave.vertical_offset, Some(0.0));
        assert_eq!(stave.measures, vec![Measure { start_x: 50.0, width: 30.0 }]);
    }

    #[test]
    fn short_rectangle_lists_scan_fully() {
        let input = rects(&[(10.0, 100.0), (110.0, 80.0), (10.0, 100.0)]);
        let stave = scan_stave(3, &input, &DetectOptions::default());
        assert_eq!(stave.index, 3);
        assert_eq!(stave.vertical_offset, None);
        assert_eq!(
            stave.measures,
            vec![
                Measure { start_x: 10.0, width: 100.0 },
                Measure { start_x: 110.0, width: 80.0 },
            ]
        );
    }

    #[test]
    fn measures_are_sorted_and_deduplicated() {
        let input = rects(&[(300.0, 90.0), (10.0, 100.0), (110.0, 15.0), (10.0, 120.0)]);
        let stave = scan_stave(0, &input, &DetectOptions::default());
        assert_eq!(
            stave.measures,
            vec![
                Measure { start_x: 10.0, width: 120.0 },
                Measure { start_x: 300.0, width: 90.0 },
            ]
        );
    }

    #[test]
    fn first_svg_is_skipped() {
        let legend = rects(&[(0.0, 500.0)]);
        let tab = rects(&[(10.0, 100.0)]);
        let staves = detect_measures(&[legend, tab], &DetectOptions::default());
        assert_eq!(staves.len(), 1);
        assert_eq!(staves[0].index, 0);
        assert_eq!(staves[0].measures, vec![Measure { start_x: 10.0, width: 100.0 }]);
    }

    #[test]
    fn no_input_yields_no_staves() {
        assert!(detect_measures(&[], &DetectOptions::default()).is_empty());
        assert!(detect_measures(&[vec![]], &DetectOptions::default()).is_empty());
    }
}
