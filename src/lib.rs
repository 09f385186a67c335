//! licklib — interval markers and measure grids for rendered guitar tablature.
//!
//! The tablature itself comes from an external renderer that emits one SVG
//! per track (after a leading legend SVG). licklib reads that output to:
//!
//! - locate the fret-number glyphs and draw one interval-tagged marker next
//!   to each,
//! - recolor or hide markers per interval class by rewriting the page's
//!   provisioned style rules,
//! - infer each track's measure grid from the rendered rectangles.
//!
//! # Example
//! ```no_run
//! use licklib::{detect_page_measures, overlay_svg, IntervalClass};
//!
//! let svg = std::fs::read_to_string("tab.svg").unwrap();
//! let intervals = vec![IntervalClass::new(0).unwrap(), IntervalClass::new(7).unwrap()];
//! let with_markers = overlay_svg(&svg, &intervals).unwrap();
//! let staves = detect_page_measures(&with_markers).unwrap();
//! println!("Staves: {}", staves.len());
//! ```

pub mod colors;
pub mod config;
pub mod error;
pub mod glyphs;
pub mod measures;
pub mod model;
pub mod overlay;
pub mod session;
pub mod svg;

#[cfg(target_os = "android")]
pub mod android;

pub use colors::{provision_template, ApplyReport, ColorMap, IntervalColorEntry, NoteStyles};
pub use config::LickConfig;
pub use error::{LickError, Result};
pub use glyphs::{locate_glyphs, locate_glyphs_in};
pub use measures::{detect_measures, detect_measures_in_page, staves_to_json, DetectOptions, ScanStrategy};
pub use model::*;
pub use overlay::{overlay_markers, place_markers, OverlayOptions};

/// Decode a JSON array of interval classes, e.g. `[0, 7, 4]`.
pub fn intervals_from_json(json: &str) -> Result<Vec<IntervalClass>> {
    Ok(serde_json::from_str(json)?)
}

/// Insert one marker per fret glyph of `svg` using the default geometry.
pub fn overlay_svg(svg: &str, intervals: &[IntervalClass]) -> Result<String> {
    overlay_markers(svg, intervals, &OverlayOptions::default())
}

/// Detect the measure grid of every tablature on a rendered page using the
/// default thresholds.
pub fn detect_page_measures(page: &str) -> Result<Vec<Stave>> {
    detect_measures_in_page(page, &DetectOptions::default())
}

/// Rewrite the interval style rules of `template` from a JSON color map.
///
/// Classes without a provisioned rule are skipped (and logged).
pub fn recolor_template(template: &str, colors_json: &str) -> Result<String> {
    let map = ColorMap::from_json(colors_json)?;
    let mut styles = NoteStyles::from_template(template)?;
    styles.apply_colors(&map);
    Ok(styles.splice_into(template))
}

fn config_or_default(config_json: Option<&str>) -> Result<LickConfig> {
    match config_json {
        Some(json) if !json.trim().is_empty() => LickConfig::from_json(json),
        _ => Ok(LickConfig::default()),
    }
}

/// Overlay markers with an optional JSON config (see [`LickConfig`]).
pub fn overlay_svg_with_config(
    svg: &str,
    intervals_json: &str,
    config_json: Option<&str>,
) -> Result<String> {
    let config = config_or_default(config_json)?;
    let intervals = intervals_from_json(intervals_json)?;
    overlay_markers(svg, &intervals, &config.overlay)
}

/// Detect measures with an optional JSON config and return the staves as JSON.
pub fn detect_measures_json(page: &str, config_json: Option<&str>) -> Result<String> {
    let config = config_or_default(config_json)?;
    let staves = detect_measures_in_page(page, &config.detect)?;
    Ok(staves_to_json(&staves))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// # Safety
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_str().ok()
    }
}

fn into_c_string(result: Result<String>) -> *mut c_char {
    match result {
        Ok(s) => CString::new(s).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Insert note markers into an SVG and return the new SVG as a C string.
/// The caller must free the returned string with `licklib_free_string`.
///
/// Returns null when the glyph and interval counts differ or an input is
/// malformed. `config_json` may be null.
///
/// # Safety
/// `svg` and `intervals_json` must be valid null-terminated UTF-8 C strings.
#[no_mangle]
pub unsafe extern "C" fn licklib_overlay_markers(
    svg: *const c_char,
    intervals_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let (Some(svg), Some(intervals)) = (unsafe { opt_str(svg) }, unsafe { opt_str(intervals_json) })
    else {
        return std::ptr::null_mut();
    };
    let config = unsafe { opt_str(config_json) };
    into_c_string(overlay_svg_with_config(svg, intervals, config))
}

/// Detect the measure grid of a rendered page and return it as JSON.
/// The caller must free the returned string with `licklib_free_string`.
///
/// # Safety
/// `page` must be a valid null-terminated UTF-8 C string. `config_json` may
/// be null.
#[no_mangle]
pub unsafe extern "C" fn licklib_detect_measures(
    page: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let Some(page) = (unsafe { opt_str(page) }) else {
        return std::ptr::null_mut();
    };
    let config = unsafe { opt_str(config_json) };
    into_c_string(detect_measures_json(page, config))
}

/// Rewrite the interval style rules of a page template.
/// The caller must free the returned string with `licklib_free_string`.
///
/// # Safety
/// `template` and `colors_json` must be valid null-terminated UTF-8 C strings.
#[no_mangle]
pub unsafe extern "C" fn licklib_apply_colors(
    template: *const c_char,
    colors_json: *const c_char,
) -> *mut c_char {
    let (Some(template), Some(colors)) = (unsafe { opt_str(template) }, unsafe { opt_str(colors_json) })
    else {
        return std::ptr::null_mut();
    };
    into_c_string(recolor_template(template, colors))
}

/// Free a string previously returned by licklib functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a licklib function, or null.
#[no_mangle]
pub unsafe extern "C" fn licklib_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
