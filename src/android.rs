//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge. Every
//! failure maps to a null string, like the C FFI.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::{detect_measures_json, overlay_svg_with_config, recolor_template};

fn read_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    if value.is_null() {
        return None;
    }
    env.get_string(value).ok().map(|s| s.into())
}

fn to_jstring(env: &mut JNIEnv, result: crate::Result<String>) -> jstring {
    match result {
        Ok(out) => match env.new_string(&out) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            log::debug!("licklib call failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Insert note markers into a tablature SVG.
///
/// Called from Kotlin as:
///   external fun overlayMarkers(svg: String, intervalsJson: String, configJson: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_licklib_app_LickLib_overlayMarkers(
    mut env: JNIEnv,
    _class: JClass,
    svg: JString,
    intervals_json: JString,
    config_json: JString,
) -> jstring {
    let (Some(svg), Some(intervals)) = (
        read_string(&mut env, &svg),
        read_string(&mut env, &intervals_json),
    ) else {
        return std::ptr::null_mut();
    };
    let config = read_string(&mut env, &config_json);

    let result = overlay_svg_with_config(&svg, &intervals, config.as_deref());
    to_jstring(&mut env, result)
}

/// Detect the measure grid of a rendered page, as JSON.
///
/// Called from Kotlin as:
///   external fun detectMeasures(page: String, configJson: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_licklib_app_LickLib_detectMeasures(
    mut env: JNIEnv,
    _class: JClass,
    page: JString,
    config_json: JString,
) -> jstring {
    let Some(page) = read_string(&mut env, &page) else {
        return std::ptr::null_mut();
    };
    let config = read_string(&mut env, &config_json);

    let result = detect_measures_json(&page, config.as_deref());
    to_jstring(&mut env, result)
}

/// Rewrite the interval style rules of a page template.
///
/// Called from Kotlin as:
///   external fun applyColors(template: String, colorsJson: String): String?
#[no_mangle]
pub extern "system" fn Java_com_licklib_app_LickLib_applyColors(
    mut env: JNIEnv,
    _class: JClass,
    template: JString,
    colors_json: JString,
) -> jstring {
    let (Some(template), Some(colors)) = (
        read_string(&mut env, &template),
        read_string(&mut env, &colors_json),
    ) else {
        return std::ptr::null_mut();
    };

    let result = recolor_template(&template, &colors);
    to_jstring(&mut env, result)
}
