//! Interval color tests — rewrite the provisioned per-interval style rules
//! of the player page.

use licklib::{
    provision_template, recolor_template, ColorMap, IntervalClass, LickError, NoteStyles,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn player_page() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/player_page.xhtml");
    std::fs::read_to_string(path).expect("Failed to read player page fixture")
}

fn ic(v: u8) -> IntervalClass {
    IntervalClass::new(v).unwrap()
}

fn root_and_fifth() -> ColorMap {
    ColorMap::hidden()
        .with_color(ic(0), Some("#ff0000"))
        .and_then(|m| m.with_color(ic(7), None))
        .and_then(|m| m.with_color(ic(4), Some("#00aa00")))
        .expect("Failed to build color map")
}

#[test]
fn template_rules_are_discovered() {
    let styles = NoteStyles::from_template(&player_page()).expect("Failed to read template");
    for i in 0..11 {
        assert!(styles.is_provisioned(ic(i)), "rule for .note-{i} should be provisioned");
    }
    assert!(!styles.is_provisioned(ic(11)));
    assert_eq!(styles.rule(ic(3)), Some(".note-3 {display:none}"));
    assert_eq!(styles.rule(ic(5)), Some(""));
}

#[test]
fn colors_show_and_hide_interval_classes() {
    let mut styles = NoteStyles::from_template(&player_page()).unwrap();
    let report = styles.apply_colors(&root_and_fifth());

    assert_eq!(styles.rule(ic(0)), Some(".note-0 {fill:#ff0000; display:block}"));
    assert_eq!(styles.rule(ic(4)), Some(".note-4 {fill:#00aa00; display:block}"));
    assert_eq!(styles.rule(ic(7)), Some(".note-7 {display:none}"));
    assert_eq!(styles.rule(ic(5)), Some(".note-5 {display:none}"));

    assert_eq!(report.updated.len(), 11);
    assert_eq!(report.missing, vec![ic(11)]);
    assert_eq!(report.warnings().collect::<Vec<_>>(), vec![LickError::MissingStyleRule(ic(11))]);
}

#[test]
fn missing_rule_is_not_created() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut styles = NoteStyles::from_template(&player_page()).unwrap();
    styles.apply_colors(&ColorMap::hidden().with_color(ic(11), Some("blue")).unwrap());
    assert_eq!(styles.rule(ic(11)), None);
    assert!(!styles.to_css().contains(".note-11"));
}

#[test]
fn applying_twice_is_idempotent() {
    let page = player_page();
    let map = root_and_fifth();

    let mut once = NoteStyles::from_template(&page).unwrap();
    once.apply_colors(&map);
    let mut twice = once.clone();
    twice.apply_colors(&map);

    assert_eq!(once, twice);
    assert_eq!(once.splice_into(&page), twice.splice_into(&page));
}

#[test]
fn spliced_template_keeps_one_rule_per_class() {
    let page = player_page();
    let mut styles = NoteStyles::from_template(&page).unwrap();
    styles.apply_colors(&root_and_fifth());
    let out = styles.splice_into(&page);

    assert!(out.contains(r#"<style data-class=".note-0">.note-0 {fill:#ff0000; display:block}</style>"#));
    assert!(out.contains(r#"<style data-class=".note-5">.note-5 {display:none}</style>"#));
    assert_eq!(out.matches("<style").count(), 11);

    // Reading the output back yields the same rules.
    let reread = NoteStyles::from_template(&out).unwrap();
    assert_eq!(reread.to_css(), styles.to_css());
    // Everything outside the rules is untouched.
    assert!(out.contains(r#"<rect x="160" y="40" width="120" height="1"/>"#));
}

#[test]
fn recolor_template_from_json() {
    let colors = r##"["#ff0000", null, null, null, null, null, null, "#0000ff", null, null, null, null]"##;
    let out = recolor_template(&player_page(), colors).unwrap();
    assert!(out.contains(".note-7 {fill:#0000ff; display:block}"));
    assert!(out.contains(".note-1 {display:none}"));
}

#[test]
fn provisioned_template_has_all_twelve_rules() {
    let template = format!("<head>{}</head>", provision_template());
    let mut styles = NoteStyles::from_template(&template).unwrap();
    assert!(IntervalClass::all().all(|i| styles.is_provisioned(i)));

    let report = styles.apply_colors(&root_and_fifth());
    assert!(report.missing.is_empty());
    assert_eq!(styles, {
        let mut fresh = NoteStyles::from_template(&template).unwrap();
        fresh.apply_colors(&root_and_fifth());
        fresh
    });
    assert_eq!(
        NoteStyles::provisioned().to_css(),
        NoteStyles::from_template(&template).unwrap().to_css()
    );
}

#[test]
fn injected_color_leaves_template_untouched() {
    let page = player_page();
    let mut colors = vec![serde_json::Value::Null; 12];
    colors[0] = "red} .note-1 {display:block".into();
    let json = serde_json::to_string(&colors).unwrap();
    assert!(matches!(recolor_template(&page, &json), Err(LickError::InvalidColor(_))));
}
