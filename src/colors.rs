//! Interval color map.
//!
//! The page template provisions one `<style data-class=".note-N">` element
//! per interval class. Coloring rewrites the body of those rules only; the
//! markers themselves are never touched, so a single call recolors every
//! marker of a class whether it exists yet or not.

use std::ops::Range;

use roxmltree::Node;
use serde::Serialize;

use crate::error::{LickError, Result};
use crate::model::IntervalClass;
use crate::svg::{
    apply_splices, escape_text, parse_document, qualified_name, text_content, Splice,
};

/// The color assigned to one interval class. `None` hides its markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalColorEntry {
    pub interval: IntervalClass,
    pub color: Option<String>,
}

/// A complete assignment: exactly twelve entries, index == interval class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorMap {
    entries: Vec<IntervalColorEntry>,
}

impl ColorMap {
    /// Every interval hidden.
    pub fn hidden() -> Self {
        Self {
            entries: IntervalClass::all()
                .map(|interval| IntervalColorEntry { interval, color: None })
                .collect(),
        }
    }

    /// Build from exactly twelve optional colors. Empty strings count as
    /// hidden.
    pub fn from_colors<I, S>(colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let colors: Vec<Option<String>> = colors
            .into_iter()
            .map(|c| c.map(Into::<String>::into).filter(|s| !s.is_empty()))
            .map(|c| c.map(checked_color).transpose())
            .collect::<Result<_>>()?;
        if colors.len() != IntervalClass::COUNT {
            return Err(LickError::ColorMapLength(colors.len()));
        }
        Ok(Self {
            entries: IntervalClass::all()
                .zip(colors)
                .map(|(interval, color)| IntervalColorEntry { interval, color })
                .collect(),
        })
    }

    /// Decode a JSON array of twelve colors. `null`, `false` and `""` hide
    /// the class.
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let colors = values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => Ok(Some(s)),
                serde_json::Value::Null | serde_json::Value::Bool(false) => Ok(None),
                other => Err(LickError::Json(format!("expected a color or null, got {other}"))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_colors(colors)
    }

    /// Replace the color of one class.
    pub fn with_color(mut self, interval: IntervalClass, color: Option<&str>) -> Result<Self> {
        self.entries[interval.value() as usize].color = color
            .filter(|c| !c.is_empty())
            .map(|c| checked_color(c.to_string()))
            .transpose()?;
        Ok(self)
    }

    pub fn entries(&self) -> &[IntervalColorEntry] {
        &self.entries
    }

    pub fn color(&self, interval: IntervalClass) -> Option<&str> {
        self.entries[interval.value() as usize].color.as_deref()
    }
}

/// Colors end up inside a CSS declaration block and may not close it.
fn checked_color(color: String) -> Result<String> {
    if color.contains(['{', '}', ';']) {
        return Err(LickError::InvalidColor(color));
    }
    Ok(color)
}

/// The CSS body for one interval's rule.
pub fn rule_body(interval: IntervalClass, color: Option<&str>) -> String {
    let selector = interval.selector();
    match color {
        Some(color) => format!("{selector} {{fill:{color}; display:block}}"),
        None => format!("{selector} {{display:none}}"),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StyleRule {
    body: String,
    /// Where the body lives in the template; `None` for rules not read
    /// from a template.
    slot: Option<Slot>,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    /// Byte span of the existing text content.
    Content(Range<usize>),
    /// An empty `<style .../>` element that must be rebuilt with a body.
    Element {
        range: Range<usize>,
        /// Start tag as written, without its closing `/>`
        open_tag: String,
        /// Qualified element name for the end tag
        name: String,
    },
}

/// Outcome of one `apply_colors` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Classes whose rule was rewritten
    pub updated: Vec<IntervalClass>,
    /// Classes with no provisioned rule; left as previously rendered
    pub missing: Vec<IntervalClass>,
}

impl ApplyReport {
    pub fn warnings(&self) -> impl Iterator<Item = LickError> + '_ {
        self.missing.iter().map(|&ic| LickError::MissingStyleRule(ic))
    }
}

/// The per-interval style rules of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteStyles {
    rules: Vec<Option<StyleRule>>,
}

impl NoteStyles {
    /// Read the rules provisioned by a page template.
    pub fn from_template(source: &str) -> Result<Self> {
        let doc = parse_document(source)?;
        let mut rules: Vec<Option<StyleRule>> = vec![None; IntervalClass::COUNT];

        for node in doc.descendants() {
            if !node.is_element() || node.tag_name().name() != "style" {
                continue;
            }
            let Some(interval) = node.attribute("data-class").and_then(parse_selector) else {
                continue;
            };
            let entry = &mut rules[interval.value() as usize];
            if entry.is_some() {
                log::debug!("duplicate style rule for {}; keeping the first", interval.selector());
                continue;
            }
            *entry = Some(StyleRule {
                body: text_content(&node).trim().to_string(),
                slot: Some(content_slot(source, &node)),
            });
        }

        Ok(Self { rules })
    }

    /// All twelve rules provisioned, every class hidden.
    pub fn provisioned() -> Self {
        Self {
            rules: IntervalClass::all()
                .map(|ic| {
                    Some(StyleRule {
                        body: rule_body(ic, None),
                        slot: None,
                    })
                })
                .collect(),
        }
    }

    /// Rewrite the rule of every interval class from `map`.
    ///
    /// Rules are never created or removed. A class without a provisioned
    /// rule is skipped with a warning and listed in the report.
    pub fn apply_colors(&mut self, map: &ColorMap) -> ApplyReport {
        let mut report = ApplyReport::default();
        for entry in map.entries() {
            match &mut self.rules[entry.interval.value() as usize] {
                Some(rule) => {
                    rule.body = rule_body(entry.interval, entry.color.as_deref());
                    report.updated.push(entry.interval);
                }
                None => {
                    log::warn!("{}", LickError::MissingStyleRule(entry.interval));
                    report.missing.push(entry.interval);
                }
            }
        }
        report
    }

    /// Current body of a class's rule, if provisioned.
    pub fn rule(&self, interval: IntervalClass) -> Option<&str> {
        self.rules[interval.value() as usize]
            .as_ref()
            .map(|r| r.body.as_str())
    }

    pub fn is_provisioned(&self, interval: IntervalClass) -> bool {
        self.rules[interval.value() as usize].is_some()
    }

    /// All provisioned rule bodies, one per line, in interval order.
    pub fn to_css(&self) -> String {
        self.rules
            .iter()
            .flatten()
            .map(|r| r.body.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the current rule bodies back into `template`, which must be the
    /// text this value was read from.
    pub fn splice_into(&self, template: &str) -> String {
        let splices = IntervalClass::all()
            .filter_map(|ic| {
                let rule = self.rules[ic.value() as usize].as_ref()?;
                let body = escape_text(&rule.body);
                match rule.slot.as_ref()? {
                    Slot::Content(range) => Some(Splice {
                        range: range.clone(),
                        text: body,
                    }),
                    Slot::Element {
                        range,
                        open_tag,
                        name,
                    } => Some(Splice {
                        range: range.clone(),
                        text: format!("{open_tag}>{body}</{name}>"),
                    }),
                }
            })
            .collect();
        apply_splices(template, splices)
    }
}

/// Emit the twelve hidden rules a page template must provision.
pub fn provision_template() -> String {
    IntervalClass::all()
        .map(|ic| {
            format!(
                r#"<style data-class="{}">{}</style>"#,
                ic.selector(),
                rule_body(ic, None)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `.note-7` → interval class 7.
fn parse_selector(selector: &str) -> Option<IntervalClass> {
    let n: u8 = selector.trim().strip_prefix(".note-")?.parse().ok()?;
    IntervalClass::new(n).ok()
}

fn content_slot(source: &str, node: &Node) -> Slot {
    match (node.first_child(), node.last_child()) {
        (Some(first), Some(last)) => Slot::Content(first.range().start..last.range().end),
        _ => {
            let range = node.range();
            let text = &source[range.clone()];
            let open_tag = text.strip_suffix("/>").unwrap_or(text).trim_end().to_string();
            Slot::Element {
                name: qualified_name(source, &range),
                open_tag,
                range,
            }
        }
    }
}
