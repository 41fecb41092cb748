//! Parsing of `transition` / `transition-behavior` declarations and the rule
//! for whether a value change starts a transition.
//!
//! Only the `transition` shorthand is understood. Each comma-separated item
//! may name a property (or `all` / `none`), up to two times (duration, then
//! delay) and a timing function, in any order.

use super::style::{is_custom_property, normalize_name};

const TIMING_KEYWORDS: &[&str] = &[
    "ease",
    "ease-in",
    "ease-out",
    "ease-in-out",
    "linear",
    "step-start",
    "step-end",
];

/// Which property a transition item applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionProperty {
    /// Every property (`all`).
    All,
    /// No property (`none`).
    None,
    /// A single named property.
    Property(String),
}

impl TransitionProperty {
    /// Check if this item applies to `name`.
    pub fn applies_to(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Property(property) => property == name,
        }
    }
}

/// One item of a `transition` list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEntry {
    /// Target property.
    pub property: TransitionProperty,
    /// Duration in milliseconds.
    pub duration_ms: f32,
    /// Delay in milliseconds (may be negative).
    pub delay_ms: f32,
    /// Timing function as written, `ease` if omitted.
    pub timing_function: String,
}

impl Default for TransitionEntry {
    fn default() -> Self {
        Self {
            property: TransitionProperty::All,
            duration_ms: 0.0,
            delay_ms: 0.0,
            timing_function: "ease".to_string(),
        }
    }
}

impl TransitionEntry {
    /// `max(duration, 0) + delay`. A transition only starts when positive.
    pub fn combined_duration_ms(&self) -> f32 {
        self.duration_ms.max(0.0) + self.delay_ms
    }

    fn parse(item: &str) -> Self {
        let mut entry = Self::default();
        let mut seen_duration = false;
        for token in split_top_level(item, char::is_whitespace) {
            if let Some(ms) = parse_time_ms(token) {
                if seen_duration {
                    entry.delay_ms = ms;
                } else {
                    entry.duration_ms = ms;
                    seen_duration = true;
                }
            } else if is_timing_function(token) {
                entry.timing_function = token.to_string();
            } else if token.eq_ignore_ascii_case("all") {
                entry.property = TransitionProperty::All;
            } else if token.eq_ignore_ascii_case("none") {
                entry.property = TransitionProperty::None;
            } else {
                entry.property = TransitionProperty::Property(normalize_name(token));
            }
        }
        entry
    }
}

/// `transition-behavior` value for one list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionBehavior {
    /// Only interpolable changes transition.
    #[default]
    Normal,
    /// Discrete changes transition too.
    AllowDiscrete,
}

impl TransitionBehavior {
    /// Parse a comma-separated `transition-behavior` value. Unknown
    /// keywords read as `Normal`.
    pub fn parse_list(value: &str) -> Vec<Self> {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                if item.eq_ignore_ascii_case("allow-discrete") {
                    Self::AllowDiscrete
                } else {
                    Self::Normal
                }
            })
            .collect()
    }

    /// Behavior for list position `index`; shorter lists repeat.
    pub fn at(list: &[Self], index: usize) -> Self {
        if list.is_empty() {
            Self::Normal
        } else {
            list[index % list.len()]
        }
    }
}

/// A parsed `transition` declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionList {
    /// Items in declaration order.
    pub entries: Vec<TransitionEntry>,
}

impl TransitionList {
    /// Parse a `transition` value.
    pub fn parse(value: &str) -> Self {
        let entries = split_top_level(value, |c| c == ',')
            .into_iter()
            .map(TransitionEntry::parse)
            .collect();
        Self { entries }
    }

    /// The item governing `name` and its position. Later items win.
    pub fn entry_for(&self, name: &str) -> Option<(usize, &TransitionEntry)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entry)| entry.property.applies_to(name))
    }

    /// Decide whether changing `name` from `before` to `after` starts a
    /// transition under this list and `behaviors`.
    pub fn starts_transition(
        &self,
        behaviors: &[TransitionBehavior],
        name: &str,
        before: &str,
        after: &str,
    ) -> bool {
        if name.starts_with("transition") || before == after {
            return false;
        }
        let Some((index, entry)) = self.entry_for(name) else {
            return false;
        };
        if entry.combined_duration_ms() <= 0.0 {
            return false;
        }
        TransitionBehavior::at(behaviors, index) == TransitionBehavior::AllowDiscrete
            || is_interpolable(name, before, after)
    }
}

/// Standard-property values that are numbers with the same unit.
/// Unregistered custom properties never interpolate.
pub fn is_interpolable(name: &str, before: &str, after: &str) -> bool {
    if is_custom_property(name) {
        return false;
    }
    match (split_numeric(before), split_numeric(after)) {
        (Some((_, unit_a)), Some((_, unit_b))) => unit_a.eq_ignore_ascii_case(unit_b),
        _ => false,
    }
}

fn split_numeric(value: &str) -> Option<(f64, &str)> {
    let value = value.trim();
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(value.len());
    let number = value[..end].parse::<f64>().ok()?;
    Some((number, &value[end..]))
}

fn parse_time_ms(token: &str) -> Option<f32> {
    let lower = token.to_ascii_lowercase();
    if let Some(ms) = lower.strip_suffix("ms") {
        ms.parse().ok()
    } else if let Some(s) = lower.strip_suffix('s') {
        s.parse::<f32>().ok().map(|s| s * 1000.0)
    } else {
        None
    }
}

fn is_timing_function(token: &str) -> bool {
    token.contains('(')
        || TIMING_KEYWORDS
            .iter()
            .any(|keyword| token.eq_ignore_ascii_case(keyword))
}

/// Split on `separator` outside parentheses, dropping empty pieces.
fn split_top_level(value: &str, separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && separator(c) => {
                parts.push(&value[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
