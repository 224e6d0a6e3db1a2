//! Reference-range parsing and value interpretation.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::enums::Interpretation;

use super::patterns::NUM;

static DASH_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{NUM}\s*[-–]\s*{NUM}")).expect("Invalid range pattern"));
static UPPER_BOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"<\s*{NUM}")).expect("Invalid range pattern"));
static LOWER_BOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r">\s*{NUM}")).expect("Invalid range pattern"));

/// Classify a value against an optional (low, high) pair.
///
/// The low check runs first, so a value below `low` is never also reported
/// high even when the bounds are inverted.
pub fn interpret(value: Option<f64>, low: Option<f64>, high: Option<f64>) -> Interpretation {
    let Some(value) = value else {
        return Interpretation::Unknown;
    };
    if let Some(low) = low {
        if value < low {
            return Interpretation::Low;
        }
    }
    if let Some(high) = high {
        if value > high {
            return Interpretation::High;
        }
    }
    if low.is_some() || high.is_some() {
        Interpretation::Normal
    } else {
        Interpretation::Unknown
    }
}

/// Parse range text into (low, high).
///
/// Recognised forms, tried in this order anywhere in the text:
/// `A - B` / `A – B`, `< N`, `> N`. Anything else is (None, None).
pub fn parse_reference_range(text: &str) -> (Option<f64>, Option<f64>) {
    let text = text.trim();

    if let Some(caps) = DASH_RANGE.captures(text) {
        return (parse_number(&caps[1]), parse_number(&caps[2]));
    }
    if let Some(caps) = UPPER_BOUND.captures(text) {
        return (None, parse_number(&caps[1]));
    }
    if let Some(caps) = LOWER_BOUND.captures(text) {
        return (parse_number(&caps[1]), None);
    }
    (None, None)
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
