//! Structural line patterns for lab report rows.
//!
//! Three layouts cover most vendors:
//! - `Hemoglobin  11.2  g/dL  13.0 - 17.0` (name, value, unit, range)
//! - `Glucose  110  70 - 99` (name, value, range)
//! - `Hemoglobin : 11.2 g/dL (13-17)` (separator, optional unit and range)
//!
//! Patterns are tried in that order and the first match wins. Putting the
//! unit layout first stops a unit token from being swallowed into the range.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Signed integer or decimal, captured.
pub const NUM: &str = r"(-?\d+(?:\.\d+)?)";

/// Test-name prefix shared by every layout. Lazy so the value starts at the first number.
const TEST: &str = r"(?P<test>[A-Za-z][A-Za-z0-9 ()/.,\-]+?)";

/// Unit token such as `g/dL`, `%`, `µg/L`, `mIU/L`.
const UNIT: &str = r"([a-zA-Z/%µμ]+(?:/[a-zA-Z]+)?)";

static RANGE: LazyLock<String> =
    LazyLock::new(|| format!(r"({NUM}\s*[-–]\s*{NUM}|<\s*{NUM}|>\s*{NUM})"));

static NAME_VALUE_UNIT_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let range = RANGE.as_str();
    Regex::new(&format!(
        r"^{TEST}\s+(?P<value>{NUM})\s*(?P<unit>{UNIT})?\s+(?P<ref>{range}.*)$"
    ))
    .expect("Invalid lab line pattern")
});

static NAME_VALUE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let range = RANGE.as_str();
    Regex::new(&format!(
        r"^{TEST}\s+(?P<value>{NUM})\s+(?P<ref>{range}.*)$"
    ))
    .expect("Invalid lab line pattern")
});

static SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    let range = RANGE.as_str();
    Regex::new(&format!(
        r"^{TEST}\s*[:\-]\s*(?P<value>{NUM})\s*(?P<unit>{UNIT})?\s*[\(\[]?(?P<ref>{range}.*)?[\)\]]?$"
    ))
    .expect("Invalid lab line pattern")
});

/// Raw pieces captured from one line, before any numeric parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub test: String,
    pub value_raw: String,
    pub unit: Option<String>,
    pub ref_raw: Option<String>,
}

/// One structural layout that can be attempted against a single trimmed line.
pub trait LinePattern: Send + Sync {
    fn name(&self) -> &'static str;

    fn match_line(&self, line: &str) -> Option<LineMatch>;
}

/// `<name> <value> [<unit>] <range>`
pub struct NameValueUnitRange;

/// `<name> <value> <range>`
pub struct NameValueRange;

/// `<name>[:|-] <value> [<unit>] [(range)]`
pub struct SeparatedNameValue;

impl LinePattern for NameValueUnitRange {
    fn name(&self) -> &'static str {
        "name_value_unit_range"
    }

    fn match_line(&self, line: &str) -> Option<LineMatch> {
        NAME_VALUE_UNIT_RANGE.captures(line).map(to_line_match)
    }
}

impl LinePattern for NameValueRange {
    fn name(&self) -> &'static str {
        "name_value_range"
    }

    fn match_line(&self, line: &str) -> Option<LineMatch> {
        NAME_VALUE_RANGE.captures(line).map(to_line_match)
    }
}

impl LinePattern for SeparatedNameValue {
    fn name(&self) -> &'static str {
        "separated_name_value"
    }

    fn match_line(&self, line: &str) -> Option<LineMatch> {
        SEPARATED.captures(line).map(to_line_match)
    }
}

/// The three layouts in precedence order.
pub fn default_patterns() -> Vec<Box<dyn LinePattern>> {
    vec![
        Box::new(NameValueUnitRange),
        Box::new(NameValueRange),
        Box::new(SeparatedNameValue),
    ]
}

fn to_line_match(caps: Captures<'_>) -> LineMatch {
    let non_empty = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };
    LineMatch {
        test: caps.name("test").map_or("", |m| m.as_str()).trim().to_string(),
        value_raw: caps.name("value").map_or("", |m| m.as_str()).trim().to_string(),
        unit: non_empty("unit"),
        ref_raw: non_empty("ref"),
    }
}
