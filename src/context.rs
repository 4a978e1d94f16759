use crate::schema::FinancialYear;
use log::warn;
use regex::Regex;

/// Characters kept on each side of a year mention. Flattened PDF text can put a
/// line item several pages away from the column header naming its year.
pub const DEFAULT_CONTEXT_RADIUS: usize = 5000;

/// Anything up to the end of the line, then the first number: digits with
/// optional thousands separators and an optional decimal part.
const VALUE_AFTER_LABEL: &str = r"[^\n]*?([0-9]+(?:,[0-9]+)*(?:\.[0-9]+)?)";

/// A compiled "label followed by a number on the same line" matcher.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    label: String,
    regex: Regex,
}

impl LabelMatcher {
    /// Labels are matched literally; punctuation like parentheses or `&` is escaped.
    pub fn new(label: &str) -> Option<Self> {
        let pattern = format!("{}{}", regex::escape(label), VALUE_AFTER_LABEL);
        match Regex::new(&pattern) {
            Ok(regex) => Some(Self {
                label: label.to_string(),
                regex,
            }),
            Err(e) => {
                warn!("Could not build matcher for label '{}': {}", label, e);
                None
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// First value following the label in `context`, if any.
    pub fn find_value(&self, context: &str) -> Option<f64> {
        let caps = self.regex.captures(context)?;
        parse_amount(caps.get(1)?.as_str())
    }
}

/// Strips thousands separators and parses the remainder.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Slices windows of statement text around year mentions.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindow<'a> {
    text: &'a str,
    radius: usize,
}

impl<'a> ContextWindow<'a> {
    pub fn new(text: &'a str, radius: usize) -> Self {
        Self { text, radius }
    }

    /// The text surrounding the first standalone mention of `year`, or `None`
    /// if the year never appears as its own token.
    pub fn around_year(&self, year: FinancialYear) -> Option<&'a str> {
        let year_regex = Regex::new(&format!(r"\b{}\b", year)).ok()?;
        let found = year_regex.find(self.text)?;
        let (start, end) = char_window(self.text, found.start(), self.radius);
        Some(&self.text[start..end])
    }
}

/// Byte bounds of `radius` characters before and after `anchor`.
fn char_window(text: &str, anchor: usize, radius: usize) -> (usize, usize) {
    let start = text[..anchor]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(anchor);
    let end = text[anchor..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| anchor + i)
        .unwrap_or(text.len());
    (start, end)
}

/// Finds the value printed after `label` near the first mention of `year`.
pub fn extract_value(label: &str, year: FinancialYear, text: &str) -> Option<f64> {
    let context = ContextWindow::new(text, DEFAULT_CONTEXT_RADIUS).around_year(year)?;
    LabelMatcher::new(label)?.find_value(context)
}
