use crate::schema::FinancialYear;
use chrono::{Datelike, Local};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;

/// Financial statements conventionally show two or three comparative years.
pub const DEFAULT_MAX_YEARS: usize = 3;

lazy_static! {
    static ref YEAR_REGEX: Regex = Regex::new(r"\b((?:19|20)[0-9]{2})\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearLocator {
    /// Years after this one are treated as extraction artifacts.
    pub current_year: FinancialYear,
    pub max_years: usize,
    /// Keep future years when they are the only candidates.
    pub future_year_fallback: bool,
}

impl Default for YearLocator {
    fn default() -> Self {
        Self {
            current_year: Local::now().year(),
            max_years: DEFAULT_MAX_YEARS,
            future_year_fallback: false,
        }
    }
}

impl YearLocator {
    pub fn new(current_year: FinancialYear, max_years: usize) -> Self {
        Self {
            current_year,
            max_years,
            future_year_fallback: false,
        }
    }

    pub fn with_future_year_fallback(mut self, enabled: bool) -> Self {
        self.future_year_fallback = enabled;
        self
    }

    /// Returns the most recent distinct fiscal years in `text`, ascending.
    pub fn locate(&self, text: &str) -> Vec<FinancialYear> {
        let candidates: BTreeSet<FinancialYear> = YEAR_REGEX
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        let mut years: Vec<FinancialYear> = candidates
            .iter()
            .copied()
            .filter(|year| *year <= self.current_year)
            .collect();

        if years.is_empty() && self.future_year_fallback && !candidates.is_empty() {
            debug!(
                "All {} year candidates are after {}, keeping them unfiltered",
                candidates.len(),
                self.current_year
            );
            years = candidates.into_iter().collect();
        }

        if years.len() > self.max_years {
            years = years.split_off(years.len() - self.max_years);
        }

        years
    }
}

/// Locates years relative to today's calendar year.
pub fn locate_years(text: &str) -> Vec<FinancialYear> {
    YearLocator::default().locate(text)
}
