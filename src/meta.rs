//! Metadata pass over the table: available years and selectable entities.

use std::collections::BTreeSet;

use crate::aggregate::display_year;
use crate::classify::passes_categories;
use crate::model::{FilterConfig, Row, YearRange};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetMeta {
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Entities passing the category flags (allowlist ignored), sorted.
    pub countries: Vec<String>,
}

impl DatasetMeta {
    pub fn scan(rows: &[Row], filter: &FilterConfig) -> Self {
        let years: BTreeSet<i32> = rows.iter().filter_map(|r| r.year).collect();
        let countries: BTreeSet<&str> = rows
            .iter()
            .filter(|r| !r.entity.is_empty() && passes_categories(r, filter))
            .map(|r| r.entity.as_str())
            .collect();
        Self {
            years: years.into_iter().collect(),
            countries: countries.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// The full span of the data, if it has any years.
    pub fn full_range(&self) -> Option<YearRange> {
        Some(YearRange::new(self.first_year()?, self.last_year()?))
    }

    /// `year_max` clamped down to the last available year.
    pub fn display_year(&self, year_max: i32) -> Option<i32> {
        self.last_year().map(|last| display_year(year_max, last))
    }

    /// Clamp requested bounds into the data span, keeping `min <= max`.
    pub fn clamp_range(&self, min: Option<i32>, max: Option<i32>) -> Option<YearRange> {
        let full = self.full_range()?;
        let mut range = full;
        if let Some(max) = max {
            range.max = max.clamp(full.min, full.max);
        }
        if let Some(min) = min {
            range.min = min.clamp(full.min, range.max);
        }
        Some(range)
    }
}
