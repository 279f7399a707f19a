//! Row model and the parameters every derivation takes: unit scale, filter
//! configuration and the user's year range.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use co2dash_cli::Unit;

/// One observation: an entity's emissions for one year, in tonnes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub entity: String,
    /// ISO-style code. `None` when the column is missing or the cell is null.
    pub code: Option<String>,
    /// `None` when the source cell was not a finite whole number.
    pub year: Option<i32>,
    pub co2: f64,
}

impl Row {
    pub fn new(entity: impl Into<String>, code: Option<&str>, year: i32, co2: f64) -> Self {
        Self {
            entity: entity.into(),
            code: code.map(str::to_string),
            year: Some(year),
            co2,
        }
    }

    /// True when the code is present and not blank.
    pub fn has_code(&self) -> bool {
        self.code
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Immutable table of rows in source order.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Row> for RowStore {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Display unit. Input is always tonnes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitScale {
    #[default]
    Gt,
    Mt,
}

impl UnitScale {
    pub fn divisor(self) -> f64 {
        match self {
            UnitScale::Gt => 1e9,
            UnitScale::Mt => 1e6,
        }
    }

    /// Convert tonnes to this unit.
    pub fn scale(self, tonnes: f64) -> f64 {
        tonnes / self.divisor()
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitScale::Gt => "Gt",
            UnitScale::Mt => "Mt",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitScale::Gt => UnitScale::Mt,
            UnitScale::Mt => UnitScale::Gt,
        }
    }

    /// Parse "Gt"/"Mt" case-insensitively (config file values).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "gt" => Some(UnitScale::Gt),
            "mt" => Some(UnitScale::Mt),
            _ => None,
        }
    }
}

impl From<Unit> for UnitScale {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Gt => UnitScale::Gt,
            Unit::Mt => UnitScale::Mt,
        }
    }
}

/// Category exclusions plus an optional allowlist of entity names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterConfig {
    pub hide_world: bool,
    pub hide_groups: bool,
    pub hide_gcp: bool,
    pub hide_owid: bool,
    pub hide_regular: bool,
    /// Empty means no restriction.
    pub allowlist: BTreeSet<String>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hide_world(mut self, hide: bool) -> Self {
        self.hide_world = hide;
        self
    }

    pub fn with_hide_groups(mut self, hide: bool) -> Self {
        self.hide_groups = hide;
        self
    }

    pub fn with_hide_gcp(mut self, hide: bool) -> Self {
        self.hide_gcp = hide;
        self
    }

    pub fn with_hide_owid(mut self, hide: bool) -> Self {
        self.hide_owid = hide;
        self
    }

    pub fn with_hide_regular(mut self, hide: bool) -> Self {
        self.hide_regular = hide;
        self
    }

    pub fn with_allowlist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowlist = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Inclusive year window chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Commit an edited lower bound. Unparseable input falls back to
    /// `data_min`; the result is clamped to `[data_min, self.max]`.
    pub fn commit_min(&mut self, input: &str, data_min: i32) -> i32 {
        let val = parse_year_input(input).unwrap_or(data_min);
        self.min = data_min.max(val.min(self.max));
        self.min
    }

    /// Commit an edited upper bound. Unparseable input falls back to
    /// `data_max`; the result is clamped to `[self.min, data_max]`.
    pub fn commit_max(&mut self, input: &str, data_max: i32) -> i32 {
        let val = parse_year_input(input).unwrap_or(data_max);
        self.max = data_max.min(val.max(self.min));
        self.max
    }
}

/// Leading integer of a text input ("1990abc" -> 1990), like a lenient parseInt.
/// Values past the `i32` range saturate so that the caller's clamp still applies.
fn parse_year_input(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let number = &trimmed[..end];
    let digits = number.trim_start_matches(|c| c == '-' || c == '+');
    if digits.is_empty() {
        return None;
    }
    match number.parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) if number.starts_with('-') => Some(i32::MIN),
        Err(_) => Some(i32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_code_ignores_blank() {
        assert!(Row::new("Chile", Some("CHL"), 2020, 1.0).has_code());
        assert!(!Row::new("Africa", None, 2020, 1.0).has_code());
        assert!(!Row::new("Asia", Some("   "), 2020, 1.0).has_code());
    }

    #[test]
    fn unit_scale_divides() {
        assert_eq!(UnitScale::Gt.scale(3.4e10), 34.0);
        assert_eq!(UnitScale::Mt.scale(3.4e10), 34_000.0);
        assert_eq!(UnitScale::Gt.toggled(), UnitScale::Mt);
        assert_eq!(UnitScale::from_name(" MT "), Some(UnitScale::Mt));
        assert_eq!(UnitScale::from_name("kt"), None);
    }

    #[test]
    fn commit_min_clamps_against_max_and_data() {
        let mut range = YearRange::new(1750, 2023);
        assert_eq!(range.commit_min("1990", 1750), 1990);
        assert_eq!(range.commit_min("1600", 1750), 1750);
        assert_eq!(range.commit_min("2100", 1750), 2023);
        assert_eq!(range.commit_min("abc", 1750), 1750);
        assert_eq!(range.commit_min("2001x", 1750), 2001);
    }

    #[test]
    fn commit_max_clamps_against_min_and_data() {
        let mut range = YearRange::new(1990, 2023);
        assert_eq!(range.commit_max("2030", 2023), 2023);
        assert_eq!(range.commit_max("1980", 2023), 1990);
        assert_eq!(range.commit_max("", 2023), 2023);
        assert_eq!(range.commit_max("2000", 2023), 2000);
    }

    #[test]
    fn out_of_range_input_clamps_to_bounds() {
        let mut range = YearRange::new(1990, 2020);
        assert_eq!(range.commit_min("99999999999", 1750), 2020);

        let mut range = YearRange::new(1990, 2020);
        assert_eq!(range.commit_max("-99999999999", 2023), 1990);
        assert_eq!(range.commit_max("+", 2023), 2023);
    }
}
