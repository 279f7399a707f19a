use serde::Serialize;
use std::collections::HashMap;

use crate::classify::is_visible;
use crate::model::{FilterConfig, Row, UnitScale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaEntry {
    pub entity: String,
    pub delta_absolute: f64,
    pub delta_percent: f64,
}

impl DeltaEntry {
    fn new(entity: &str, current: f64, previous: f64) -> Self {
        let delta_absolute = current - previous;
        let delta_percent = if previous != 0.0 {
            delta_absolute / previous * 100.0
        } else if current != 0.0 {
            100.0
        } else {
            0.0
        };
        Self {
            entity: entity.to_string(),
            delta_absolute,
            delta_percent,
        }
    }

    pub fn trend(&self) -> Trend {
        if self.delta_absolute > 0.0 {
            Trend::Rising
        } else if self.delta_absolute < 0.0 {
            Trend::Falling
        } else {
            Trend::Unchanged
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrendCounts {
    pub rising: usize,
    pub falling: usize,
    pub unchanged: usize,
}

/// Year-over-year movement of every filtered entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeClassification {
    pub year: i32,
    pub previous_year: i32,
    pub counts: TrendCounts,
    /// Largest increase first.
    pub rising: Vec<DeltaEntry>,
    /// Largest decrease first.
    pub falling: Vec<DeltaEntry>,
    /// Alphabetical.
    pub unchanged: Vec<DeltaEntry>,
}

impl ChangeClassification {
    pub fn list(&self, trend: Trend) -> &[DeltaEntry] {
        match trend {
            Trend::Rising => &self.rising,
            Trend::Falling => &self.falling,
            Trend::Unchanged => &self.unchanged,
        }
    }
}

/// Entity sums for one year, in first-seen order.
struct YearTotals<'a> {
    index: HashMap<&'a str, usize>,
    totals: Vec<(&'a str, f64)>,
}

impl<'a> YearTotals<'a> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            totals: Vec::new(),
        }
    }

    fn add(&mut self, entity: &'a str, co2: f64) {
        match self.index.get(entity) {
            Some(&i) => self.totals[i].1 += co2,
            None => {
                self.index.insert(entity, self.totals.len());
                self.totals.push((entity, co2));
            }
        }
    }

    fn get(&self, entity: &str) -> f64 {
        self.index
            .get(entity)
            .map(|&i| self.totals[i].1)
            .unwrap_or(0.0)
    }
}

/// Compare `year` against `year - 1` over the union of entities present in
/// either year; a missing side counts as zero.
pub fn classify_changes(
    rows: &[Row],
    filter: &FilterConfig,
    unit: UnitScale,
    year: i32,
) -> ChangeClassification {
    let previous_year = year.saturating_sub(1);
    let mut current = YearTotals::new();
    let mut previous = YearTotals::new();

    for row in rows {
        if !is_visible(row, filter) {
            continue;
        }
        match row.year {
            Some(y) if y == year => current.add(&row.entity, row.co2),
            Some(y) if y == previous_year => previous.add(&row.entity, row.co2),
            _ => {}
        }
    }

    let union = current
        .totals
        .iter()
        .map(|&(entity, _)| entity)
        .chain(
            previous
                .totals
                .iter()
                .map(|&(entity, _)| entity)
                .filter(|entity| !current.index.contains_key(entity)),
        );

    let mut rising = Vec::new();
    let mut falling = Vec::new();
    let mut unchanged = Vec::new();
    for entity in union {
        let entry = DeltaEntry::new(
            entity,
            unit.scale(current.get(entity)),
            unit.scale(previous.get(entity)),
        );
        match entry.trend() {
            Trend::Rising => rising.push(entry),
            Trend::Falling => falling.push(entry),
            Trend::Unchanged => unchanged.push(entry),
        }
    }

    rising.sort_by(|a, b| b.delta_absolute.total_cmp(&a.delta_absolute));
    falling.sort_by(|a, b| a.delta_absolute.total_cmp(&b.delta_absolute));
    unchanged.sort_by(|a, b| {
        a.entity
            .to_lowercase()
            .cmp(&b.entity.to_lowercase())
            .then_with(|| a.entity.cmp(&b.entity))
    });

    ChangeClassification {
        year,
        previous_year,
        counts: TrendCounts {
            rising: rising.len(),
            falling: falling.len(),
            unchanged: unchanged.len(),
        },
        rising,
        falling,
        unchanged,
    }
}
