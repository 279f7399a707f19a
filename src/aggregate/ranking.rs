use serde::Serialize;
use std::collections::HashMap;

use super::TOP_N;
use crate::classify::is_visible;
use crate::model::{FilterConfig, Row, UnitScale};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub entity: String,
    pub value: f64,
}

/// Largest filtered emitters of one year, next to the unfiltered world total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRanking {
    pub year: i32,
    pub entries: Vec<TopEntry>,
    pub world_total: f64,
}

/// Top entries against everything else, for the share ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShareRing {
    pub top_share: f64,
    pub rest_share: f64,
}

impl ShareRing {
    /// Fraction of the ring taken by the top entries, if the ring is not empty.
    pub fn top_ratio(&self) -> Option<f64> {
        let total = self.top_share + self.rest_share;
        (total > 0.0).then(|| self.top_share / total)
    }
}

impl TopRanking {
    /// `rest_share` is clamped at zero: the filtered top entries can exceed the
    /// unfiltered world total.
    pub fn share_ring(&self) -> ShareRing {
        let top_share: f64 = self.entries.iter().take(TOP_N).map(|e| e.value).sum();
        ShareRing {
            top_share,
            rest_share: (self.world_total - top_share).max(0.0),
        }
    }
}

/// Group filtered rows of `year` by entity, sum, scale, sort descending and
/// keep `n`. Ties keep first-seen order.
pub fn top_n(
    rows: &[Row],
    filter: &FilterConfig,
    unit: UnitScale,
    year: i32,
    n: usize,
) -> TopRanking {
    let mut world_raw = 0.0;
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64)> = Vec::new();

    for row in rows.iter().filter(|r| r.year == Some(year)) {
        world_raw += row.co2;
        if !is_visible(row, filter) {
            continue;
        }
        match index.get(row.entity.as_str()) {
            Some(&i) => totals[i].1 += row.co2,
            None => {
                index.insert(row.entity.as_str(), totals.len());
                totals.push((row.entity.as_str(), row.co2));
            }
        }
    }

    let mut entries: Vec<TopEntry> = totals
        .into_iter()
        .map(|(entity, raw)| TopEntry {
            entity: entity.to_string(),
            value: unit.scale(raw),
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(n);

    TopRanking {
        year,
        entries,
        world_total: unit.scale(world_raw),
    }
}
