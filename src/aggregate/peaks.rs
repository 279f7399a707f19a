use serde::Serialize;
use std::collections::HashMap;

use crate::classify::is_visible;
use crate::model::{FilterConfig, Row, UnitScale};

/// Highest single-year emissions of an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakEntry {
    pub entity: String,
    pub year: i32,
    pub value: f64,
}

/// Per-entity historical maximum over filtered rows, largest first, at most
/// `top_k` entries. A later year only replaces the peak when strictly greater.
pub fn peaks(rows: &[Row], filter: &FilterConfig, unit: UnitScale, top_k: usize) -> Vec<PeakEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut best: Vec<(&str, i32, f64)> = Vec::new();

    for row in rows {
        let Some(year) = row.year else {
            continue;
        };
        if !is_visible(row, filter) {
            continue;
        }
        match index.get(row.entity.as_str()) {
            Some(&i) => {
                if row.co2 > best[i].2 {
                    best[i] = (row.entity.as_str(), year, row.co2);
                }
            }
            None => {
                index.insert(row.entity.as_str(), best.len());
                best.push((row.entity.as_str(), year, row.co2));
            }
        }
    }

    let mut entries: Vec<PeakEntry> = best
        .into_iter()
        .map(|(entity, year, raw)| PeakEntry {
            entity: entity.to_string(),
            year,
            value: unit.scale(raw),
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(top_k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_year_of_tied_maximum() {
        let rows = vec![
            Row::new("A", Some("AAA"), 1990, 5e9),
            Row::new("A", Some("AAA"), 2000, 7e9),
            Row::new("A", Some("AAA"), 2010, 7e9),
            Row::new("B", Some("BBB"), 2000, 9e9),
        ];
        let result = peaks(&rows, &FilterConfig::new(), UnitScale::Gt, 15);
        assert_eq!(
            result,
            vec![
                PeakEntry { entity: "B".into(), year: 2000, value: 9.0 },
                PeakEntry { entity: "A".into(), year: 2000, value: 7.0 },
            ]
        );
    }

    #[test]
    fn tied_maximum_keeps_scan_order_not_year_order() {
        let rows = vec![
            Row::new("A", Some("AAA"), 2010, 7e9),
            Row::new("A", Some("AAA"), 2000, 7e9),
        ];
        let result = peaks(&rows, &FilterConfig::new(), UnitScale::Gt, 15);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].year, 2010);
    }

    #[test]
    fn truncates_and_filters() {
        let rows: Vec<Row> = (0..20)
            .map(|i| Row::new(format!("E{i}"), Some("X"), 2000, (i as f64) * 1e9))
            .chain(std::iter::once(Row::new("Europe", None, 2000, 1e12)))
            .collect();
        let filter = FilterConfig::new().with_hide_groups(true);
        let result = peaks(&rows, &filter, UnitScale::Gt, 15);
        assert_eq!(result.len(), 15);
        assert_eq!(result[0].entity, "E19");
        assert!(result.iter().all(|p| p.entity != "Europe"));
    }
}
