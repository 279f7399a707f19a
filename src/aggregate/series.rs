use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Row, UnitScale, YearRange};

/// Unfiltered world total for one year, in the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// Headline numbers of the global series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub last: SeriesPoint,
    /// Second-to-last point, or a zero point one year before `last`.
    pub previous: SeriesPoint,
    pub yoy_percent: f64,
    /// Extremes over the whole series, ignoring the year range.
    pub peak: SeriesPoint,
    pub valley: SeriesPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub peak: SeriesPoint,
    pub valley: SeriesPoint,
}

/// Sum every row per year (no entity filter), scale, and sort by year.
/// Rows without a year are skipped.
pub fn global_series(rows: &[Row], unit: UnitScale) -> Vec<SeriesPoint> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for row in rows {
        if let Some(year) = row.year {
            *by_year.entry(year).or_insert(0.0) += row.co2;
        }
    }
    by_year
        .into_iter()
        .map(|(year, total)| SeriesPoint {
            year,
            value: unit.scale(total),
        })
        .collect()
}

/// Max and min by value; the first point wins ties.
fn extremes(points: &[SeriesPoint]) -> Option<Extremes> {
    let first = *points.first()?;
    let mut peak = first;
    let mut valley = first;
    for point in points {
        if point.value > peak.value {
            peak = *point;
        }
        if point.value < valley.value {
            valley = *point;
        }
    }
    Some(Extremes { peak, valley })
}

pub fn summarize(series: &[SeriesPoint]) -> Option<Summary> {
    let last = *series.last()?;
    let previous = if series.len() >= 2 {
        series[series.len() - 2]
    } else {
        SeriesPoint {
            year: last.year.saturating_sub(1),
            value: 0.0,
        }
    };
    let yoy_percent = if previous.value != 0.0 {
        (last.value - previous.value) / previous.value * 100.0
    } else {
        0.0
    };
    let Extremes { peak, valley } = extremes(series)?;
    Some(Summary {
        last,
        previous,
        yoy_percent,
        peak,
        valley,
    })
}

/// The part of a year-sorted series inside `range`, or the full series when
/// nothing falls inside.
pub fn visible_series(series: &[SeriesPoint], range: YearRange) -> &[SeriesPoint] {
    let start = series.partition_point(|p| p.year < range.min);
    let end = series.partition_point(|p| p.year <= range.max);
    if start < end {
        &series[start..end]
    } else {
        series
    }
}

/// Peak and valley of the visible part of the series.
pub fn local_extremes(series: &[SeriesPoint], range: YearRange) -> Option<Extremes> {
    extremes(visible_series(series, range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i32, value: f64) -> SeriesPoint {
        SeriesPoint { year, value }
    }

    #[test]
    fn series_skips_rows_without_year() {
        let mut rows = vec![
            Row::new("A", Some("AAA"), 2001, 2e9),
            Row::new("B", None, 2000, 1e9),
            Row::new("C", Some("CCC"), 2001, 1e9),
        ];
        rows.push(Row {
            year: None,
            ..Row::new("D", None, 0, 5e9)
        });
        let series = global_series(&rows, UnitScale::Gt);
        assert_eq!(series, vec![point(2000, 1.0), point(2001, 3.0)]);
    }

    #[test]
    fn summary_of_single_point_uses_synthetic_previous() {
        let summary = summarize(&[point(2020, 5.0)]).unwrap();
        assert_eq!(summary.previous, point(2019, 0.0));
        assert_eq!(summary.yoy_percent, 0.0);
        assert_eq!(summary.peak, point(2020, 5.0));
        assert_eq!(summary.valley, point(2020, 5.0));
    }

    #[test]
    fn summary_ties_keep_first() {
        let series = [point(2000, 3.0), point(2001, 1.0), point(2002, 3.0), point(2003, 1.0)];
        let summary = summarize(&series).unwrap();
        assert_eq!(summary.peak.year, 2000);
        assert_eq!(summary.valley.year, 2001);
        assert!((summary.yoy_percent + 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_has_no_summary() {
        assert!(summarize(&[]).is_none());
        assert!(local_extremes(&[], YearRange::new(2000, 2001)).is_none());
    }

    #[test]
    fn visible_series_clamps_or_falls_back() {
        let series = [point(2000, 1.0), point(2001, 4.0), point(2002, 2.0)];
        assert_eq!(visible_series(&series, YearRange::new(2001, 2002)).len(), 2);
        assert_eq!(visible_series(&series, YearRange::new(1990, 1995)).len(), 3);

        let local = local_extremes(&series, YearRange::new(2002, 2002)).unwrap();
        assert_eq!(local.peak, point(2002, 2.0));
        assert_eq!(local.valley, point(2002, 2.0));
    }

    #[test]
    fn earliest_possible_year_does_not_overflow() {
        let rows = [Row::new("A", Some("AAA"), i32::MIN, 1e9)];
        let summary = summarize(&global_series(&rows, UnitScale::Gt)).unwrap();
        assert_eq!(summary.previous, point(i32::MIN, 0.0));
        assert_eq!(summary.last, point(i32::MIN, 1.0));
    }
}
