mod common;

use co2dash::aggregate::{
    classify_changes, global_series, peaks, summarize, top_n, Trend, PEAKS_TOP_K, TOP_N,
};
use co2dash::classify::is_visible;
use co2dash::{Dashboard, FilterConfig, Row, UnitScale, YearRange};
use common::{assert_close, row, sample_store};

#[test]
fn world_series_and_yoy() {
    let rows = vec![
        row("World", Some("OWID_WRL"), 2020, 3.4e10),
        row("World", Some("OWID_WRL"), 2021, 3.6e10),
    ];
    let series = global_series(&rows, UnitScale::Gt);
    assert_eq!(series.len(), 2);
    assert_eq!((series[0].year, series[0].value), (2020, 34.0));
    assert_eq!((series[1].year, series[1].value), (2021, 36.0));

    let summary = summarize(&series).expect("summary");
    assert_eq!(summary.last.year, 2021);
    assert!((summary.yoy_percent - 5.88).abs() < 0.01);
    assert_eq!(summary.peak.year, 2021);
    assert_eq!(summary.valley.year, 2020);
}

#[test]
fn series_is_order_independent() {
    let store = sample_store();
    let mut reversed: Vec<Row> = store.rows().to_vec();
    reversed.reverse();
    let a = global_series(store.rows(), UnitScale::Gt);
    let b = global_series(&reversed, UnitScale::Gt);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.year, y.year);
        assert!((x.value - y.value).abs() < 1e-9);
    }
}

#[test]
fn megatonnes_are_thousand_gigatonnes() {
    let store = sample_store();
    let gt = global_series(store.rows(), UnitScale::Gt);
    let mt = global_series(store.rows(), UnitScale::Mt);
    for (g, m) in gt.iter().zip(&mt) {
        assert!((m.value - g.value * 1000.0).abs() < 1e-6);
    }
}

#[test]
fn hide_groups_keeps_small_countries() {
    let rows = vec![
        row("Andorra", Some("AND"), 2021, 5e5),
        row("Africa", None, 2021, 1.2e9),
    ];
    let filter = FilterConfig::new().with_hide_groups(true);
    let ranking = top_n(&rows, &filter, UnitScale::Gt, 2021, TOP_N);
    let names: Vec<&str> = ranking.entries.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(names, vec!["Andorra"]);
    // World total ignores the filter
    assert_close(ranking.world_total, 1.2005);
}

#[test]
fn dropped_to_zero_is_full_decrease() {
    let rows = vec![
        row("X", Some("XXX"), 2019, 100.0),
        row("X", Some("XXX"), 2020, 0.0),
    ];
    let changes = classify_changes(&rows, &FilterConfig::new(), UnitScale::Gt, 2020);
    assert_eq!(changes.counts.falling, 1);
    assert_eq!(changes.falling[0].delta_percent, -100.0);
}

#[test]
fn new_entity_is_full_increase() {
    let rows = vec![row("New", Some("NEW"), 2020, 5e8)];
    let changes = classify_changes(&rows, &FilterConfig::new(), UnitScale::Gt, 2020);
    assert_eq!(changes.counts.rising, 1);
    assert_eq!(changes.rising[0].delta_percent, 100.0);
    assert_close(changes.rising[0].delta_absolute, 0.5);
}

#[test]
fn changes_partition_the_union() {
    let store = sample_store();
    let changes = classify_changes(store.rows(), &FilterConfig::new(), UnitScale::Gt, 2021);
    let mut seen: Vec<&str> = [Trend::Rising, Trend::Falling, Trend::Unchanged]
        .into_iter()
        .flat_map(|t| changes.list(t).iter().map(|e| e.entity.as_str()))
        .collect();
    let total = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), total, "an entity appears in two lists");

    let mut union: Vec<&str> = store
        .rows()
        .iter()
        .filter(|r| matches!(r.year, Some(2020) | Some(2021)))
        .map(|r| r.entity.as_str())
        .collect();
    union.sort_unstable();
    union.dedup();
    assert_eq!(seen, union);
    // Atlantis only reported in 2020
    assert!(changes
        .falling
        .iter()
        .any(|e| e.entity == "Atlantis" && e.delta_percent == -100.0));
}

#[test]
fn top_n_is_bounded_and_sorted() {
    let store = sample_store();
    for n in [0, 1, 3, TOP_N, 50] {
        let ranking = top_n(store.rows(), &FilterConfig::new(), UnitScale::Gt, 2021, n);
        assert!(ranking.entries.len() <= n);
        assert!(ranking
            .entries
            .windows(2)
            .all(|w| w[0].value >= w[1].value));
    }
}

#[test]
fn peaks_bound_every_filtered_row() {
    let store = sample_store();
    let filter = FilterConfig::new().with_hide_owid(true);
    let result = peaks(store.rows(), &filter, UnitScale::Gt, PEAKS_TOP_K);
    assert!(result.len() <= PEAKS_TOP_K);
    assert!(result.iter().all(|p| p.entity != "World"));
    for peak in &result {
        for r in store
            .rows()
            .iter()
            .filter(|r| r.entity == peak.entity && is_visible(r, &filter))
        {
            assert!(UnitScale::Gt.scale(r.co2) <= peak.value + 1e-12);
        }
    }
    let china = result.iter().find(|p| p.entity == "China").expect("China");
    assert_eq!(china.year, 2021);
}

#[test]
fn allowlist_narrows_rankings_but_not_series() {
    let dashboard = Dashboard::new(sample_store());
    let filter = FilterConfig::new().with_allowlist(["Chile", "Andorra"]);
    let params = dashboard.default_params(filter, UnitScale::Mt);
    let view = dashboard.compute(&params);

    let top = view.top.expect("top ranking");
    let names: Vec<&str> = top.entries.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(names, vec!["Chile", "Andorra"]);
    assert_eq!(view.peaks.len(), 2);

    let unfiltered_params = dashboard.default_params(FilterConfig::new(), UnitScale::Mt);
    let unfiltered = dashboard.compute(&unfiltered_params);
    assert_eq!(view.series, unfiltered.series);
    assert_eq!(view.summary, unfiltered.summary);
}

#[test]
fn year_range_limits_display_year_and_local_extremes() {
    let dashboard = Dashboard::new(sample_store());
    let mut params = dashboard.default_params(FilterConfig::new(), UnitScale::Gt);
    params.years = YearRange::new(2020, 2020);
    let view = dashboard.compute(&params);
    assert_eq!(view.display_year, Some(2020));
    assert_eq!(view.series.len(), 1);
    let local = view.local_extremes.expect("extremes");
    assert_eq!(local.peak.year, 2020);
    // The headline summary always uses the full series
    assert_eq!(view.summary.map(|s| s.last.year), Some(2021));
}
