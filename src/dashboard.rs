//! Composes every derivation for one set of parameters into a single view.

use serde::Serialize;

use crate::aggregate::{
    classify_changes, global_series, local_extremes, peaks, summarize, top_n, visible_series,
    ChangeClassification, Extremes, PeakEntry, SeriesPoint, ShareRing, Summary, TopRanking,
    PEAKS_TOP_K, TOP_N,
};
use crate::config::AppConfig;
use crate::meta::DatasetMeta;
use crate::model::{FilterConfig, RowStore, UnitScale, YearRange};
use crate::Args;

/// Everything a view depends on besides the rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardParams {
    pub filter: FilterConfig,
    pub unit: UnitScale,
    pub years: YearRange,
}

impl DashboardParams {
    /// Start parameters. CLI flags override `[dashboard]` config values; hide
    /// flags from either source apply. Year bounds are clamped into the data.
    pub fn from_args_and_config(args: &Args, config: &AppConfig, meta: &DatasetMeta) -> Self {
        let defaults = &config.dashboard;
        let unit = args
            .unit
            .map(UnitScale::from)
            .unwrap_or_else(|| defaults.unit_scale());
        let base = defaults.filter();
        let filter = FilterConfig::new()
            .with_hide_world(base.hide_world || args.hide_world)
            .with_hide_groups(base.hide_groups || args.hide_groups)
            .with_hide_gcp(base.hide_gcp || args.hide_gcp)
            .with_hide_owid(base.hide_owid || args.hide_owid)
            .with_hide_regular(base.hide_regular || args.hide_regular)
            .with_allowlist(args.countries.iter().map(String::as_str));
        let years = meta
            .clamp_range(
                args.year_min.or(defaults.year_min),
                args.year_max.or(defaults.year_max),
            )
            .unwrap_or(YearRange::new(0, 0));
        Self {
            filter,
            unit,
            years,
        }
    }
}

/// All derived structures for one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub unit: UnitScale,
    pub years: YearRange,
    /// Year used by the ranking and change views.
    pub display_year: Option<i32>,
    /// Global series clamped to the year range (full series when the range is empty).
    pub series: Vec<SeriesPoint>,
    pub summary: Option<Summary>,
    pub local_extremes: Option<Extremes>,
    pub top: Option<TopRanking>,
    pub share_ring: Option<ShareRing>,
    pub changes: Option<ChangeClassification>,
    pub peaks: Vec<PeakEntry>,
}

/// Loaded rows plus their metadata.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    store: RowStore,
    meta: DatasetMeta,
}

impl Dashboard {
    pub fn new(store: RowStore) -> Self {
        let meta = DatasetMeta::scan(store.rows(), &FilterConfig::new());
        Self { store, meta }
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    /// Years and all entity names (no category filter).
    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    /// Entity names selectable under the given category flags.
    pub fn selectable_countries(&self, filter: &FilterConfig) -> Vec<String> {
        DatasetMeta::scan(self.store.rows(), filter).countries
    }

    /// Parameters spanning the whole data set.
    pub fn default_params(&self, filter: FilterConfig, unit: UnitScale) -> DashboardParams {
        let years = self.meta.full_range().unwrap_or(YearRange::new(0, 0));
        DashboardParams {
            filter,
            unit,
            years,
        }
    }

    pub fn compute(&self, params: &DashboardParams) -> DashboardView {
        let rows = self.store.rows();
        let full_series = global_series(rows, params.unit);
        let display_year = self.meta.display_year(params.years.max);

        let top = display_year.map(|year| top_n(rows, &params.filter, params.unit, year, TOP_N));
        let share_ring = top.as_ref().map(TopRanking::share_ring);
        let changes =
            display_year.map(|year| classify_changes(rows, &params.filter, params.unit, year));

        log::debug!(
            "Recomputed dashboard: {} rows, unit {}, years {}..={}",
            rows.len(),
            params.unit.label(),
            params.years.min,
            params.years.max
        );

        DashboardView {
            unit: params.unit,
            years: params.years,
            display_year,
            series: visible_series(&full_series, params.years).to_vec(),
            summary: summarize(&full_series),
            local_extremes: local_extremes(&full_series, params.years),
            top,
            share_ring,
            changes,
            peaks: peaks(rows, &params.filter, params.unit, PEAKS_TOP_K),
        }
    }
}

/// Last computed view keyed by its parameters.
#[derive(Debug, Default)]
pub struct ViewCache {
    last: Option<(DashboardParams, DashboardView)>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached view when `params` match, otherwise recompute.
    pub fn get_or_compute(
        &mut self,
        dashboard: &Dashboard,
        params: &DashboardParams,
    ) -> &DashboardView {
        if matches!(&self.last, Some((cached, _)) if cached != params) {
            self.last = None;
        }
        &self
            .last
            .get_or_insert_with(|| (params.clone(), dashboard.compute(params)))
            .1
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn dashboard() -> Dashboard {
        Dashboard::new(RowStore::new(vec![
            Row::new("World", Some("OWID_WRL"), 2019, 30e9),
            Row::new("World", Some("OWID_WRL"), 2020, 32e9),
            Row::new("Chile", Some("CHL"), 2019, 1e9),
            Row::new("Chile", Some("CHL"), 2020, 2e9),
        ]))
    }

    #[test]
    fn compute_fills_every_view() {
        let dash = dashboard();
        let params = dash.default_params(FilterConfig::new(), UnitScale::Gt);
        assert_eq!(params.years, YearRange::new(2019, 2020));
        let view = dash.compute(&params);
        assert_eq!(view.display_year, Some(2020));
        assert_eq!(view.series.len(), 2);
        assert_eq!(view.summary.map(|s| s.last.value), Some(34.0));
        let top = view.top.unwrap();
        assert_eq!(top.entries[0].entity, "World");
        assert_eq!(top.world_total, 34.0);
        assert_eq!(view.changes.unwrap().counts.rising, 2);
        assert_eq!(view.peaks.len(), 2);
    }

    #[test]
    fn empty_store_yields_empty_view() {
        let dash = Dashboard::new(RowStore::default());
        let params = dash.default_params(FilterConfig::new(), UnitScale::Mt);
        let view = dash.compute(&params);
        assert!(view.summary.is_none());
        assert!(view.top.is_none());
        assert!(view.changes.is_none());
        assert!(view.series.is_empty());
        assert!(view.peaks.is_empty());
    }

    #[test]
    fn args_override_config() {
        use clap::Parser;

        let dash = dashboard();
        let mut config = AppConfig::default();
        config.dashboard.hide_world = true;
        config.dashboard.year_min = Some(1900);
        let args = Args::parse_from([
            "co2dash",
            "data.csv",
            "--unit",
            "mt",
            "--hide-owid",
            "--year-max",
            "2019",
            "--country",
            "Chile",
        ]);
        let params = DashboardParams::from_args_and_config(&args, &config, dash.meta());
        assert_eq!(params.unit, UnitScale::Mt);
        assert!(params.filter.hide_world);
        assert!(params.filter.hide_owid);
        assert!(params.filter.allowlist.contains("Chile"));
        assert_eq!(params.years, YearRange::new(2019, 2019));
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let dash = dashboard();
        let mut cache = ViewCache::new();
        let params = dash.default_params(FilterConfig::new(), UnitScale::Gt);
        let first = cache.get_or_compute(&dash, &params).clone();
        assert_eq!(cache.get_or_compute(&dash, &params), &first);

        let mt = DashboardParams {
            unit: UnitScale::Mt,
            ..params
        };
        let second = cache.get_or_compute(&dash, &mt);
        assert_eq!(second.unit, UnitScale::Mt);
        assert_eq!(second.summary.map(|s| s.last.value), Some(34_000.0));
    }
}
