//! Non-interactive output of a computed dashboard view.

use color_eyre::Result;
use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::aggregate::{DeltaEntry, Trend, LIST_PREVIEW};
use crate::classify::{classify, EntityKind};
use crate::dashboard::{Dashboard, DashboardView};
use crate::model::UnitScale;

/// `12.34 Gt`
pub fn format_value(value: f64, unit: UnitScale) -> String {
    format!("{:.2} {}", value, unit.label())
}

/// Percent with an explicit sign, e.g. `+5.88%`.
pub fn format_percent(percent: f64, decimals: usize) -> String {
    let sign = if percent >= 0.0 { "+" } else { "" };
    format!("{}{:.*}%", sign, decimals, percent)
}

/// `+1.20 Gt (+4.5%)`
pub fn format_delta(entry: &DeltaEntry, unit: UnitScale) -> String {
    let sign = if entry.delta_absolute >= 0.0 { "+" } else { "" };
    format!(
        "{}{:.2} {} ({})",
        sign,
        entry.delta_absolute,
        unit.label(),
        format_percent(entry.delta_percent, 1)
    )
}

/// Category of every entity in the data, from its first row.
pub fn entity_kinds(dashboard: &Dashboard) -> HashMap<&str, EntityKind> {
    let mut kinds = HashMap::new();
    for row in dashboard.store().rows() {
        kinds
            .entry(row.entity.as_str())
            .or_insert_with(|| classify(row));
    }
    kinds
}

/// Pretty-printed JSON of the whole view.
pub fn render_json(view: &DashboardView) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// Plain-text summary. Lists show at most the first few entries of each kind.
pub fn render_text(dashboard: &Dashboard, view: &DashboardView) -> String {
    let mut out = String::new();
    if let Err(e) = write_text(&mut out, dashboard, view) {
        log::error!("Failed to format report: {}", e);
    }
    out
}

fn write_text(out: &mut String, dashboard: &Dashboard, view: &DashboardView) -> fmt::Result {
    let kinds = entity_kinds(dashboard);
    let kind_of = |entity: &str| {
        kinds
            .get(entity)
            .map(|k| k.label())
            .unwrap_or(EntityKind::Country.label())
    };
    let unit = view.unit;

    writeln!(out, "CO2 emissions ({} CO2)", unit.label())?;
    writeln!(
        out,
        "Years {}-{}{}",
        view.years.min,
        view.years.max,
        view.display_year
            .map(|y| format!(", showing {}", y))
            .unwrap_or_default()
    )?;

    writeln!(out)?;
    match &view.summary {
        Some(summary) => {
            writeln!(
                out,
                "Global emissions ({}): {} ({} YoY)",
                summary.last.year,
                format_value(summary.last.value, unit),
                format_percent(summary.yoy_percent, 2)
            )?;
            writeln!(
                out,
                "Global peak: {} in {}",
                format_value(summary.peak.value, unit),
                summary.peak.year
            )?;
            writeln!(
                out,
                "Global valley: {} in {}",
                format_value(summary.valley.value, unit),
                summary.valley.year
            )?;
        }
        None => {
            writeln!(out, "No yearly data")?;
        }
    }
    if let Some(extremes) = &view.local_extremes {
        writeln!(
            out,
            "In range: peak {} ({}), valley {} ({})",
            extremes.peak.year,
            format_value(extremes.peak.value, unit),
            extremes.valley.year,
            format_value(extremes.valley.value, unit)
        )?;
    }

    if let Some(top) = &view.top {
        writeln!(out)?;
        writeln!(
            out,
            "Top {} emitters in {} (world {})",
            top.entries.len(),
            top.year,
            format_value(top.world_total, unit)
        )?;
        for (i, entry) in top.entries.iter().enumerate() {
            writeln!(
                out,
                "  {}. {:<32} {:>12}  [{}]",
                i + 1,
                entry.entity,
                format_value(entry.value, unit),
                kind_of(&entry.entity)
            )?;
        }
        if let Some(ratio) = view.share_ring.as_ref().and_then(|r| r.top_ratio()) {
            writeln!(out, "  Top share of world: {:.1}%", ratio * 100.0)?;
        }
    }

    if let Some(changes) = &view.changes {
        writeln!(out)?;
        writeln!(
            out,
            "Changes {} -> {}: {} rising, {} falling, {} unchanged",
            changes.previous_year,
            changes.year,
            changes.counts.rising,
            changes.counts.falling,
            changes.counts.unchanged
        )?;
        for (title, trend) in [
            ("Rising", Trend::Rising),
            ("Falling", Trend::Falling),
            ("Unchanged", Trend::Unchanged),
        ] {
            let list = changes.list(trend);
            if list.is_empty() {
                continue;
            }
            writeln!(out, "  {}:", title)?;
            for entry in list.iter().take(LIST_PREVIEW) {
                writeln!(out, "    {:<32} {}", entry.entity, format_delta(entry, unit))?;
            }
        }
    }

    if !view.peaks.is_empty() {
        writeln!(out)?;
        writeln!(out, "Historical peaks:")?;
        for peak in &view.peaks {
            writeln!(
                out,
                "  {:<32} {:>12}  ({})",
                peak.entity,
                format_value(peak.value, unit),
                peak.year
            )?;
        }
    }

    Ok(())
}
