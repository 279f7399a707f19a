pub mod changes;
pub mod controls;
pub mod kpi;
pub mod rankings;
pub mod series_chart;

/// Shorten a label to `max` characters, ending with an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Bar heights are integers; keep two decimals of resolution and drop negatives.
pub(crate) fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        (value * 100.0).round() as u64
    } else {
        0
    }
}
