//! Global series line chart with the visible range's peak and valley marked.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget},
};

use crate::aggregate::{Extremes, SeriesPoint};
use crate::config::Theme;
use crate::model::UnitScale;

pub fn render_series_chart(
    area: Rect,
    buf: &mut Buffer,
    series: &[SeriesPoint],
    extremes: Option<&Extremes>,
    unit: UnitScale,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("border")))
        .title(format!(" Global emissions ({}) ", unit.label()));

    if series.is_empty() {
        Paragraph::new("No data in range")
            .style(Style::default().fg(theme.get("text_secondary")))
            .centered()
            .block(block)
            .render(area, buf);
        return;
    }

    let points: Vec<(f64, f64)> = series.iter().map(|p| (p.year as f64, p.value)).collect();
    let peak = extremes.map(|e| [(e.peak.year as f64, e.peak.value)]);
    let valley = extremes.map(|e| [(e.valley.year as f64, e.valley.value)]);

    let mut datasets = vec![Dataset::default()
        .name("Global")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.get("primary")))
        .data(&points)];
    if let (Some(e), Some(peak)) = (extremes, peak.as_ref()) {
        datasets.push(
            Dataset::default()
                .name(format!("Peak {} ({:.2})", e.peak.year, e.peak.value))
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(theme.get("rising")))
                .data(peak),
        );
    }
    if let (Some(e), Some(valley)) = (extremes, valley.as_ref()) {
        datasets.push(
            Dataset::default()
                .name(format!("Valley {} ({:.2})", e.valley.year, e.valley.value))
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(theme.get("falling")))
                .data(valley),
        );
    }

    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let x_max = points.last().map(|p| p.0).unwrap_or(0.0);
    let (x_min, x_max) = if x_max > x_min {
        (x_min, x_max)
    } else {
        (x_min - 0.5, x_min + 0.5)
    };
    let y_max = points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let label_style = Style::default().fg(theme.get("text_primary"));
    let x_labels = vec![
        Span::styled(format!("{:.0}", x_min), label_style),
        Span::styled(format!("{:.0}", (x_min + x_max) / 2.0), label_style),
        Span::styled(format!("{:.0}", x_max), label_style),
    ];
    let y_labels = vec![
        Span::styled("0", label_style),
        Span::styled(format!("{:.1}", y_max / 2.0), label_style),
        Span::styled(format!("{:.1}", y_max), label_style),
    ];

    Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .style(label_style)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .style(label_style)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .render(area, buf);
}
