//! Top emitters with the top-vs-rest share, and historical peaks.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Widget},
};

use super::{bar_height, truncate};
use crate::aggregate::{PeakEntry, ShareRing, TopRanking};
use crate::config::Theme;
use crate::model::UnitScale;
use crate::report::format_value;

const LABEL_CHARS: usize = 28;

fn bordered(title: String, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("border")))
        .title(title)
}

fn horizontal_bars<'a>(bars: &[Bar<'a>], block: Block<'a>) -> BarChart<'a> {
    BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(bars))
}

pub fn render_top(
    area: Rect,
    buf: &mut Buffer,
    top: Option<&TopRanking>,
    ring: Option<&ShareRing>,
    unit: UnitScale,
    theme: &Theme,
) {
    let Some(top) = top else {
        Paragraph::new("No data")
            .block(bordered(" Top emitters ".to_string(), theme))
            .render(area, buf);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(3)])
        .split(area);

    let block = bordered(format!(" Top {} in {} ", top.entries.len(), top.year), theme);
    if top.entries.is_empty() {
        Paragraph::new("No entities match the filters")
            .style(Style::default().fg(theme.get("text_secondary")))
            .block(block)
            .render(layout[0], buf);
    } else {
        let bar_style = Style::default().fg(theme.get("secondary"));
        let bars: Vec<Bar> = top
            .entries
            .iter()
            .map(|e| {
                Bar::default()
                    .value(bar_height(e.value))
                    .label(Line::from(truncate(&e.entity, LABEL_CHARS)))
                    .text_value(format_value(e.value, unit))
                    .style(bar_style)
            })
            .collect();
        horizontal_bars(&bars, block).render(layout[0], buf);
    }

    let ratio = ring.and_then(ShareRing::top_ratio).unwrap_or(0.0);
    Gauge::default()
        .block(bordered(
            format!(" World {} ", format_value(top.world_total, unit)),
            theme,
        ))
        .gauge_style(
            Style::default()
                .fg(theme.get("accent"))
                .bg(theme.get("neutral")),
        )
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("Top share {:.1}%", ratio * 100.0))
        .render(layout[1], buf);
}

pub fn render_peaks(
    area: Rect,
    buf: &mut Buffer,
    peaks: &[PeakEntry],
    unit: UnitScale,
    theme: &Theme,
) {
    let block = bordered(format!(" Historical peaks (top {}) ", peaks.len()), theme);
    if peaks.is_empty() {
        Paragraph::new("No data")
            .style(Style::default().fg(theme.get("text_secondary")))
            .block(block)
            .render(area, buf);
        return;
    }

    let bar_style = Style::default().fg(theme.get("accent"));
    let bars: Vec<Bar> = peaks
        .iter()
        .map(|p| {
            Bar::default()
                .value(bar_height(p.value))
                .label(Line::from(format!(
                    "{} ({})",
                    truncate(&p.entity, LABEL_CHARS),
                    p.year
                )))
                .text_value(format_value(p.value, unit))
                .style(bar_style)
        })
        .collect();
    horizontal_bars(&bars, block).render(area, buf);
}
