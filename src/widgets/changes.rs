//! Year-over-year movement: counts per trend plus the head of each list.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph, Widget},
};

use super::truncate;
use crate::aggregate::{ChangeClassification, Trend, LIST_PREVIEW};
use crate::config::Theme;
use crate::model::UnitScale;
use crate::report::format_delta;

fn trend_color(trend: Trend, theme: &Theme) -> Color {
    match trend {
        Trend::Rising => theme.get("rising"),
        Trend::Falling => theme.get("falling"),
        Trend::Unchanged => theme.get("neutral"),
    }
}

pub fn render_changes(
    area: Rect,
    buf: &mut Buffer,
    changes: Option<&ChangeClassification>,
    unit: UnitScale,
    theme: &Theme,
) {
    let border = Style::default().fg(theme.get("border"));
    let Some(changes) = changes else {
        Paragraph::new("No data")
            .block(Block::default().borders(Borders::ALL).border_style(border))
            .render(area, buf);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(26),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ])
        .split(area);

    let counts = [
        (Trend::Rising, "Up", changes.counts.rising),
        (Trend::Falling, "Down", changes.counts.falling),
        (Trend::Unchanged, "Same", changes.counts.unchanged),
    ];
    let bars: Vec<Bar> = counts
        .iter()
        .map(|&(trend, label, count)| {
            Bar::default()
                .value(count as u64)
                .label(Line::from(label))
                .style(Style::default().fg(trend_color(trend, theme)))
        })
        .collect();
    BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} vs {} ", changes.year, changes.previous_year)),
        )
        .bar_width(6)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .render(cols[0], buf);

    let lists = [
        (Trend::Rising, "Rising"),
        (Trend::Falling, "Falling"),
        (Trend::Unchanged, "Unchanged"),
    ];
    let text_primary = Style::default().fg(theme.get("text_primary"));
    for (i, (trend, title)) in lists.into_iter().enumerate() {
        let entries = changes.list(trend);
        let delta_style = Style::default().fg(trend_color(trend, theme));
        let items: Vec<ListItem> = entries
            .iter()
            .take(LIST_PREVIEW)
            .map(|e| {
                ListItem::new(vec![
                    Line::from(Span::styled(truncate(&e.entity, 28), text_primary)),
                    Line::from(Span::styled(format!("  {}", format_delta(e, unit)), delta_style)),
                ])
            })
            .collect();
        List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!(" {} ({}) ", title, entries.len())),
            )
            .render(cols[i + 1], buf);
    }
}
