//! Headline cards: latest global value with YoY, global peak and valley.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::aggregate::Summary;
use crate::config::Theme;
use crate::model::UnitScale;
use crate::report::{format_percent, format_value};

fn card(area: Rect, buf: &mut Buffer, title: String, value: String, sub: Line, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("border")))
        .title(title);
    let lines = vec![
        Line::from(Span::styled(
            value,
            Style::default()
                .fg(theme.get("text_primary"))
                .add_modifier(Modifier::BOLD),
        )),
        sub,
    ];
    Paragraph::new(lines).block(block).render(area, buf);
}

pub fn render_kpis(
    area: Rect,
    buf: &mut Buffer,
    summary: Option<&Summary>,
    unit: UnitScale,
    theme: &Theme,
) {
    let Some(summary) = summary else {
        Paragraph::new("No yearly data")
            .style(Style::default().fg(theme.get("text_secondary")))
            .block(Block::default().borders(Borders::ALL))
            .render(area, buf);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);
    let secondary = Style::default().fg(theme.get("text_secondary"));

    let yoy_color = if summary.yoy_percent > 0.0 {
        theme.get("rising")
    } else {
        theme.get("falling")
    };
    card(
        cols[0],
        buf,
        format!(" Global emissions ({}) ", summary.last.year),
        format_value(summary.last.value, unit),
        Line::from(Span::styled(
            format!("{} YoY", format_percent(summary.yoy_percent, 2)),
            Style::default().fg(yoy_color),
        )),
        theme,
    );
    card(
        cols[1],
        buf,
        " Global peak ".to_string(),
        format_value(summary.peak.value, unit),
        Line::from(Span::styled(format!("Year {}", summary.peak.year), secondary)),
        theme,
    );
    card(
        cols[2],
        buf,
        " Global valley ".to_string(),
        format_value(summary.valley.value, unit),
        Line::from(Span::styled(
            format!("Year {}", summary.valley.year),
            secondary,
        )),
        theme,
    );
}
