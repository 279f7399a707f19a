use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

use crate::InputMode;

#[derive(Default)]
pub struct Controls {
    pub mode: InputMode,
    /// e.g. "Gt 1750-2022"
    pub status: Option<String>,
    pub dimmed: bool,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    fn keys(&self) -> &'static [(&'static str, &'static str)] {
        match self.mode {
            InputMode::Normal => &[
                ("u", "Unit"),
                ("w", "World"),
                ("g", "Groups"),
                ("c", "GCP"),
                ("o", "OWID"),
                ("r", "Regular"),
                ("[", "From"),
                ("]", "To"),
                ("p", "Countries"),
                ("e", "Export"),
                ("q", "Quit"),
            ],
            InputMode::YearMin | InputMode::YearMax => &[("Enter", "Apply"), ("Esc", "Cancel")],
            InputMode::Picker => &[
                ("Tab", "Focus"),
                ("Space", "Toggle"),
                ("a", "All"),
                ("x", "Clear"),
                ("Enter", "Apply"),
                ("Esc", "Cancel"),
            ],
        }
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let keys = self.keys();

        let mut constraints = keys.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let color = Color::DarkGray;

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in keys.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(color))
                .render(layout[j + 1], buf);
        }

        let status = self.status.as_deref().unwrap_or_default();
        Paragraph::new(status)
            .style(base_style.bg(color).fg(if self.dimmed {
                Color::DarkGray
            } else {
                Color::White
            }))
            .right_aligned()
            .render(layout[keys.len() * 2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    #[test]
    fn keys_are_bold_and_status_is_right_aligned() {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        Controls::new()
            .with_status("Gt 2000-2020 ")
            .render(area, &mut buf);

        assert_eq!(buf[(1, 0)].symbol(), "u");
        assert!(buf[(1, 0)].modifier.contains(Modifier::BOLD));
        assert_eq!(buf[(118, 0)].symbol(), "0");
    }

    #[test]
    fn picker_mode_lists_its_own_keys() {
        let controls = Controls::new().with_mode(InputMode::Picker);
        assert!(controls.keys().iter().any(|(key, _)| *key == "Space"));
    }
}
