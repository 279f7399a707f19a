use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, StatefulWidget, Wrap};

pub mod aggregate;
pub mod cache;
pub mod chart_export;
pub mod classify;
pub mod config;
pub mod country_picker;
pub mod dashboard;
pub mod error_display;
pub mod meta;
pub mod model;
pub mod report;
pub mod schema;
pub mod source;
pub mod widgets;

pub use cache::CacheManager;
pub use co2dash_cli::{Args, CompressionFormat, ReportFormat, Unit};
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dashboard::{Dashboard, DashboardParams, DashboardView, ViewCache};
pub use model::{FilterConfig, Row, RowStore, UnitScale, YearRange};
pub use source::{load_table, OpenOptions};

use country_picker::{CountryPicker, PickerFocus};
use widgets::controls::Controls;

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "co2dash";

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions), // Internal event to actually perform loading after UI update
    Export(PathBuf),
    Exit,
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    #[default]
    Normal,
    YearMin,
    YearMax,
    Picker,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

#[derive(Default)]
struct DebugState {
    enabled: bool,
    num_events: usize,
    num_frames: usize,
}

pub struct App {
    events: Sender<AppEvent>,
    args: Args,
    config: AppConfig,
    theme: Theme,
    dashboard: Option<Dashboard>,
    params: Option<DashboardParams>,
    view_cache: ViewCache,
    loading: Option<PathBuf>,
    pub input_mode: InputMode,
    year_input: String,
    picker: CountryPicker,
    picker_countries: Vec<String>,
    error_modal: ErrorModal,
    status: Option<String>,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>, args: Args, config: AppConfig) -> Result<App> {
        let theme = Theme::from_config(&config.theme)?;
        Ok(App {
            events,
            args,
            config,
            theme,
            dashboard: None,
            params: None,
            view_cache: ViewCache::new(),
            loading: None,
            input_mode: InputMode::Normal,
            year_input: String::new(),
            picker: CountryPicker::new(),
            picker_countries: Vec::new(),
            error_modal: ErrorModal::new(),
            status: None,
            debug: DebugState::default(),
        })
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn send_event(&self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    /// Parameters of the current view, once data is loaded.
    pub fn params(&self) -> Option<&DashboardParams> {
        self.params.as_ref()
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    /// Install loaded rows and derive the start parameters from args and config.
    pub fn set_dashboard(&mut self, dashboard: Dashboard) {
        let params =
            DashboardParams::from_args_and_config(&self.args, &self.config, dashboard.meta());
        self.params = Some(params);
        self.dashboard = Some(dashboard);
        self.view_cache.invalidate();
    }

    /// The view for the current parameters, computed on first use after a change.
    pub fn current_view(&mut self) -> Option<&DashboardView> {
        match (&self.dashboard, &self.params) {
            (Some(dashboard), Some(params)) => {
                Some(self.view_cache.get_or_compute(dashboard, params))
            }
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }

    fn update_params(&mut self, f: impl FnOnce(&mut DashboardParams)) {
        if let Some(params) = self.params.as_mut() {
            f(params);
            log::debug!(
                "Parameters changed: unit {}, years {}-{}, {} allowlisted",
                params.unit.label(),
                params.years.min,
                params.years.max,
                params.filter.allowlist.len()
            );
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.key_normal(event),
            InputMode::YearMin | InputMode::YearMax => {
                self.key_year_input(event);
                None
            }
            InputMode::Picker => {
                self.key_picker(event);
                None
            }
        }
    }

    fn key_normal(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Char('e') => {
                return Some(AppEvent::Export(PathBuf::from(&self.config.export.png_path)))
            }
            _ => {}
        }

        if self.params.is_none() {
            return None;
        }
        self.status = None;

        match event.code {
            KeyCode::Char('u') => self.update_params(|p| p.unit = p.unit.toggled()),
            KeyCode::Char('w') => {
                self.update_params(|p| p.filter.hide_world = !p.filter.hide_world)
            }
            KeyCode::Char('g') => {
                self.update_params(|p| p.filter.hide_groups = !p.filter.hide_groups)
            }
            KeyCode::Char('c') => self.update_params(|p| p.filter.hide_gcp = !p.filter.hide_gcp),
            KeyCode::Char('o') => self.update_params(|p| p.filter.hide_owid = !p.filter.hide_owid),
            KeyCode::Char('r') => {
                self.update_params(|p| p.filter.hide_regular = !p.filter.hide_regular)
            }
            KeyCode::Char('[') => {
                if let Some(params) = &self.params {
                    self.year_input = params.years.min.to_string();
                    self.input_mode = InputMode::YearMin;
                }
            }
            KeyCode::Char(']') => {
                if let Some(params) = &self.params {
                    self.year_input = params.years.max.to_string();
                    self.input_mode = InputMode::YearMax;
                }
            }
            KeyCode::Char('p') => {
                if let (Some(dashboard), Some(params)) = (&self.dashboard, &self.params) {
                    self.picker_countries = dashboard.selectable_countries(&params.filter);
                    self.picker.open(&params.filter.allowlist);
                    self.input_mode = InputMode::Picker;
                }
            }
            _ => {}
        }
        None
    }

    fn key_year_input(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => self.year_input.push(c),
            KeyCode::Backspace => {
                self.year_input.pop();
            }
            KeyCode::Enter => {
                let meta = self.dashboard.as_ref().map(|d| d.meta());
                let bounds = meta.and_then(|m| Some((m.first_year()?, m.last_year()?)));
                if let Some((first, last)) = bounds {
                    let input = std::mem::take(&mut self.year_input);
                    let editing_min = self.input_mode == InputMode::YearMin;
                    self.update_params(|p| {
                        if editing_min {
                            p.years.commit_min(&input, first);
                        } else {
                            p.years.commit_max(&input, last);
                        }
                    });
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.year_input.clear();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn key_picker(&mut self, event: &KeyEvent) {
        let len = self.picker.matches(&self.picker_countries).len();
        match event.code {
            KeyCode::Esc => {
                self.picker.close();
                self.input_mode = InputMode::Normal;
                return;
            }
            KeyCode::Enter => {
                let selected = self.picker.selected.clone();
                self.update_params(|p| p.filter.allowlist = selected);
                self.picker.close();
                self.input_mode = InputMode::Normal;
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.picker.focus = match self.picker.focus {
                    PickerFocus::Search => PickerFocus::List,
                    PickerFocus::List => PickerFocus::Search,
                };
                return;
            }
            _ => {}
        }

        match self.picker.focus {
            PickerFocus::Search => match event.code {
                KeyCode::Char(c) => self.picker.push_char(c),
                KeyCode::Backspace => self.picker.pop_char(),
                KeyCode::Down => self.picker.focus = PickerFocus::List,
                _ => {}
            },
            PickerFocus::List => match event.code {
                KeyCode::Up | KeyCode::Char('k') => self.picker.move_cursor(-1, len),
                KeyCode::Down | KeyCode::Char('j') => self.picker.move_cursor(1, len),
                KeyCode::PageUp => self.picker.move_cursor(-10, len),
                KeyCode::PageDown => self.picker.move_cursor(10, len),
                KeyCode::Char(' ') => self.picker.toggle_highlighted(&self.picker_countries),
                KeyCode::Char('a') => self.picker.select_all_matches(&self.picker_countries),
                KeyCode::Char('x') => self.picker.clear(),
                KeyCode::Char('/') => self.picker.focus = PickerFocus::Search,
                _ => {}
            },
        }
    }

    fn export(&mut self, path: &std::path::Path) {
        let (width, height) = (self.config.export.width, self.config.export.height);
        let result = match self.current_view() {
            Some(view) => chart_export::export_view_png(path, view, width, height),
            None => Err(color_eyre::eyre::eyre!("No data loaded")),
        };
        match result {
            Ok(()) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => {
                log::warn!("Export to {} failed: {}", path.display(), e);
                self.error_modal
                    .show(format!("Export failed: {}", error_display::user_message(&e)));
            }
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                // Show the loading screen before reading the file
                self.loading = Some(path.clone());
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                match load_table(path, options) {
                    Ok(table) => self.set_dashboard(Dashboard::new(table.store)),
                    Err(e) => {
                        log::error!("Failed to load {}: {:?}", path.display(), e);
                        self.error_modal.show(error_display::user_message(&e));
                    }
                }
                self.loading = None;
                None
            }
            AppEvent::Export(path) => {
                self.export(path);
                None
            }
            _ => None,
        }
    }

    fn status_line(&self) -> String {
        let Some(params) = &self.params else {
            return String::new();
        };
        let filter = &params.filter;
        let hidden: Vec<&str> = [
            (filter.hide_world, "world"),
            (filter.hide_groups, "groups"),
            (filter.hide_gcp, "GCP"),
            (filter.hide_owid, "OWID"),
            (filter.hide_regular, "regular"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        let mut parts = vec![
            params.unit.label().to_string(),
            format!("{}-{}", params.years.min, params.years.max),
        ];
        if !hidden.is_empty() {
            parts.push(format!("hide {}", hidden.join(",")));
        }
        if !filter.allowlist.is_empty() {
            parts.push(format!("{} selected", filter.allowlist.len()));
        }
        if let Some(status) = &self.status {
            parts.push(status.clone());
        }
        format!("{} ", parts.join(" | "))
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let main_area = layout[0];

        let status = self.status_line();
        Controls::new()
            .with_mode(self.input_mode)
            .with_status(status)
            .with_dimmed(self.error_modal.active)
            .render(layout[1], buf);

        if self.debug.enabled {
            Paragraph::new(format!(
                "events: {} frames: {} rows: {}",
                self.debug.num_events,
                self.debug.num_frames,
                self.dashboard.as_ref().map_or(0, |d| d.store().len())
            ))
            .style(Style::default().fg(self.color("text_secondary")))
            .render(layout[2], buf);
        }

        if let Some(path) = &self.loading {
            Paragraph::new(format!("Loading {}...", path.display()))
                .centered()
                .style(Style::default().fg(self.color("text_secondary")))
                .render(main_area, buf);
        } else {
            let theme = &self.theme;
            let view = match (&self.dashboard, &self.params) {
                (Some(dashboard), Some(params)) => {
                    Some(self.view_cache.get_or_compute(dashboard, params))
                }
                _ => None,
            };
            match view {
                Some(view) => render_dashboard(main_area, buf, view, theme),
                None if !self.error_modal.active => {
                    Paragraph::new("No data loaded")
                        .centered()
                        .style(Style::default().fg(theme.get("text_secondary")))
                        .render(main_area, buf);
                }
                None => {}
            }
        }

        match self.input_mode {
            InputMode::YearMin | InputMode::YearMax => {
                let title = if self.input_mode == InputMode::YearMin {
                    " From year "
                } else {
                    " To year "
                };
                let popup = centered_rect_fixed(main_area, 30, 3);
                Clear.render(popup, buf);
                Paragraph::new(format!("{}_", self.year_input))
                    .style(Style::default().fg(self.color("text_primary")))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(title)
                            .border_style(Style::default().fg(self.color("border_active"))),
                    )
                    .render(popup, buf);
            }
            InputMode::Picker => {
                let popup = centered_rect(main_area, 60, 70);
                render_picker(popup, buf, &mut self.picker, &self.picker_countries, &self.theme);
            }
            InputMode::Normal => {}
        }

        // Error modal has highest priority, shows on top of everything
        if self.error_modal.active {
            let popup_area = centered_rect(area, 70, 40);
            Clear.render(popup_area, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(self.color("error")));
            let inner_area = block.inner(popup_area);
            block.render(popup_area, buf);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner_area);

            Paragraph::new(self.error_modal.message.as_str())
                .style(Style::default().fg(self.color("error")))
                .wrap(Wrap { trim: true })
                .render(chunks[0], buf);

            Paragraph::new("[ OK ]")
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(self.color("border_active"))),
                )
                .render(chunks[1], buf);
        }
    }
}

fn render_dashboard(area: Rect, buf: &mut Buffer, view: &DashboardView, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Fill(3),
        ])
        .split(area);

    widgets::kpi::render_kpis(rows[0], buf, view.summary.as_ref(), view.unit, theme);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    widgets::series_chart::render_series_chart(
        middle[0],
        buf,
        &view.series,
        view.local_extremes.as_ref(),
        view.unit,
        theme,
    );
    widgets::rankings::render_top(
        middle[1],
        buf,
        view.top.as_ref(),
        view.share_ring.as_ref(),
        view.unit,
        theme,
    );

    widgets::changes::render_changes(rows[2], buf, view.changes.as_ref(), view.unit, theme);
    widgets::rankings::render_peaks(rows[3], buf, &view.peaks, view.unit, theme);
}

fn render_picker(
    area: Rect,
    buf: &mut Buffer,
    picker: &mut CountryPicker,
    countries: &[String],
    theme: &Theme,
) {
    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Countries ")
        .border_style(Style::default().fg(theme.get("border_active")));
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let focus_style = |focused: bool| {
        Style::default().fg(if focused {
            theme.get("border_active")
        } else {
            theme.get("border")
        })
    };

    Paragraph::new(picker.query.as_str())
        .style(Style::default().fg(theme.get("text_primary")))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(focus_style(picker.focus == PickerFocus::Search)),
        )
        .render(chunks[0], buf);

    let matches = picker.matches(countries);
    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(picker.focus == PickerFocus::List));
    if matches.is_empty() {
        Paragraph::new("No matches")
            .style(Style::default().fg(theme.get("text_secondary")))
            .block(list_block)
            .render(chunks[1], buf);
    } else {
        let items: Vec<ListItem> = matches
            .iter()
            .map(|name| {
                let mark = if picker.selected.contains(*name) {
                    "[x] "
                } else {
                    "[ ] "
                };
                ListItem::new(Line::from(vec![
                    Span::raw(mark),
                    Span::styled(*name, Style::default().fg(theme.get("text_primary"))),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(list_block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, chunks[1], buf, &mut picker.list_state);
    }

    Paragraph::new(format!(
        "Selected: {} (empty = all)",
        picker.selected.len()
    ))
    .style(Style::default().fg(theme.get("text_secondary")))
    .render(chunks[2], buf);
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn centered_rect_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::sync::mpsc::channel;

    fn key(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn code(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let (tx, _rx) = channel::<AppEvent>();
        let args = Args::parse_from(["co2dash", "data.csv"]);
        let mut app = App::new(tx, args, AppConfig::default()).unwrap();
        app.set_dashboard(Dashboard::new(RowStore::new(vec![
            Row::new("World", Some("OWID_WRL"), 2019, 30e9),
            Row::new("World", Some("OWID_WRL"), 2020, 32e9),
            Row::new("Chile", Some("CHL"), 2019, 1e9),
            Row::new("Chile", Some("CHL"), 2020, 2e9),
            Row::new("China", Some("CHN"), 2020, 9e9),
        ])));
        app
    }

    #[test]
    fn quit_key_exits() {
        let mut app = app();
        assert!(matches!(app.event(&key('q')), Some(AppEvent::Exit)));
    }

    #[test]
    fn unit_and_flags_toggle() {
        let mut app = app();
        app.event(&key('u'));
        app.event(&key('w'));
        let params = app.params().unwrap();
        assert_eq!(params.unit, UnitScale::Mt);
        assert!(params.filter.hide_world);
        let view = app.current_view().unwrap();
        assert_eq!(view.unit, UnitScale::Mt);
        assert!(view
            .top
            .as_ref()
            .unwrap()
            .entries
            .iter()
            .all(|e| e.entity != "World"));
    }

    #[test]
    fn year_input_commits_and_cancels() {
        let mut app = app();
        app.event(&key('['));
        assert_eq!(app.input_mode, InputMode::YearMin);
        app.event(&code(KeyCode::Backspace));
        app.event(&key('0'));
        app.event(&code(KeyCode::Enter));
        assert_eq!(app.params().unwrap().years, YearRange::new(2019, 2020));

        app.event(&key(']'));
        for _ in 0..4 {
            app.event(&code(KeyCode::Backspace));
        }
        app.event(&code(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.params().unwrap().years.max, 2020);
    }

    #[test]
    fn unparseable_year_resets_to_data_bound() {
        let mut app = app();
        app.event(&key(']'));
        for _ in 0..4 {
            app.event(&code(KeyCode::Backspace));
        }
        app.event(&code(KeyCode::Enter));
        assert_eq!(app.params().unwrap().years.max, 2020);
    }

    #[test]
    fn picker_applies_allowlist() {
        let mut app = app();
        app.event(&key('p'));
        assert_eq!(app.input_mode, InputMode::Picker);
        app.event(&key('c'));
        app.event(&key('h'));
        app.event(&code(KeyCode::Tab));
        app.event(&key('a'));
        app.event(&code(KeyCode::Enter));
        let allowlist = &app.params().unwrap().filter.allowlist;
        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.contains("Chile") && allowlist.contains("China"));
    }

    #[test]
    fn error_modal_swallows_keys() {
        let mut app = app();
        app.error_modal.show("boom".to_string());
        assert!(app.event(&key('q')).is_none());
        assert_eq!(app.error_message(), Some("boom"));
        app.event(&code(KeyCode::Esc));
        assert!(app.error_message().is_none());
    }

    #[test]
    fn missing_file_shows_error() {
        let mut app = app();
        let next = app.event(&AppEvent::Open(
            PathBuf::from("/definitely/not/here.csv"),
            OpenOptions::new(),
        ));
        let Some(load) = next else {
            panic!("expected DoLoad");
        };
        assert!(app.event(&load).is_none());
        assert!(app.error_message().is_some());
    }

    #[test]
    fn renders_without_panicking() {
        let mut app = app();
        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        app.event(&key('p'));
        (&mut app).render(area, &mut buf);
    }
}
