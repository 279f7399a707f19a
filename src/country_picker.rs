use ratatui::widgets::ListState;
use std::collections::BTreeSet;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum PickerFocus {
    #[default]
    Search,
    List,
}

/// Allowlist editor: a search box over the selectable entities plus a
/// checkbox list of the matches.
#[derive(Debug, Default)]
pub struct CountryPicker {
    pub query: String,
    pub focus: PickerFocus,
    pub selected: BTreeSet<String>,
    pub list_state: ListState,
}

impl CountryPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open with the current allowlist; the search starts empty.
    pub fn open(&mut self, selected: &BTreeSet<String>) {
        self.query.clear();
        self.focus = PickerFocus::Search;
        self.selected = selected.clone();
        self.list_state.select(Some(0));
    }

    /// Drop the search and pending selection.
    pub fn close(&mut self) {
        self.query.clear();
        self.focus = PickerFocus::Search;
        self.selected.clear();
    }

    /// Entities whose name contains the query, case-insensitively.
    pub fn matches<'a>(&self, countries: &'a [String]) -> Vec<&'a str> {
        let q = self.query.trim().to_lowercase();
        countries
            .iter()
            .filter(|c| q.is_empty() || c.to_lowercase().contains(&q))
            .map(String::as_str)
            .collect()
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.list_state.select(Some(0));
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.list_state.select(Some(0));
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.list_state.select(Some(next as usize));
    }

    /// Flip the highlighted match in or out of the selection.
    pub fn toggle_highlighted(&mut self, countries: &[String]) {
        let matches = self.matches(countries);
        let Some(name) = self
            .list_state
            .selected()
            .and_then(|i| matches.get(i))
            .map(|s| s.to_string())
        else {
            return;
        };
        if !self.selected.remove(&name) {
            self.selected.insert(name);
        }
    }

    /// Replace the selection with every current match.
    pub fn select_all_matches(&mut self, countries: &[String]) {
        self.selected = self
            .matches(countries)
            .into_iter()
            .map(str::to_string)
            .collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countries() -> Vec<String> {
        ["Argentina", "Chile", "China", "Peru"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn select_all_replaces_with_matches() {
        let mut picker = CountryPicker::new();
        picker.open(&BTreeSet::from(["Peru".to_string()]));
        picker.push_char('c');
        picker.push_char('h');
        picker.select_all_matches(&countries());
        assert_eq!(
            picker.selected.iter().collect::<Vec<_>>(),
            vec!["Chile", "China"]
        );
    }

    #[test]
    fn toggle_highlighted_flips() {
        let list = countries();
        let mut picker = CountryPicker::new();
        picker.open(&BTreeSet::new());
        picker.move_cursor(1, list.len());
        picker.toggle_highlighted(&list);
        assert!(picker.selected.contains("Chile"));
        picker.toggle_highlighted(&list);
        assert!(picker.selected.is_empty());
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut picker = CountryPicker::new();
        picker.open(&BTreeSet::new());
        picker.move_cursor(10, 3);
        assert_eq!(picker.list_state.selected(), Some(2));
        picker.move_cursor(-10, 3);
        assert_eq!(picker.list_state.selected(), Some(0));
        picker.move_cursor(1, 0);
        assert_eq!(picker.list_state.selected(), None);
    }
}
