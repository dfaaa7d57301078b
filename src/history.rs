use crate::api::ApiError;
use crate::events::Effect;
use crate::models::HistoryItem;
use chrono::NaiveDate;
use tracing::{info, warn};

pub const EMPTY_HISTORY: &str = "No saved searches.";

/// Past queries as last reported by the server.
#[derive(Debug, Default)]
pub struct HistoryPanel {
    items: Vec<HistoryItem>,
    selected_index: usize,
    loaded: bool,
    unavailable: bool,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub title: String,
    pub details: String,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    pub fn refresh(&self) -> Effect {
        Effect::FetchHistory
    }

    /// Replaces the list with a fresh server answer. A failed fetch keeps
    /// whatever was shown before.
    pub fn on_loaded(&mut self, outcome: Result<Vec<HistoryItem>, ApiError>) {
        match outcome {
            Ok(items) => {
                info!("History loaded: {} entries", items.len());
                self.items = items;
                self.loaded = true;
                self.unavailable = false;
                if self.selected_index >= self.items.len() {
                    self.selected_index = 0;
                }
            }
            Err(e) => {
                warn!("Could not load history: {}", e);
                self.unavailable = true;
            }
        }
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.items.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected_index = index;
            true
        } else {
            false
        }
    }

    /// Rows to draw. An empty list yields the single placeholder row.
    pub fn rows(&self) -> Vec<HistoryRow> {
        if self.items.is_empty() {
            return vec![HistoryRow {
                title: String::new(),
                details: EMPTY_HISTORY.to_string(),
            }];
        }
        self.items
            .iter()
            .map(|item| HistoryRow {
                title: item.title.clone(),
                details: format!("{} - {}", display_date(&item.date), item.location.name),
            })
            .collect()
    }
}

/// Long form of an ISO date, or the raw text if it isn't one.
pub fn display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%a %b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, HistoryLocation};

    fn item(title: &str, date: &str) -> HistoryItem {
        HistoryItem {
            title: title.into(),
            date: date.into(),
            location: HistoryLocation {
                lat: 28.6329,
                lon: -106.0691,
                name: "Chihuahua".into(),
            },
            status_color: Some(Category::Success),
            results: None,
        }
    }

    #[test]
    fn empty_history_renders_placeholder_row() {
        let mut panel = HistoryPanel::new();
        panel.on_loaded(Ok(vec![]));
        let rows = panel.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].details, EMPTY_HISTORY);
        assert!(panel.is_loaded());
    }

    #[test]
    fn rows_show_title_date_and_place() {
        let mut panel = HistoryPanel::new();
        panel.on_loaded(Ok(vec![item("Posada", "2025-12-25")]));
        let rows = panel.rows();
        assert_eq!(rows[0].title, "Posada");
        assert_eq!(rows[0].details, "Thu Dec 25, 2025 - Chihuahua");
    }

    #[test]
    fn unparseable_date_is_shown_raw() {
        assert_eq!(display_date("next friday"), "next friday");
    }

    #[test]
    fn failed_refresh_keeps_previous_items() {
        let mut panel = HistoryPanel::new();
        panel.on_loaded(Ok(vec![item("A", "2025-01-01"), item("B", "2025-01-02")]));
        panel.on_loaded(Err(ApiError::Status {
            status: 500,
            message: None,
        }));
        assert_eq!(panel.items().len(), 2);
        assert!(panel.is_unavailable());
    }

    #[test]
    fn selection_wraps_and_resets_when_list_shrinks() {
        let mut panel = HistoryPanel::new();
        panel.on_loaded(Ok(vec![item("A", "2025-01-01"), item("B", "2025-01-02")]));
        panel.select_previous();
        assert_eq!(panel.selected_index(), 1);
        panel.select_next();
        assert_eq!(panel.selected_index(), 0);
        assert!(panel.select(1));
        assert!(!panel.select(2));

        panel.on_loaded(Ok(vec![item("C", "2025-01-03")]));
        assert_eq!(panel.selected_index(), 0);
    }
}
