use ratatui::widgets::ListState;

use crate::api::HistoryEntry;

pub const PREVIEW_CHARS: usize = 30;

/// Shorten a prompt for the history list: 30 characters, then `...`.
pub fn truncate_prompt(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    Loading,
    Ready,
    Unavailable,
}

#[derive(Debug)]
pub struct HistoryPanel {
    pub entries: Vec<HistoryEntry>,
    pub state: ListState,
    pub status: HistoryStatus,
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            state: ListState::default(),
            status: HistoryStatus::Loading,
        }
    }
}

impl HistoryPanel {
    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
        self.status = HistoryStatus::Ready;
        let selected = match self.state.selected() {
            Some(i) if !self.entries.is_empty() => Some(i.min(self.entries.len() - 1)),
            _ => None,
        };
        self.state.select(selected);
    }

    pub fn mark_unavailable(&mut self) {
        self.status = HistoryStatus::Unavailable;
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| truncate_prompt(&e.user)).collect()
    }

    /// Full prompt of the selected entry, shown as its tooltip.
    pub fn tooltip(&self) -> Option<&str> {
        self.state
            .selected()
            .and_then(|i| self.entries.get(i))
            .map(|e| e.user.as_str())
    }

    /// Full prompt of entry `index`. Nothing is replayable unless the list
    /// on screen is the current one.
    pub fn prompt(&self, index: usize) -> Option<&str> {
        if self.status != HistoryStatus::Ready {
            return None;
        }
        self.entries.get(index).map(|e| e.user.as_str())
    }

    pub fn nav_down(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn nav_up(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.state.select(Some(i));
    }

    /// Map a row inside the list area (borders excluded) to an entry index.
    pub fn index_at_row(&self, row: usize) -> Option<usize> {
        if self.status != HistoryStatus::Ready {
            return None;
        }
        let index = self.state.offset() + row;
        (index < self.entries.len()).then_some(index)
    }
}
