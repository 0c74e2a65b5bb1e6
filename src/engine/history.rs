//! Session history for one top-level window.

use url::Url;

/// One visited page.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: Url,
    pub fragment: Option<String>,
    pub title: Option<String>,
    /// Vertical scroll position as a fraction of the content height, saved
    /// when the user navigates away and restored when they come back.
    pub scroll_fraction: Option<f32>,
}

/// Linear session history with a cursor.
///
/// Navigating to a new page truncates everything after the cursor, so the
/// forward list is implicit in `entries[cursor + 1..]`.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    max_entries: usize,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new visit at the cursor, dropping any forward entries.
    pub fn add(&mut self, url: Url, fragment: Option<String>) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(HistoryEntry {
            url,
            fragment,
            title: None,
            scroll_fraction: None,
        });
        while self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Snapshot the departing page's scroll position into the current entry.
    pub fn update_current_scroll(&mut self, fraction: f32) {
        if let Some(entry) = self.cursor.and_then(|c| self.entries.get_mut(c)) {
            entry.scroll_fraction = Some(fraction.clamp(0.0, 1.0));
        }
    }

    pub fn update_current_title(&mut self, title: &str) {
        if let Some(entry) = self.cursor.and_then(|c| self.entries.get_mut(c)) {
            entry.title = Some(title.to_string());
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor
            .is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Move the cursor back and return the URL to renavigate to.
    pub fn back(&mut self) -> Option<Url> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1).map(|e| e.url.clone())
    }

    /// Move the cursor forward and return the URL to renavigate to.
    pub fn forward(&mut self) -> Option<Url> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        self.entries.get(cursor + 1).map(|e| e.url.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
