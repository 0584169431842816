//! Watch history store and filter engine
//!
//! The store owns the last fetched history list. Filter options are always
//! derived from that list, and the filtered view is recomputed from scratch
//! on every change; entries themselves are never edited locally.

use std::collections::BTreeSet;

use crate::models::{parse_year, WatchHistoryEntry};

pub const ALL_GENRES: &str = "All Genres";
pub const ALL_YEARS: &str = "All Years";
pub const EMPTY_HISTORY_MESSAGE: &str = "No movies in history";
pub const NO_MATCHES_MESSAGE: &str = "No movies match your filters";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading watch history. Please try again later.";

/// Current search text plus optional genre and year selections.
/// `None` means "no filter" for genre and year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    pub genre: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryStatus {
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

/// What the history list should show
#[derive(Debug, PartialEq)]
pub enum HistoryView<'a> {
    Empty,
    NoMatches,
    Entries(Vec<&'a WatchHistoryEntry>),
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<WatchHistoryEntry>,
    genre_options: Vec<String>,
    year_options: Vec<String>,
    filter: FilterState,
    status: HistoryStatus,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            genre_options: Vec::new(),
            year_options: Vec::new(),
            filter: FilterState::default(),
            status: HistoryStatus::NotLoaded,
        }
    }
}

impl HistoryStore {
    pub fn entries(&self) -> &[WatchHistoryEntry] {
        &self.entries
    }

    pub fn status(&self) -> &HistoryStatus {
        &self.status
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn genre_options(&self) -> &[String] {
        &self.genre_options
    }

    pub fn year_options(&self) -> &[String] {
        &self.year_options
    }

    pub fn find(&self, id: &str) -> Option<&WatchHistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn mark_loading(&mut self) {
        self.status = HistoryStatus::Loading;
    }

    pub fn mark_failed(&mut self, message: &str) {
        self.status = HistoryStatus::Failed(message.to_string());
    }

    /// Swap in a freshly fetched list, re-derive the option sets and drop
    /// selections that are no longer offered.
    pub fn replace(&mut self, entries: Vec<WatchHistoryEntry>) {
        self.genre_options = derive_genre_options(&entries);
        self.year_options = derive_year_options(&entries);
        self.entries = entries;
        self.status = HistoryStatus::Loaded;

        if let Some(genre) = &self.filter.genre {
            if !self.genre_options.contains(genre) {
                self.filter.genre = None;
            }
        }
        if let Some(year) = &self.filter.year {
            if !self.year_options.contains(year) {
                self.filter.year = None;
            }
        }
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.filter.search_text = text.to_string();
    }

    /// Select a genre; values outside the current option set are refused.
    pub fn select_genre(&mut self, genre: Option<String>) -> bool {
        match genre {
            Some(g) if !self.genre_options.contains(&g) => false,
            other => {
                self.filter.genre = other;
                true
            }
        }
    }

    /// Select a year; values outside the current option set are refused.
    pub fn select_year(&mut self, year: Option<String>) -> bool {
        match year {
            Some(y) if !self.year_options.contains(&y) => false,
            other => {
                self.filter.year = other;
                true
            }
        }
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
    }

    pub fn filtered(&self) -> Vec<&WatchHistoryEntry> {
        apply_filters(&self.entries, &self.filter)
    }

    pub fn view(&self) -> HistoryView<'_> {
        if self.entries.is_empty() {
            return HistoryView::Empty;
        }
        let matches = self.filtered();
        if matches.is_empty() {
            HistoryView::NoMatches
        } else {
            HistoryView::Entries(matches)
        }
    }
}

/// Entries matching every active predicate, in dataset order.
///
/// Title matching is a case-insensitive substring test; genre must be an
/// exact token of the entry's genre list; year must equal the trimmed year.
pub fn apply_filters<'a>(entries: &'a [WatchHistoryEntry], state: &FilterState) -> Vec<&'a WatchHistoryEntry> {
    let needle = state.search_text.to_lowercase();
    entries
        .iter()
        .filter(|e| needle.is_empty() || e.title.to_lowercase().contains(&needle))
        .filter(|e| match &state.genre {
            Some(genre) => e.genres().iter().any(|g| *g == genre.as_str()),
            None => true,
        })
        .filter(|e| match &state.year {
            Some(year) => e.year.trim() == year.as_str(),
            None => true,
        })
        .collect()
}

/// Distinct genre tokens, alphabetical
pub fn derive_genre_options(entries: &[WatchHistoryEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.genres())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct years, newest first; unparseable years sort after the rest
pub fn derive_year_options(entries: &[WatchHistoryEntry]) -> Vec<String> {
    let mut years: Vec<String> = entries
        .iter()
        .map(|e| e.year.trim())
        .filter(|y| !y.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    years.sort_by(|a, b| match (parse_year(a), parse_year(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });
    years
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
