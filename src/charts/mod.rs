//! Analytics chart containers
//!
//! Each container owns its own state, so one chart failing to build or
//! having no data never affects the others.

mod network;
pub mod render;
mod stats;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{MovieDetail, VisualizationPayload, WatchHistoryEntry};

pub use network::{layout_network, NetworkLayout};
pub use stats::{
    box_stats, genre_counts, nice_max, parse_week_label, rating_histogram, ticks, year_counts, Bin, BoxStats, RATING_MAX,
};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_HISTORY_MESSAGE: &str = "No movies in watch history yet";
pub const FETCH_ERROR_MESSAGE: &str = "Error loading data. Please try again later.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Link references unknown node: {0}")]
    UnknownNode(String),

    #[error("Unrecognized week label: {0}")]
    BadWeekLabel(String),

    #[error("Malformed data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ChartError {
    fn from(e: serde_json::Error) -> Self {
        ChartError::Malformed(e.to_string())
    }
}

/// Mount points for the aggregate charts, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    Ratings,
    Genres,
    ReleaseYears,
    CreatorsNetwork,
    ViewingPatterns,
    RuntimeDistribution,
}

impl ChartId {
    pub const ALL: [ChartId; 6] = [
        ChartId::Ratings,
        ChartId::Genres,
        ChartId::ReleaseYears,
        ChartId::CreatorsNetwork,
        ChartId::ViewingPatterns,
        ChartId::RuntimeDistribution,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChartId::Ratings => "IMDb Ratings Distribution",
            ChartId::Genres => "Genre Distribution",
            ChartId::ReleaseYears => "Release Year Timeline",
            ChartId::CreatorsNetwork => "Directors & Writers Network",
            ChartId::ViewingPatterns => "Viewing Patterns Over Time",
            ChartId::RuntimeDistribution => "Runtime Distribution by Genre",
        }
    }

    pub fn no_data_message(&self) -> &'static str {
        match self {
            ChartId::Ratings => "No rating data available",
            ChartId::Genres => "No genre data available",
            ChartId::ReleaseYears => "No release year data available",
            ChartId::CreatorsNetwork => "No network data available",
            ChartId::ViewingPatterns => "No viewing pattern data available",
            ChartId::RuntimeDistribution => "No runtime data available",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingsChart {
    pub bins: Vec<Bin>,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountChart<K> {
    pub counts: Vec<(K, usize)>,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewingPatternsChart {
    pub points: Vec<(NaiveDate, u32)>,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeChart {
    pub boxes: Vec<BoxStats>,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Ratings(RatingsChart),
    Genres(CountChart<String>),
    ReleaseYears(CountChart<i32>),
    CreatorsNetwork(NetworkLayout),
    ViewingPatterns(ViewingPatternsChart),
    RuntimeDistribution(RuntimeChart),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Idle,
    Loading,
    /// History is empty; nothing to chart
    NoHistory,
    /// This chart's own dataset is absent or empty
    NoData,
    Failed(String),
    Ready(Chart),
}

impl ChartState {
    fn from_build(result: Result<Option<Chart>, ChartError>) -> Self {
        match result {
            Ok(Some(chart)) => ChartState::Ready(chart),
            Ok(None) => ChartState::NoData,
            Err(e) => ChartState::Failed(format!("Could not draw chart: {}", e)),
        }
    }
}

/// State of every aggregate chart container
#[derive(Debug, Clone)]
pub struct ChartBoard {
    slots: Vec<(ChartId, ChartState)>,
}

impl Default for ChartBoard {
    fn default() -> Self {
        Self { slots: ChartId::ALL.iter().map(|id| (*id, ChartState::Idle)).collect() }
    }
}

impl ChartBoard {
    pub fn get(&self, id: ChartId) -> &ChartState {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == id)
            .map(|(_, state)| state)
            .unwrap_or(&ChartState::Idle)
    }

    pub fn set(&mut self, id: ChartId, state: ChartState) {
        if let Some(slot) = self.slots.iter_mut().find(|(slot, _)| *slot == id) {
            slot.1 = state;
        }
    }

    pub fn set_all(&mut self, state: ChartState) {
        for slot in &mut self.slots {
            slot.1 = state.clone();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChartId, &ChartState)> {
        self.slots.iter().map(|(id, state)| (*id, state))
    }

    /// Charts computed straight from the watch history
    pub fn show_history(&mut self, entries: &[WatchHistoryEntry]) {
        self.set(ChartId::Ratings, ChartState::from_build(build_ratings(entries)));
        self.set(ChartId::Genres, ChartState::from_build(build_genres(entries)));
        self.set(ChartId::ReleaseYears, ChartState::from_build(build_release_years(entries)));
    }

    /// Charts backed by the aggregate payload; absent keys show "no data"
    pub fn show_aggregates(&mut self, payload: &VisualizationPayload) {
        self.set(ChartId::CreatorsNetwork, ChartState::from_build(build_creators_network(payload)));
        self.set(ChartId::ViewingPatterns, ChartState::from_build(build_viewing_patterns(payload)));
        self.set(ChartId::RuntimeDistribution, ChartState::from_build(build_runtime_distribution(payload)));
    }
}

pub fn build_ratings(entries: &[WatchHistoryEntry]) -> Result<Option<Chart>, ChartError> {
    if entries.is_empty() {
        return Ok(None);
    }
    let bins = rating_histogram(entries.iter().filter_map(|e| e.rating));
    let tallest = bins.iter().map(|b| b.count).max().unwrap_or(0);
    Ok(Some(Chart::Ratings(RatingsChart { bins, y_max: nice_max(tallest as f64) })))
}

pub fn build_genres(entries: &[WatchHistoryEntry]) -> Result<Option<Chart>, ChartError> {
    let counts = genre_counts(entries.iter().map(|e| e.genre.as_str()));
    if counts.is_empty() {
        return Ok(None);
    }
    let tallest = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    Ok(Some(Chart::Genres(CountChart { counts, y_max: nice_max(tallest as f64) })))
}

pub fn build_release_years(entries: &[WatchHistoryEntry]) -> Result<Option<Chart>, ChartError> {
    let counts = year_counts(entries.iter().filter_map(|e| e.release_year()));
    if counts.is_empty() {
        return Ok(None);
    }
    let tallest = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    Ok(Some(Chart::ReleaseYears(CountChart { counts, y_max: nice_max(tallest as f64) })))
}

pub fn build_creators_network(payload: &VisualizationPayload) -> Result<Option<Chart>, ChartError> {
    match payload.creators_network()? {
        Some(network) if !network.nodes.is_empty() => {
            Ok(Some(Chart::CreatorsNetwork(layout_network(&network)?)))
        }
        _ => Ok(None),
    }
}

pub fn build_viewing_patterns(payload: &VisualizationPayload) -> Result<Option<Chart>, ChartError> {
    let raw = match payload.viewing_patterns()? {
        Some(points) if !points.is_empty() => points,
        _ => return Ok(None),
    };

    let mut points = Vec::with_capacity(raw.len());
    for point in raw {
        let date = parse_week_label(&point.date).ok_or_else(|| ChartError::BadWeekLabel(point.date.clone()))?;
        points.push((date, point.count));
    }
    points.sort_by_key(|(date, _)| *date);

    let tallest = points.iter().map(|(_, c)| *c).max().unwrap_or(0);
    Ok(Some(Chart::ViewingPatterns(ViewingPatternsChart { points, y_max: nice_max(tallest as f64) })))
}

pub fn build_runtime_distribution(payload: &VisualizationPayload) -> Result<Option<Chart>, ChartError> {
    let Some(by_genre) = payload.runtime_distribution()? else {
        return Ok(None);
    };

    let boxes: Vec<BoxStats> = by_genre
        .iter()
        .filter_map(|(genre, runtimes)| box_stats(genre, runtimes))
        .collect();
    if boxes.is_empty() {
        return Ok(None);
    }

    let longest = boxes.iter().map(|b| b.max).fold(0.0, f64::max);
    Ok(Some(Chart::RuntimeDistribution(RuntimeChart { boxes, y_max: nice_max(longest) })))
}

/// Per-movie charts shown next to the search detail panel
#[derive(Debug, Clone, PartialEq)]
pub struct GlanceCharts {
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub year: Option<i32>,
}

impl GlanceCharts {
    pub fn from_movie(movie: &MovieDetail) -> Self {
        Self {
            rating: movie.rating().map(|r| r.clamp(0.0, RATING_MAX)),
            genres: movie.genres().into_iter().map(str::to_string).collect(),
            year: movie.release_year(),
        }
    }
}
