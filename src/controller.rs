//! View state and the controller that drives it
//!
//! Every backend call runs off the UI thread and reports back through a
//! `TaskResult` channel that `pump()` drains once per frame. Each fetch
//! category carries a generation number so a late answer to a superseded
//! request is dropped instead of overwriting newer state.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::api::{ApiError, MovieApi, SearchOutcome};
use crate::charts::{ChartBoard, ChartState, GlanceCharts, FETCH_ERROR_MESSAGE};
use crate::config::AppConfig;
use crate::console::ConsoleLog;
use crate::history::{HistoryStore, LOAD_ERROR_MESSAGE};
use crate::models::{MovieDetail, SearchResultItem, Tab, VisualizationPayload, WatchHistoryEntry, WatchRequest};
use crate::sync::{Debouncer, FetchKind, RequestGenerations, RESIZE_DEBOUNCE};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search term";
pub const NO_RESULTS_MESSAGE: &str = "No results found";
pub const NO_MOVIE_ALERT: &str = "Please select a movie first";
pub const NO_DATE_ALERT: &str = "Please select a watch date";
pub const BAD_DATE_ALERT: &str = "Please enter the watch date as YYYY-MM-DD";
pub const ADDED_ALERT: &str = "Movie added to watch history successfully!";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    /// Submitted with an empty query
    Prompt,
    Searching,
    Results(Vec<SearchResultItem>),
    NoResults,
    /// Backend answered with an error field
    Rejected(String),
    Failed(String),
}

impl SearchStatus {
    /// Inline message for the results area, if any
    pub fn message(&self) -> Option<String> {
        match self {
            SearchStatus::Prompt => Some(EMPTY_QUERY_MESSAGE.to_string()),
            SearchStatus::NoResults => Some(NO_RESULTS_MESSAGE.to_string()),
            SearchStatus::Rejected(e) => Some(format!("Error: {}", e)),
            SearchStatus::Failed(e) => Some(format!("Error fetching results: {}", e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchView {
    pub query: String,
    pub status: SearchStatus,
}

impl Default for SearchView {
    fn default() -> Self {
        Self { query: String::new(), status: SearchStatus::Idle }
    }
}

/// Inline detail panel of the search flow
#[derive(Debug, Clone, Default)]
pub struct DetailPanel {
    /// The movie an "add to history" action would submit
    pub current: Option<MovieDetail>,
    pub glance: Option<GlanceCharts>,
    pub visible: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub submitting: bool,
}

/// History flow modal; `entry` is the current history entry
#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub entry: Option<WatchHistoryEntry>,
    pub confirm_delete: bool,
    pub deleting: bool,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        self.entry.is_some()
    }
}

/// Ways the modal can be closed; all lead to the same hidden state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CloseButton,
    FooterButton,
    Backdrop,
}

/// Everything the UI renders from
#[derive(Debug, Clone)]
pub struct ViewState {
    pub active_tab: Tab,
    pub search: SearchView,
    pub detail: DetailPanel,
    pub watch_date_input: String,
    pub history: HistoryStore,
    pub modal: ModalState,
    pub charts: ChartBoard,
    pub alert: Option<String>,
    pub status: String,
    pub console: ConsoleLog,
}

impl ViewState {
    pub fn new(active_tab: Tab) -> Self {
        Self {
            active_tab,
            search: SearchView::default(),
            detail: DetailPanel::default(),
            watch_date_input: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            history: HistoryStore::default(),
            modal: ModalState::default(),
            charts: ChartBoard::default(),
            alert: None,
            status: "Ready".to_string(),
            console: ConsoleLog::default(),
        }
    }
}

/// Results of background work
#[derive(Debug)]
pub enum TaskResult {
    SearchFinished {
        generation: u64,
        query: String,
        result: Result<SearchOutcome, ApiError>,
    },
    DetailLoaded {
        generation: u64,
        result: Result<MovieDetail, ApiError>,
    },
    WatchAdded {
        submitted: MovieDetail,
        result: Result<(), ApiError>,
    },
    HistoryLoaded {
        generation: u64,
        result: Result<Vec<WatchHistoryEntry>, ApiError>,
    },
    EntryDeleted {
        id: String,
        title: String,
        result: Result<(), ApiError>,
    },
    /// First analytics stage: the full history list
    AnalyticsHistory {
        generation: u64,
        result: Result<Vec<WatchHistoryEntry>, ApiError>,
    },
    /// Second analytics stage: the aggregate payload
    AnalyticsAggregates {
        generation: u64,
        result: Result<VisualizationPayload, ApiError>,
    },
}

/// How background jobs run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSpawner {
    /// One thread per request
    Threaded,
    /// Run on the caller's thread; results still queue on the channel
    Inline,
}

impl TaskSpawner {
    fn spawn<F>(&self, sender: Sender<TaskResult>, job: F)
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        match self {
            TaskSpawner::Threaded => {
                thread::spawn(move || {
                    let _ = sender.send(job());
                });
            }
            TaskSpawner::Inline => {
                let _ = sender.send(job());
            }
        }
    }
}

pub struct Controller {
    pub view: ViewState,
    api: Arc<dyn MovieApi>,
    spawner: TaskSpawner,
    task_sender: Sender<TaskResult>,
    task_receiver: Receiver<TaskResult>,
    generations: RequestGenerations,
    in_flight: usize,
    resize: Debouncer,
}

impl Controller {
    pub fn new(api: Arc<dyn MovieApi>, spawner: TaskSpawner, view: ViewState) -> Self {
        let (task_sender, task_receiver) = channel();
        Self {
            view,
            api,
            spawner,
            task_sender,
            task_receiver,
            generations: RequestGenerations::default(),
            in_flight: 0,
            resize: Debouncer::new(RESIZE_DEBOUNCE),
        }
    }

    /// Requests dispatched but not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Time until a pending resize refresh fires
    pub fn resize_remaining(&self, now: Instant) -> Option<Duration> {
        self.resize.remaining(now)
    }

    /// Run `call` in the background and report its outcome through `finish`.
    /// A call that panics is reported as a failed request.
    fn spawn<T, C, W>(&mut self, call: C, finish: W)
    where
        C: FnOnce(&dyn MovieApi) -> Result<T, ApiError> + Send + 'static,
        W: FnOnce(Result<T, ApiError>) -> TaskResult + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        self.in_flight += 1;
        self.spawner.spawn(self.task_sender.clone(), move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| call(api.as_ref())))
                .unwrap_or_else(|payload| Err(ApiError::Transport(panic_message(payload.as_ref()))));
            finish(result)
        });
    }

    /// Swap in a client built from new settings
    pub fn apply_config(&mut self, config: &AppConfig, api: Arc<dyn MovieApi>) {
        self.api = api;
        self.view.console.info(&format!("Backend set to {}", config.base_url()));
        self.view.status = format!("Backend: {}", config.base_url());
    }

    pub fn activate_tab(&mut self, tab: Tab) {
        self.view.active_tab = tab;
        match tab {
            Tab::History => self.load_history(),
            Tab::Analytics => self.refresh_visualizations(),
            Tab::Search | Tab::Console => {}
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.view.alert = None;
    }

    fn alert(&mut self, message: String) {
        self.view.alert = Some(message);
    }

    // ---- Search flow ----

    pub fn search(&mut self, query: &str) {
        let query = query.trim().to_string();
        if query.is_empty() {
            self.view.search.status = SearchStatus::Prompt;
            return;
        }

        let generation = self.generations.next(FetchKind::Search);
        self.view.search.status = SearchStatus::Searching;
        self.view.status = format!("Searching for \"{}\"...", query);
        self.view.console.info(&format!("Searching for \"{}\"", query));

        let sent = query.clone();
        self.spawn(
            move |api| api.search(&sent),
            move |result| TaskResult::SearchFinished { generation, query, result },
        );
    }

    pub fn select_result(&mut self, id: &str) {
        let generation = self.generations.next(FetchKind::Detail);
        self.view.detail.loading = true;
        self.view.detail.error = None;
        self.view.console.info(&format!("Loading details for {}", id));

        let id = id.to_string();
        self.spawn(
            move |api| api.movie_detail(&id),
            move |result| TaskResult::DetailLoaded { generation, result },
        );
    }

    pub fn add_to_watch_history(&mut self) {
        let Some(movie) = self.view.detail.current.clone() else {
            self.alert(NO_MOVIE_ALERT.to_string());
            return;
        };
        let watch_date = self.view.watch_date_input.trim().to_string();
        if watch_date.is_empty() {
            self.alert(NO_DATE_ALERT.to_string());
            return;
        }
        if NaiveDate::parse_from_str(&watch_date, "%Y-%m-%d").is_err() {
            self.alert(BAD_DATE_ALERT.to_string());
            return;
        }

        self.view.detail.submitting = true;
        self.view.console.info(&format!("Adding \"{}\" watched on {}", movie.title, watch_date));
        let request = WatchRequest { watch_date, movie_data: movie.clone() };
        self.spawn(
            move |api| api.add_watched(&request),
            move |result| TaskResult::WatchAdded { submitted: movie, result },
        );
    }

    // ---- History flow ----

    pub fn load_history(&mut self) {
        let generation = self.generations.next(FetchKind::History);
        self.view.history.mark_loading();
        self.view.console.info("Loading watch history");
        self.spawn(
            |api| api.watched_movies(),
            move |result| TaskResult::HistoryLoaded { generation, result },
        );
    }

    pub fn set_history_search(&mut self, text: &str) {
        self.view.history.set_search_text(text);
    }

    pub fn select_genre(&mut self, genre: Option<String>) {
        if !self.view.history.select_genre(genre.clone()) {
            self.view.console.warn(&format!("Ignoring unknown genre filter {:?}", genre));
        }
    }

    pub fn select_year(&mut self, year: Option<String>) {
        if !self.view.history.select_year(year.clone()) {
            self.view.console.warn(&format!("Ignoring unknown year filter {:?}", year));
        }
    }

    pub fn clear_filters(&mut self) {
        self.view.history.clear_filters();
    }

    pub fn open_entry(&mut self, id: &str) {
        match self.view.history.find(id) {
            Some(entry) => {
                self.view.modal = ModalState { entry: Some(entry.clone()), ..Default::default() };
            }
            None => self.view.console.warn(&format!("No history entry with id {}", id)),
        }
    }

    pub fn dismiss_modal(&mut self, trigger: DismissTrigger) {
        if self.view.modal.is_open() {
            log::debug!("Modal dismissed via {:?}", trigger);
            self.view.modal = ModalState::default();
        }
    }

    /// Ask for confirmation before deleting the open entry
    pub fn request_delete(&mut self) {
        if self.view.modal.is_open() && !self.view.modal.deleting {
            self.view.modal.confirm_delete = true;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.view.modal.confirm_delete = false;
    }

    pub fn confirm_delete(&mut self) {
        self.view.modal.confirm_delete = false;
        let Some(entry) = self.view.modal.entry.clone() else {
            return;
        };

        self.view.modal.deleting = true;
        self.view.console.info(&format!("Deleting \"{}\" (id {})", entry.title, entry.id));
        let id = entry.id.clone();
        self.spawn(
            move |api| api.delete_watched(&id),
            move |result| TaskResult::EntryDeleted { id: entry.id, title: entry.title, result },
        );
    }

    // ---- Analytics ----

    /// Mark every container loading, then fetch history and aggregates
    pub fn refresh_visualizations(&mut self) {
        let generation = self.generations.next(FetchKind::Analytics);
        self.view.charts.set_all(ChartState::Loading);
        self.view.console.info("Refreshing visualizations");
        self.spawn(
            |api| api.watched_movies(),
            move |result| TaskResult::AnalyticsHistory { generation, result },
        );
    }

    pub fn on_viewport_resized(&mut self, now: Instant) {
        self.resize.trigger(now);
    }

    /// Fires the debounced refresh once a resize burst has settled
    pub fn tick(&mut self, now: Instant) {
        if self.resize.poll(now) && self.view.active_tab == Tab::Analytics {
            self.view.console.info("Viewport resized, redrawing charts");
            self.refresh_visualizations();
        }
    }

    // ---- Result handling ----

    /// Apply all finished background work; returns true if anything arrived
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.task_receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.handle(result);
            changed = true;
        }
        if changed && self.in_flight == 0 {
            self.view.status = "Ready".to_string();
        }
        changed
    }

    fn is_stale(&mut self, kind: FetchKind, generation: u64) -> bool {
        if self.generations.is_current(kind, generation) {
            return false;
        }
        self.view.console.warn(&format!("Dropping stale {:?} response (generation {})", kind, generation));
        true
    }

    fn handle(&mut self, result: TaskResult) {
        match result {
            TaskResult::SearchFinished { generation, query, result } => {
                if self.is_stale(FetchKind::Search, generation) {
                    return;
                }
                self.view.search.status = match result {
                    Ok(SearchOutcome::Results(items)) => {
                        self.view.console.info(&format!("Found {} results for \"{}\"", items.len(), query));
                        SearchStatus::Results(items)
                    }
                    Ok(SearchOutcome::NoResults) => {
                        self.view.console.info(&format!("No results for \"{}\"", query));
                        SearchStatus::NoResults
                    }
                    Ok(SearchOutcome::Rejected(e)) => {
                        self.view.console.warn(&format!("Search rejected: {}", e));
                        SearchStatus::Rejected(e)
                    }
                    Err(e) => {
                        self.view.console.error(&format!("Search failed: {}", e));
                        SearchStatus::Failed(e.to_string())
                    }
                };
            }

            TaskResult::DetailLoaded { generation, result } => {
                if self.is_stale(FetchKind::Detail, generation) {
                    return;
                }
                let detail = &mut self.view.detail;
                detail.loading = false;
                match result {
                    Ok(movie) => {
                        self.view.console.info(&format!("Loaded details for \"{}\"", movie.title));
                        detail.glance = Some(GlanceCharts::from_movie(&movie));
                        detail.current = Some(movie);
                        detail.visible = true;
                        detail.error = None;
                    }
                    Err(e) => {
                        detail.error = Some(format!("Error loading movie details: {}", e));
                        self.view.console.error(&format!("Movie details failed: {}", e));
                    }
                }
            }

            TaskResult::WatchAdded { submitted, result } => {
                self.view.detail.submitting = false;
                match result {
                    Ok(()) => {
                        self.view.console.info(&format!("Added \"{}\" to watch history", submitted.title));
                        self.alert(ADDED_ALERT.to_string());
                        // Only clear if the user has not picked another movie meanwhile
                        if self.view.detail.current.as_ref() == Some(&submitted) {
                            self.view.detail = DetailPanel::default();
                        }
                        if self.view.active_tab == Tab::History {
                            self.load_history();
                        }
                    }
                    Err(e) => {
                        self.view.console.error(&format!("Adding \"{}\" failed: {}", submitted.title, e));
                        self.alert(format!("Error adding movie to watch history: {}", e));
                    }
                }
            }

            TaskResult::HistoryLoaded { generation, result } => {
                if self.is_stale(FetchKind::History, generation) {
                    return;
                }
                match result {
                    Ok(entries) => {
                        self.view.console.info(&format!("Loaded {} history entries", entries.len()));
                        self.view.history.replace(entries);
                    }
                    Err(e) => {
                        self.view.console.error(&format!("Watch history failed: {}", e));
                        self.view.history.mark_failed(LOAD_ERROR_MESSAGE);
                    }
                }
            }

            TaskResult::EntryDeleted { id, title, result } => {
                let still_open = self.view.modal.entry.as_ref().is_some_and(|e| e.id == id);
                match result {
                    Ok(()) => {
                        self.view.console.info(&format!("Deleted \"{}\"", title));
                        if still_open {
                            self.view.modal = ModalState::default();
                        }
                        self.load_history();
                    }
                    Err(e) => {
                        self.view.console.error(&format!("Deleting \"{}\" failed: {}", title, e));
                        if still_open {
                            self.view.modal.deleting = false;
                        }
                        self.alert(format!("Error deleting movie: {}", e));
                    }
                }
            }

            TaskResult::AnalyticsHistory { generation, result } => {
                if self.is_stale(FetchKind::Analytics, generation) {
                    return;
                }
                match result {
                    Ok(entries) if entries.is_empty() => {
                        self.view.console.info("No history to visualize");
                        self.view.charts.set_all(ChartState::NoHistory);
                    }
                    Ok(entries) => {
                        self.view.charts.show_history(&entries);
                        self.spawn(
                            |api| api.visualization_data(),
                            move |result| TaskResult::AnalyticsAggregates { generation, result },
                        );
                    }
                    Err(e) => self.analytics_failed(&e),
                }
            }

            TaskResult::AnalyticsAggregates { generation, result } => {
                if self.is_stale(FetchKind::Analytics, generation) {
                    return;
                }
                match result {
                    Ok(payload) => {
                        self.view.charts.show_aggregates(&payload);
                        for (id, state) in self.view.charts.iter() {
                            if let ChartState::Failed(msg) = state {
                                log::warn!("{}: {}", id.title(), msg);
                            }
                        }
                        self.view.console.info("Visualizations updated");
                    }
                    Err(e) => self.analytics_failed(&e),
                }
            }
        }
    }

    fn analytics_failed(&mut self, e: &ApiError) {
        self.view.console.error(&format!("Visualization data failed: {}", e));
        self.view.charts.set_all(ChartState::Failed(FETCH_ERROR_MESSAGE.to_string()));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("background task panicked: {}", detail)
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
