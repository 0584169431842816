//! Main window: tabs, panels and dialogs over the controller's view state

use eframe::egui;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::HttpMovieApi;
use crate::charts::render::{show_chart_slot, show_glance_charts};
use crate::config::AppConfig;
use crate::controller::{Controller, DismissTrigger, SearchStatus, TaskSpawner, ViewState};
use crate::history::{HistoryStatus, HistoryView, ALL_GENRES, ALL_YEARS, EMPTY_HISTORY_MESSAGE, NO_MATCHES_MESSAGE};
use crate::models::*;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 80, 80);
const ACCENT_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 149, 237);

pub struct MovieTrackerApp {
    config: AppConfig,
    controller: Controller,
    show_settings: bool,
    settings_draft: AppConfig,
    last_viewport: Option<egui::Vec2>,
    applied_font_size: Option<u32>,
}

impl MovieTrackerApp {
    pub fn new(config: AppConfig) -> Self {
        let api = Arc::new(HttpMovieApi::new(&config));
        let start_tab = config.last_tab;
        let mut controller = Controller::new(api, TaskSpawner::Threaded, ViewState::new(start_tab));
        controller.view.console.info(&format!("Backend: {}", config.base_url()));
        controller.activate_tab(start_tab);

        Self {
            settings_draft: config.clone(),
            config,
            controller,
            show_settings: false,
            last_viewport: None,
            applied_font_size: None,
        }
    }

    fn apply_style(&mut self, ctx: &egui::Context) {
        if self.config.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        if self.applied_font_size != Some(self.config.font_size) {
            let base = self.config.font_size as f32;
            ctx.style_mut(|style| {
                for (text_style, font) in style.text_styles.iter_mut() {
                    font.size = match text_style {
                        egui::TextStyle::Heading => base + 6.0,
                        egui::TextStyle::Small => (base - 4.0).max(8.0),
                        _ => base,
                    };
                }
            });
            self.applied_font_size = Some(self.config.font_size);
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.controller.view.active_tab == tab {
            return;
        }
        self.controller.activate_tab(tab);
        self.config.last_tab = tab;
        self.config.save();
    }

    /// Debounced analytics refresh when the window size changes
    fn watch_viewport(&mut self, ctx: &egui::Context) {
        let size = ctx.input(|i| i.viewport().inner_rect).map(|r| r.size());
        if let Some(size) = size {
            if self.last_viewport.is_some_and(|last| last != size) {
                self.controller.on_viewport_resized(Instant::now());
            }
            self.last_viewport = Some(size);
        }
        self.controller.tick(Instant::now());
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.heading("🎬 Movie Tracker");
                ui.add_space(20.0);

                let mut selected = self.controller.view.active_tab;
                for tab in Tab::ALL {
                    ui.selectable_value(&mut selected, tab, tab.label());
                }
                self.switch_tab(selected);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.settings_draft = self.config.clone();
                        self.show_settings = true;
                    }
                });
            });
            ui.add_space(5.0);
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.controller.in_flight() > 0 {
                    ui.spinner();
                }
                ui.label(&self.controller.view.status);
            });
        });
    }

    // ---- Search tab ----

    fn show_search_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.controller.view.search.query)
                    .hint_text("Search for a movie...")
                    .desired_width(400.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("🔍 Search").clicked() || submitted {
                let query = self.controller.view.search.query.clone();
                self.controller.search(&query);
            }
        });
        ui.separator();

        ui.columns(2, |columns| {
            egui::ScrollArea::vertical()
                .id_salt("search_results")
                .auto_shrink([false, false])
                .show(&mut columns[0], |ui| self.show_search_results(ui));
            egui::ScrollArea::vertical()
                .id_salt("movie_detail")
                .auto_shrink([false, false])
                .show(&mut columns[1], |ui| self.show_detail_panel(ui));
        });
    }

    fn show_search_results(&mut self, ui: &mut egui::Ui) {
        let mut selected: Option<String> = None;

        match &self.controller.view.search.status {
            SearchStatus::Idle => {
                ui.label(egui::RichText::new("Search results will appear here").weak());
            }
            SearchStatus::Searching => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Searching...");
                });
            }
            SearchStatus::Results(items) => {
                for item in items {
                    let card = egui::Frame::group(ui.style())
                        .inner_margin(egui::Margin::same(8))
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            ui.label(egui::RichText::new(format!("{} ({})", item.title, item.year)).strong());
                            ui.label(format!("Type: {}", item.media_type));
                        })
                        .response
                        .interact(egui::Sense::click())
                        .on_hover_cursor(egui::CursorIcon::PointingHand);
                    if card.clicked() {
                        selected = Some(item.external_id.clone());
                    }
                    ui.add_space(4.0);
                }
            }
            status => {
                if let Some(message) = status.message() {
                    let color = match status {
                        SearchStatus::Failed(_) | SearchStatus::Rejected(_) => ERROR_COLOR,
                        _ => ui.visuals().text_color(),
                    };
                    ui.label(egui::RichText::new(message).color(color));
                }
            }
        }

        if let Some(id) = selected {
            self.controller.select_result(&id);
        }
    }

    fn show_detail_panel(&mut self, ui: &mut egui::Ui) {
        let detail = &self.controller.view.detail;
        if detail.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading details...");
            });
        }
        if let Some(error) = &detail.error {
            ui.label(egui::RichText::new(error).color(ERROR_COLOR));
        }

        if let (true, Some(movie)) = (detail.visible, &detail.current) {
            ui.heading(&movie.title);
            ui.add_space(4.0);
            egui::Grid::new("movie_detail_fields").num_columns(2).spacing([12.0, 4.0]).show(ui, |ui| {
                for (label, value) in [
                    ("Year", &movie.year),
                    ("Director", &movie.director),
                    ("Cast", &movie.actors),
                    ("Genre", &movie.genre),
                    ("Runtime", &movie.runtime),
                    ("IMDb Rating", &movie.imdb_rating),
                ] {
                    ui.label(egui::RichText::new(format!("{}:", label)).strong());
                    ui.label(display_or_placeholder(value));
                    ui.end_row();
                }
            });
            ui.label(egui::RichText::new("Plot:").strong());
            ui.label(display_or_placeholder(&movie.plot));

            if let Some(glance) = &detail.glance {
                ui.add_space(8.0);
                show_glance_charts(ui, glance);
            }
            ui.separator();
        }

        let submitting = detail.submitting;
        ui.horizontal(|ui| {
            ui.label("Watch date:");
            ui.add(
                egui::TextEdit::singleline(&mut self.controller.view.watch_date_input)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(110.0),
            );
            if ui.add_enabled(!submitting, egui::Button::new("➕ Add to Watch History")).clicked() {
                self.controller.add_to_watch_history();
            }
            if submitting {
                ui.spinner();
            }
        });
    }

    // ---- History tab ----

    fn show_history_tab(&mut self, ui: &mut egui::Ui) {
        let filter = self.controller.view.history.filter().clone();
        let mut search_text = filter.search_text.clone();
        let mut genre_choice: Option<Option<String>> = None;
        let mut year_choice: Option<Option<String>> = None;

        ui.horizontal(|ui| {
            if ui
                .add(egui::TextEdit::singleline(&mut search_text).hint_text("Filter by title...").desired_width(250.0))
                .changed()
            {
                self.controller.set_history_search(&search_text);
            }

            egui::ComboBox::from_id_salt("genre_filter")
                .selected_text(filter.genre.as_deref().unwrap_or(ALL_GENRES))
                .show_ui(ui, |ui| {
                    if ui.selectable_label(filter.genre.is_none(), ALL_GENRES).clicked() {
                        genre_choice = Some(None);
                    }
                    for genre in self.controller.view.history.genre_options() {
                        if ui.selectable_label(filter.genre.as_ref() == Some(genre), genre).clicked() {
                            genre_choice = Some(Some(genre.clone()));
                        }
                    }
                });

            egui::ComboBox::from_id_salt("year_filter")
                .selected_text(filter.year.as_deref().unwrap_or(ALL_YEARS))
                .show_ui(ui, |ui| {
                    if ui.selectable_label(filter.year.is_none(), ALL_YEARS).clicked() {
                        year_choice = Some(None);
                    }
                    for year in self.controller.view.history.year_options() {
                        if ui.selectable_label(filter.year.as_ref() == Some(year), year).clicked() {
                            year_choice = Some(Some(year.clone()));
                        }
                    }
                });

            if ui.button("✖ Clear").clicked() {
                self.controller.clear_filters();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🔄 Refresh").clicked() {
                    self.controller.load_history();
                }
            });
        });

        if let Some(genre) = genre_choice {
            self.controller.select_genre(genre);
        }
        if let Some(year) = year_choice {
            self.controller.select_year(year);
        }
        ui.separator();

        let mut opened: Option<String> = None;
        egui::ScrollArea::vertical()
            .id_salt("history_list")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let history = &self.controller.view.history;
                match history.status() {
                    HistoryStatus::Loading if history.entries().is_empty() => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Loading...");
                        });
                        return;
                    }
                    HistoryStatus::Failed(message) => {
                        ui.label(egui::RichText::new(message).color(ERROR_COLOR));
                        return;
                    }
                    HistoryStatus::NotLoaded => {
                        ui.label(egui::RichText::new("Press Refresh to load your watch history").weak());
                        return;
                    }
                    _ => {}
                }

                match history.view() {
                    HistoryView::Empty => {
                        ui.label(EMPTY_HISTORY_MESSAGE);
                    }
                    HistoryView::NoMatches => {
                        ui.label(NO_MATCHES_MESSAGE);
                    }
                    HistoryView::Entries(entries) => {
                        for entry in entries {
                            let card = egui::Frame::group(ui.style())
                                .inner_margin(egui::Margin::same(8))
                                .show(ui, |ui| {
                                    ui.set_min_width(ui.available_width());
                                    ui.label(egui::RichText::new(format!("{} ({})", entry.title, entry.year)).strong());
                                    ui.label(format!("Watched on: {}", entry.watch_date_label()));
                                    ui.horizontal(|ui| {
                                        ui.label(format!("Rating: {}", entry.rating_label()));
                                        ui.label(format!("Runtime: {}", entry.runtime_label()));
                                    });
                                    if !entry.genre.is_empty() {
                                        ui.label(egui::RichText::new(&entry.genre).small().color(ACCENT_COLOR));
                                    }
                                })
                                .response
                                .interact(egui::Sense::click())
                                .on_hover_cursor(egui::CursorIcon::PointingHand);
                            if card.clicked() {
                                opened = Some(entry.id.clone());
                            }
                            ui.add_space(4.0);
                        }
                    }
                }
            });

        if let Some(id) = opened {
            self.controller.open_entry(&id);
        }
    }

    fn show_entry_modal(&mut self, ctx: &egui::Context) {
        let Some(entry) = self.controller.view.modal.entry.clone() else {
            return;
        };
        let deleting = self.controller.view.modal.deleting;
        let mut trigger: Option<DismissTrigger> = None;
        let mut delete_clicked = false;

        let modal = egui::Modal::new(egui::Id::new("history_entry_modal")).show(ctx, |ui| {
            ui.set_width(520.0);
            ui.horizontal(|ui| {
                ui.heading(format!("{} ({})", entry.title, entry.year));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        trigger = Some(DismissTrigger::CloseButton);
                    }
                });
            });
            ui.separator();

            match entry.poster_url.as_deref().filter(|url| !is_missing(url)) {
                Some(url) => {
                    ui.hyperlink_to("🖼 View poster", url);
                }
                None => {
                    ui.label(egui::RichText::new(POSTER_PLACEHOLDER).weak());
                }
            }
            ui.add_space(4.0);

            egui::Grid::new("entry_fields").num_columns(2).spacing([12.0, 4.0]).striped(true).show(ui, |ui| {
                let rows = [
                    ("Watched on", entry.watch_date_label()),
                    ("Rating", entry.rating_label()),
                    ("Runtime", entry.runtime_label()),
                    ("Genre", display_or_placeholder(&entry.genre).to_string()),
                    ("Director", display_optional(entry.director.as_deref()).to_string()),
                    ("Writers", display_optional(entry.writers.as_deref()).to_string()),
                    ("Actors", display_optional(entry.actors.as_deref()).to_string()),
                ];
                for (label, value) in rows {
                    ui.label(egui::RichText::new(format!("{}:", label)).strong());
                    ui.label(value);
                    ui.end_row();
                }
            });
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Plot:").strong());
            ui.label(display_optional(entry.plot.as_deref()));

            ui.separator();
            ui.horizontal(|ui| {
                let delete = egui::Button::new(egui::RichText::new("🗑 Delete").color(ERROR_COLOR));
                if ui.add_enabled(!deleting, delete).clicked() {
                    delete_clicked = true;
                }
                if deleting {
                    ui.spinner();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        trigger = Some(DismissTrigger::FooterButton);
                    }
                });
            });
        });

        // Clicks outside the content land on the backdrop
        let blocked = self.controller.view.modal.confirm_delete || self.controller.view.alert.is_some();
        if modal.backdrop_response.clicked() && !blocked {
            trigger = Some(DismissTrigger::Backdrop);
        }

        if delete_clicked {
            self.controller.request_delete();
        }
        if let Some(trigger) = trigger {
            self.controller.dismiss_modal(trigger);
        }
    }

    fn show_delete_confirm(&mut self, ctx: &egui::Context) {
        if !self.controller.view.modal.confirm_delete {
            return;
        }
        let title = self.controller.view.modal.entry.as_ref().map(|e| e.title.clone()).unwrap_or_default();
        let mut confirmed = false;
        let mut cancelled = false;

        egui::Modal::new(egui::Id::new("delete_confirm")).show(ctx, |ui| {
            ui.set_width(360.0);
            ui.label(egui::RichText::new("⚠ Delete from watch history").strong());
            ui.add_space(10.0);
            ui.label(format!("Are you sure you want to delete \"{}\" from your watch history?", title));
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(egui::RichText::new("Delete").color(ERROR_COLOR)).clicked() {
                        confirmed = true;
                    }
                });
            });
        });

        if confirmed {
            self.controller.confirm_delete();
        } else if cancelled {
            self.controller.cancel_delete();
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.controller.view.alert.clone() else {
            return;
        };
        let mut dismissed = false;

        egui::Modal::new(egui::Id::new("alert")).show(ctx, |ui| {
            ui.set_max_width(400.0);
            ui.label(&message);
            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.controller.dismiss_alert();
        }
    }

    // ---- Analytics tab ----

    fn show_analytics_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Watch History Analytics");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🔄 Refresh").clicked() {
                    self.controller.refresh_visualizations();
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("analytics")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (id, state) in self.controller.view.charts.iter() {
                    show_chart_slot(ui, id, state);
                    ui.add_space(8.0);
                }
            });
    }

    // ---- Console tab ----

    fn show_console_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.controller.view.console.clear();
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in self.controller.view.console.lines() {
                    let color = if line.contains("[ERROR]") {
                        egui::Color32::RED
                    } else if line.contains("[WARN]") {
                        egui::Color32::YELLOW
                    } else if line.contains("[INFO]") {
                        egui::Color32::LIGHT_BLUE
                    } else {
                        egui::Color32::GRAY
                    };
                    ui.label(egui::RichText::new(line).monospace().color(color));
                }
            });
    }

    // ---- Settings ----

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }
        let mut open = true;
        let mut save = false;

        egui::Window::new("⚙ Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let draft = &mut self.settings_draft;
                egui::Grid::new("settings_grid").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                    ui.label("Backend URL:");
                    ui.add(egui::TextEdit::singleline(&mut draft.backend_url).desired_width(260.0));
                    ui.end_row();

                    ui.label("Request timeout (s):");
                    ui.add(egui::DragValue::new(&mut draft.request_timeout_secs).range(1..=300));
                    ui.end_row();

                    ui.label("Connect timeout (s):");
                    ui.add(egui::DragValue::new(&mut draft.connect_timeout_secs).range(1..=120));
                    ui.end_row();

                    ui.label("User Agent:");
                    ui.add(egui::TextEdit::singleline(&mut draft.user_agent).desired_width(260.0));
                    ui.end_row();

                    ui.label("Font size:");
                    ui.add(egui::Slider::new(&mut draft.font_size, 10..=24));
                    ui.end_row();

                    ui.label("Theme:");
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut draft.dark_mode, true, "🌙 Dark");
                        ui.selectable_value(&mut draft.dark_mode, false, "☀ Light");
                    });
                    ui.end_row();
                });

                if self.config.backend_override.is_some() {
                    ui.label(
                        egui::RichText::new("Backend URL is currently set by the environment; saving replaces it")
                            .small()
                            .weak(),
                    );
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        save = true;
                    }
                    if ui.button("Reset to defaults").clicked() {
                        self.settings_draft = AppConfig { last_tab: self.config.last_tab, ..AppConfig::default() };
                    }
                });
            });

        if save {
            let mut config = self.settings_draft.clone();
            config.backend_override = None;
            config.last_tab = self.config.last_tab;
            config.save();
            let api = Arc::new(HttpMovieApi::new(&config));
            self.controller.apply_config(&config, api);
            self.config = config;
            self.show_settings = false;
        } else {
            self.show_settings = open;
        }
    }
}

impl eframe::App for MovieTrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process background task results (non-blocking)
        self.controller.pump();
        self.watch_viewport(ctx);
        self.apply_style(ctx);

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.controller.view.active_tab {
            Tab::Search => self.show_search_tab(ui),
            Tab::History => self.show_history_tab(ui),
            Tab::Analytics => self.show_analytics_tab(ui),
            Tab::Console => self.show_console_tab(ui),
        });

        self.show_settings_window(ctx);
        self.show_entry_modal(ctx);
        self.show_delete_confirm(ctx);
        self.show_alert(ctx);

        // Keep polling while work is outstanding
        if self.controller.in_flight() > 0 {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
        if let Some(wait) = self.controller.resize_remaining(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
