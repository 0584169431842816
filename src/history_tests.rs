//! Tests for the history store and filter engine

use super::*;

fn entry(id: &str, title: &str, year: &str, genre: &str) -> WatchHistoryEntry {
    WatchHistoryEntry {
        id: id.to_string(),
        title: title.to_string(),
        year: year.to_string(),
        genre: genre.to_string(),
        ..Default::default()
    }
}

fn sample() -> Vec<WatchHistoryEntry> {
    vec![
        entry("1", "The Matrix", "1999", "Action, Sci-Fi"),
        entry("2", "Manchester by the Sea", "2016", "Drama"),
        entry("3", "Heat", "1995", "Action, Crime, Drama"),
        entry("4", "The Matrix Reloaded", "2003", "Action, Sci-Fi"),
        entry("5", "Fast Action Heroes", "2003", "Action-Comedy"),
    ]
}

fn ids(view: &[&WatchHistoryEntry]) -> Vec<String> {
    view.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn test_genre_filter_matches_exact_token() {
    let data = vec![
        entry("a", "Alpha", "2001", "Action, Sci-Fi"),
        entry("b", "Beta", "2002", "Drama"),
    ];
    let state = FilterState { genre: Some("Action".to_string()), ..Default::default() };
    assert_eq!(ids(&apply_filters(&data, &state)), vec!["a"]);

    // "Action" must not match the longer "Action-Comedy"
    let data = sample();
    let result = apply_filters(&data, &state);
    assert_eq!(ids(&result), vec!["1", "3", "4"]);
}

#[test]
fn test_title_search_is_case_insensitive_substring() {
    let state = FilterState { search_text: "mAtRiX".to_string(), ..Default::default() };
    assert_eq!(ids(&apply_filters(&sample(), &state)), vec!["1", "4"]);
}

#[test]
fn test_genre_match_is_case_sensitive() {
    let state = FilterState { genre: Some("action".to_string()), ..Default::default() };
    assert!(apply_filters(&sample(), &state).is_empty());
}

#[test]
fn test_predicates_are_anded_and_order_preserved() {
    let state = FilterState {
        search_text: "the".to_string(),
        genre: Some("Action".to_string()),
        year: Some("2003".to_string()),
    };
    assert_eq!(ids(&apply_filters(&sample(), &state)), vec!["4"]);

    let state = FilterState { year: Some("2003".to_string()), ..Default::default() };
    assert_eq!(ids(&apply_filters(&sample(), &state)), vec!["4", "5"]);
}

#[test]
fn test_apply_filters_is_idempotent() {
    let data = sample();
    let state = FilterState {
        search_text: "ma".to_string(),
        genre: Some("Sci-Fi".to_string()),
        year: None,
    };
    let once: Vec<WatchHistoryEntry> = apply_filters(&data, &state).into_iter().cloned().collect();
    let twice: Vec<WatchHistoryEntry> = apply_filters(&once, &state).into_iter().cloned().collect();
    assert_eq!(once, twice);

    // Same inputs, same output regardless of what ran in between
    let other = FilterState { year: Some("1995".to_string()), ..Default::default() };
    let _ = apply_filters(&data, &other);
    assert_eq!(ids(&apply_filters(&data, &state)), ids(&once.iter().collect::<Vec<_>>()));
}

#[test]
fn test_derived_options() {
    let data = sample();
    assert_eq!(
        derive_genre_options(&data),
        vec!["Action", "Action-Comedy", "Crime", "Drama", "Sci-Fi"]
    );
    assert_eq!(derive_year_options(&data), vec!["2016", "2003", "1999", "1995"]);
}

#[test]
fn test_replace_drops_stale_selections() {
    let mut store = HistoryStore::default();
    store.replace(sample());
    assert!(store.select_genre(Some("Crime".to_string())));
    assert!(store.select_year(Some("1995".to_string())));

    // Heat was deleted on the backend; its genre and year disappear
    let remaining: Vec<_> = sample().into_iter().filter(|e| e.id != "3").collect();
    store.replace(remaining);

    assert!(!store.genre_options().contains(&"Crime".to_string()));
    assert_eq!(store.filter().genre, None);
    assert_eq!(store.filter().year, None);
}

#[test]
fn test_replace_keeps_valid_selection() {
    let mut store = HistoryStore::default();
    store.replace(sample());
    store.select_genre(Some("Drama".to_string()));
    store.replace(sample());
    assert_eq!(store.filter().genre.as_deref(), Some("Drama"));
}

#[test]
fn test_unknown_selection_refused() {
    let mut store = HistoryStore::default();
    store.replace(sample());
    assert!(!store.select_genre(Some("Western".to_string())));
    assert!(!store.select_year(Some("1950".to_string())));
    assert_eq!(store.filter(), &FilterState::default());
    assert!(store.select_genre(None));
}

#[test]
fn test_view_distinguishes_empty_from_no_matches() {
    let mut store = HistoryStore::default();
    store.replace(Vec::new());
    assert_eq!(store.view(), HistoryView::Empty);

    store.replace(sample());
    store.set_search_text("zzz");
    assert_eq!(store.view(), HistoryView::NoMatches);

    store.set_search_text("heat");
    match store.view() {
        HistoryView::Entries(list) => assert_eq!(ids(&list), vec!["3"]),
        other => panic!("unexpected view: {:?}", other),
    }
}

#[test]
fn test_status_transitions() {
    let mut store = HistoryStore::default();
    assert_eq!(store.status(), &HistoryStatus::NotLoaded);
    store.mark_loading();
    assert_eq!(store.status(), &HistoryStatus::Loading);
    store.mark_failed(LOAD_ERROR_MESSAGE);
    assert_eq!(store.status(), &HistoryStatus::Failed(LOAD_ERROR_MESSAGE.to_string()));
    store.replace(sample());
    assert_eq!(store.status(), &HistoryStatus::Loaded);
    assert_eq!(store.find("2").map(|e| e.title.as_str()), Some("Manchester by the Sea"));
}

#[test]
fn test_padded_year_is_selectable() {
    let mut store = HistoryStore::default();
    store.replace(vec![entry("1", "Heat", " 1995", "Crime")]);

    assert_eq!(store.year_options(), &["1995".to_string()]);
    assert!(store.select_year(Some("1995".to_string())));
    match store.view() {
        HistoryView::Entries(list) => assert_eq!(ids(&list), vec!["1"]),
        other => panic!("unexpected view: {:?}", other),
    }
}
