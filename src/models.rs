//! Data models for the movie tracker
//!
//! Wire names follow the backend: OMDb-style capitalised keys for search and
//! detail payloads, snake_case for the watch history.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Shown wherever an optional field has no usable value
pub const PLACEHOLDER: &str = "Not available";
pub const POSTER_PLACEHOLDER: &str = "No poster available";

/// UI Tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Search,
    History,
    Analytics,
    Console,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Search, Tab::History, Tab::Analytics, Tab::Console];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Search => "🔍 SEARCH",
            Tab::History => "🕐 HISTORY",
            Tab::Analytics => "📊 ANALYTICS",
            Tab::Console => "🖥 CONSOLE",
        }
    }
}

/// One hit from `POST /search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(rename = "imdbID", default)]
    pub external_id: String,
    #[serde(rename = "Type", default)]
    pub media_type: String,
}

/// Full record from `GET /movie/:id`.
///
/// Keys the client does not model (Poster, Writer, Ratings...) are kept in
/// `extra` so the record can be posted back to `/movie/watch` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Runtime", default, deserialize_with = "lenient_string")]
    pub runtime: String,
    #[serde(rename = "imdbRating", default, deserialize_with = "lenient_string")]
    pub imdb_rating: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "imdbID", default, skip_serializing_if = "String::is_empty")]
    pub imdb_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieDetail {
    pub fn rating(&self) -> Option<f64> {
        leading_number(&self.imdb_rating)
    }

    pub fn release_year(&self) -> Option<i32> {
        parse_year(&self.year)
    }

    pub fn genres(&self) -> Vec<&str> {
        genre_tokens(&self.genre)
    }
}

/// Body of `POST /movie/watch`
#[derive(Debug, Clone, Serialize)]
pub struct WatchRequest {
    #[serde(rename = "watchDate")]
    pub watch_date: String,
    #[serde(rename = "movieData")]
    pub movie_data: MovieDetail,
}

/// One row of `GET /movies/watched`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub watch_date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub runtime: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub genre: String,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub writers: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub actors: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub poster_url: Option<String>,
}

impl WatchHistoryEntry {
    pub fn genres(&self) -> Vec<&str> {
        genre_tokens(&self.genre)
    }

    pub fn release_year(&self) -> Option<i32> {
        parse_year(&self.year)
    }

    /// Watch date as "Oct 23, 2024" when it parses, raw text otherwise
    pub fn watch_date_label(&self) -> String {
        let date_part = self.watch_date.get(..10).unwrap_or(&self.watch_date);
        match chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(date) => date.format("%b %-d, %Y").to_string(),
            Err(_) => display_or_placeholder(&self.watch_date).to_string(),
        }
    }

    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(r) => format!("{}/10", r),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn runtime_label(&self) -> String {
        match self.runtime {
            Some(m) => format!("{} min", m),
            None => PLACEHOLDER.to_string(),
        }
    }
}

/// `GET /visualizations/data`; every key may be absent independently.
///
/// Sections are kept raw and decoded per chart, so a malformed section only
/// fails the chart that reads it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct VisualizationPayload {
    #[serde(default)]
    pub creators_network: Option<Value>,
    #[serde(default)]
    pub viewing_patterns: Option<Value>,
    #[serde(default)]
    pub runtime_distribution: Option<Value>,
}

impl VisualizationPayload {
    pub fn creators_network(&self) -> Result<Option<CreatorsNetworkData>, serde_json::Error> {
        decode_section(&self.creators_network)
    }

    pub fn viewing_patterns(&self) -> Result<Option<Vec<ViewingPatternPoint>>, serde_json::Error> {
        decode_section(&self.viewing_patterns)
    }

    pub fn runtime_distribution(&self) -> Result<Option<BTreeMap<String, Vec<f64>>>, serde_json::Error> {
        decode_section(&self.runtime_distribution)
    }
}

fn decode_section<T: DeserializeOwned>(raw: &Option<Value>) -> Result<Option<T>, serde_json::Error> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value).map(Some),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CreatorsNetworkData {
    #[serde(default)]
    pub nodes: Vec<CreatorNode>,
    #[serde(default)]
    pub links: Vec<CreatorLink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatorNode {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub movies: Vec<String>,
}

impl CreatorNode {
    pub fn is_director(&self) -> bool {
        self.role.eq_ignore_ascii_case("director")
    }
}

/// Link endpoints refer to nodes by name
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatorLink {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub movies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewingPatternPoint {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default)]
    pub count: u32,
}

/// Split a comma-separated genre list into trimmed, non-empty tokens.
pub fn genre_tokens(genre: &str) -> Vec<&str> {
    genre
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect()
}

/// True for values the backend uses to mean "unknown"
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("N/A") || value == "undefined"
}

pub fn display_or_placeholder(value: &str) -> &str {
    if is_missing(value) { PLACEHOLDER } else { value }
}

pub fn display_optional(value: Option<&str>) -> &str {
    value.map(display_or_placeholder).unwrap_or(PLACEHOLDER)
}

/// Parse the numeric prefix of strings like "136 min" or "8.7".
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// First four-digit run, so "2010–2014" yields 2010.
pub fn parse_year(text: &str) -> Option<i32> {
    let digits: String = text.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 { digits.parse().ok() } else { None }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_string(deserializer)?;
    Ok(if is_missing(&value) { None } else { Some(value) })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => leading_number(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_tokens() {
        assert_eq!(genre_tokens("Action, Sci-Fi"), vec!["Action", "Sci-Fi"]);
        assert_eq!(genre_tokens("Drama"), vec!["Drama"]);
        assert_eq!(genre_tokens(" , Comedy,,"), vec!["Comedy"]);
        assert!(genre_tokens("").is_empty());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("136 min"), Some(136.0));
        assert_eq!(leading_number("8.7"), Some(8.7));
        assert_eq!(leading_number("N/A"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1999"), Some(1999));
        assert_eq!(parse_year("2010–2014"), Some(2010));
        assert_eq!(parse_year("N/A"), None);
    }

    #[test]
    fn test_movie_detail_keeps_unknown_fields() {
        let json = r#"{
            "Title": "The Matrix", "Year": "1999", "Director": "Lana Wachowski, Lilly Wachowski",
            "Actors": "Keanu Reeves", "Genre": "Action, Sci-Fi", "Runtime": "136 min",
            "imdbRating": "8.7", "Plot": "A hacker learns the truth.", "imdbID": "tt0133093",
            "Writer": "Lilly Wachowski", "Poster": "https://example.com/matrix.jpg"
        }"#;
        let movie: MovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(movie.rating(), Some(8.7));
        assert_eq!(movie.release_year(), Some(1999));
        assert_eq!(movie.genres(), vec!["Action", "Sci-Fi"]);

        let echoed = serde_json::to_value(&movie).unwrap();
        assert_eq!(echoed["Writer"], "Lilly Wachowski");
        assert_eq!(echoed["Poster"], "https://example.com/matrix.jpg");
        assert_eq!(echoed["imdbID"], "tt0133093");
    }

    #[test]
    fn test_history_entry_accepts_mixed_types() {
        let json = r#"[
            {"id": 7, "title": "The Matrix", "year": 1999, "watch_date": "2024-10-23",
             "rating": "8.7", "runtime": 136, "genre": "Action, Sci-Fi",
             "director": "N/A", "writers": null, "plot": "", "poster_url": "https://example.com/m.jpg"},
            {"id": "abc", "title": "Heat"}
        ]"#;
        let entries: Vec<WatchHistoryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].id, "7");
        assert_eq!(entries[0].year, "1999");
        assert_eq!(entries[0].rating, Some(8.7));
        assert_eq!(entries[0].runtime, Some(136.0));
        assert_eq!(entries[0].director, None);
        assert_eq!(entries[0].writers, None);
        assert_eq!(entries[0].plot, None);
        assert_eq!(entries[0].watch_date_label(), "Oct 23, 2024");
        assert_eq!(entries[1].id, "abc");
        assert_eq!(entries[1].rating_label(), PLACEHOLDER);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(display_or_placeholder("N/A"), PLACEHOLDER);
        assert_eq!(display_or_placeholder("undefined"), PLACEHOLDER);
        assert_eq!(display_or_placeholder("Heat"), "Heat");
        assert_eq!(display_optional(None), PLACEHOLDER);
    }

    #[test]
    fn test_visualization_payload_partial() {
        let json = r#"{"viewing_patterns": [{"date": "2024-42", "count": 3}]}"#;
        let payload: VisualizationPayload = serde_json::from_str(json).unwrap();
        assert!(payload.creators_network().unwrap().is_none());
        assert!(payload.runtime_distribution().unwrap().is_none());
        assert_eq!(payload.viewing_patterns().unwrap().unwrap()[0].count, 3);
    }

    #[test]
    fn test_visualization_sections_decode_independently() {
        let json = r#"{
            "creators_network": {"nodes": [{"role": "director"}], "links": []},
            "viewing_patterns": [{"date": "2024-42", "count": 3}],
            "runtime_distribution": {"Drama": [120, null]}
        }"#;
        let payload: VisualizationPayload = serde_json::from_str(json).unwrap();
        assert!(payload.creators_network().is_err());
        assert!(payload.runtime_distribution().is_err());
        assert_eq!(payload.viewing_patterns().unwrap().unwrap().len(), 1);
    }
}
