//! Movie tracker backend client

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("{0}")]
    Backend(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// What a search produced when the request itself went through
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<SearchResultItem>),
    NoResults,
    /// Backend answered with an `error` field
    Rejected(String),
}

/// The six backend endpoints the client consumes.
pub trait MovieApi: Send + Sync {
    fn search(&self, query: &str) -> Result<SearchOutcome, ApiError>;
    fn movie_detail(&self, id: &str) -> Result<MovieDetail, ApiError>;
    fn add_watched(&self, request: &WatchRequest) -> Result<(), ApiError>;
    fn watched_movies(&self) -> Result<Vec<WatchHistoryEntry>, ApiError>;
    fn delete_watched(&self, id: &str) -> Result<(), ApiError>;
    fn visualization_data(&self) -> Result<VisualizationPayload, ApiError>;
}

pub struct HttpMovieApi {
    base_url: String,
    user_agent: String,
    agent: ureq::Agent,
}

impl HttpMovieApi {
    pub fn new(config: &AppConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.request_timeout_secs)))
            .timeout_connect(Some(Duration::from_secs(config.connect_timeout_secs)))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            base_url: config.base_url().to_string(),
            user_agent: config.user_agent.clone(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> Result<(u16, String), ApiError> {
        let mut response = self.agent
            .get(&self.url(path))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok((status, body))
    }

    fn post_json(&self, path: &str, body: &impl serde::Serialize) -> Result<(u16, String), ApiError> {
        let payload = serde_json::to_string(body)?;
        let mut response = self.agent
            .post(&self.url(path))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .send(payload)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok((status, body))
    }

    fn delete(&self, path: &str) -> Result<(u16, String), ApiError> {
        let mut response = self.agent
            .delete(&self.url(path))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok((status, body))
    }
}

impl MovieApi for HttpMovieApi {
    fn search(&self, query: &str) -> Result<SearchOutcome, ApiError> {
        let (status, body) = self.post_json("/search", &serde_json::json!({ "query": query }))?;
        parse_search_response(status, &body)
    }

    fn movie_detail(&self, id: &str) -> Result<MovieDetail, ApiError> {
        let (status, body) = self.get(&format!("/movie/{}", encode_segment(id)))?;
        parse_movie_detail(status, &body)
    }

    fn add_watched(&self, request: &WatchRequest) -> Result<(), ApiError> {
        let (status, body) = self.post_json("/movie/watch", request)?;
        parse_success_response(status, &body, "Failed to add movie to watch history")
    }

    fn watched_movies(&self) -> Result<Vec<WatchHistoryEntry>, ApiError> {
        let (status, body) = self.get("/movies/watched")?;
        parse_json_response(status, &body)
    }

    fn delete_watched(&self, id: &str) -> Result<(), ApiError> {
        let (status, body) = self.delete(&format!("/movie/watch/{}", encode_segment(id)))?;
        parse_success_response(status, &body, "Failed to delete movie")
    }

    fn visualization_data(&self) -> Result<VisualizationPayload, ApiError> {
        let (status, body) = self.get("/visualizations/data")?;
        parse_json_response(status, &body)
    }
}

/// Percent-encode anything outside the unreserved set so ids stay one segment.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn error_field(json: &Value) -> Option<String> {
    json.get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

fn status_error(status: u16, body: &str) -> ApiError {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| error_field(&json))
        .map(ApiError::Backend)
        .unwrap_or(ApiError::Status(status))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn parse_json_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    Ok(serde_json::from_str(body)?)
}

pub fn parse_search_response(status: u16, body: &str) -> Result<SearchOutcome, ApiError> {
    if !is_success(status) {
        // The backend reports validation and upstream failures with an error body
        return match status_error(status, body) {
            ApiError::Backend(msg) => Ok(SearchOutcome::Rejected(msg)),
            other => Err(other),
        };
    }

    let json: Value = serde_json::from_str(body)?;
    if let Some(results) = json.get("Search") {
        let items: Vec<SearchResultItem> = serde_json::from_value(results.clone())?;
        return Ok(if items.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Results(items)
        });
    }
    if let Some(error) = error_field(&json) {
        return Ok(SearchOutcome::Rejected(error));
    }
    Ok(SearchOutcome::NoResults)
}

pub fn parse_movie_detail(status: u16, body: &str) -> Result<MovieDetail, ApiError> {
    let json: Value = parse_json_response(status, body)?;
    if let Some(error) = error_field(&json) {
        return Err(ApiError::Backend(error));
    }
    // OMDb answers unknown ids with 200 and Response: "False"
    if json.get("Response").and_then(Value::as_str) == Some("False") {
        let msg = json.get("Error").and_then(Value::as_str).unwrap_or("Movie not found");
        return Err(ApiError::Backend(msg.to_string()));
    }
    Ok(serde_json::from_value(json)?)
}

pub fn parse_success_response(status: u16, body: &str, fallback: &str) -> Result<(), ApiError> {
    let json: Value = parse_json_response(status, body)?;
    if json.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(())
    } else {
        Err(ApiError::Backend(error_field(&json).unwrap_or_else(|| fallback.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_results() {
        let body = r#"{"Search": [{"Title": "The Matrix", "Year": "1999", "imdbID": "tt0133093", "Type": "movie", "Poster": "x"}]}"#;
        match parse_search_response(200, body).unwrap() {
            SearchOutcome::Results(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].title, "The Matrix");
                assert_eq!(items[0].year, "1999");
                assert_eq!(items[0].external_id, "tt0133093");
                assert_eq!(items[0].media_type, "movie");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_search_no_results() {
        let body = r#"{"Response": "False", "Error": "Movie not found!"}"#;
        assert_eq!(parse_search_response(200, body).unwrap(), SearchOutcome::NoResults);
        assert_eq!(parse_search_response(200, r#"{"Search": []}"#).unwrap(), SearchOutcome::NoResults);
    }

    #[test]
    fn test_search_backend_error() {
        let body = r#"{"error": "API request failed: timeout"}"#;
        assert_eq!(
            parse_search_response(500, body).unwrap(),
            SearchOutcome::Rejected("API request failed: timeout".to_string())
        );
        assert_eq!(
            parse_search_response(200, r#"{"error": "No query provided"}"#).unwrap(),
            SearchOutcome::Rejected("No query provided".to_string())
        );
    }

    #[test]
    fn test_search_status_without_body() {
        assert_eq!(parse_search_response(502, "<html>bad gateway</html>"), Err(ApiError::Status(502)));
    }

    #[test]
    fn test_success_response() {
        assert!(parse_success_response(200, r#"{"success": true}"#, "x").is_ok());
        assert_eq!(
            parse_success_response(200, r#"{"success": false, "error": "Duplicate entry"}"#, "x"),
            Err(ApiError::Backend("Duplicate entry".to_string()))
        );
        assert_eq!(
            parse_success_response(200, r#"{"success": false}"#, "Failed to delete movie"),
            Err(ApiError::Backend("Failed to delete movie".to_string()))
        );
        assert_eq!(
            parse_success_response(404, r#"{"success": false, "error": "Not found"}"#, "x"),
            Err(ApiError::Backend("Not found".to_string()))
        );
    }

    #[test]
    fn test_movie_detail_errors() {
        assert_eq!(
            parse_movie_detail(200, r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#),
            Err(ApiError::Backend("Incorrect IMDb ID.".to_string()))
        );
        assert_eq!(
            parse_movie_detail(500, r#"{"error": "upstream down"}"#),
            Err(ApiError::Backend("upstream down".to_string()))
        );
        assert!(matches!(parse_movie_detail(200, "not json"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_watched_list() {
        let body = r#"[{"id": 1, "title": "Heat", "year": "1995", "watch_date": "2024-01-02",
            "rating": 8.3, "runtime": 170, "genre": "Crime, Drama"}]"#;
        let entries: Vec<WatchHistoryEntry> = parse_json_response(200, body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].genres(), vec!["Crime", "Drama"]);
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("tt0133093"), "tt0133093");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
    }
}
