//! API client for the subtitle manager server.
//!
//! This module provides the fetch layer (series, episodes, language
//! profiles, manual search results, history) and the download side effect,
//! speaking the server's JSON API over HTTP.

use crate::error::{AppError, Result};
use crate::profile::LanguageProfile;
use crate::types::{Episode, HistoryEntry, SearchResult, Series};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Maximum number of retry attempts for failed requests.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

const API_KEY_HEADER: &str = "X-API-KEY";
const USER_AGENT: &str = concat!("episub/", env!("CARGO_PKG_VERSION"));

/// Check if an error is retryable (network errors, timeouts, server errors).
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.status().map(|s| s.is_server_error()).unwrap_or(false)
}

/// Retry an async operation with exponential backoff.
///
/// Retries the operation up to `MAX_RETRIES` times on retryable errors,
/// with exponential backoff starting at `BASE_RETRY_DELAY_MS`.
async fn retry_with_backoff<T, F, Fut>(operation_name: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, reqwest::Error>>,
{
    let mut last_error = None;

    for attempt in 0..=MAX_RETRIES {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        "{} succeeded after {} attempts",
                        operation_name,
                        attempt + 1
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt < MAX_RETRIES && is_retryable_error(&e) {
                    let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2_u64.pow(attempt));
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                        operation_name,
                        attempt + 1,
                        MAX_RETRIES + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    last_error = Some(e);
                } else {
                    return Err(AppError::Network(format!(
                        "{} failed: {}",
                        operation_name, e
                    )));
                }
            }
        }
    }

    Err(AppError::Network(format!(
        "{} failed after {} attempts: {}",
        operation_name,
        MAX_RETRIES + 1,
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string())
    )))
}

/// List envelope wrapping most API responses.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

/// Payload of a direct subtitle download request.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DownloadRequest {
    pub language: String,
    pub hi: bool,
    pub forced: bool,
    pub provider: String,
    pub subtitle: String,
}

impl From<&SearchResult> for DownloadRequest {
    fn from(result: &SearchResult) -> Self {
        Self {
            language: result.language.clone(),
            hi: result.hearing_impaired,
            forced: result.forced,
            provider: result.provider.clone(),
            subtitle: result.subtitle.clone(),
        }
    }
}

/// HTTP client for the subtitle manager API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Build a client for the given server.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Normalized server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a series record with its language profile reference.
    pub async fn fetch_series(&self, series_id: i64) -> Result<Series> {
        debug!("Fetching series {}", series_id);

        let url = self.url("/api/series");
        let resp = retry_with_backoff("Fetch series", || {
            let request = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("seriesid[]", series_id.to_string())]);
            async move { request.send().await?.error_for_status() }
        })
        .await?;

        let parsed: DataEnvelope<Series> = resp
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse series {}: {}", series_id, e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Series {} not found", series_id)))
    }

    /// Fetch the episode list for a series.
    pub async fn fetch_episodes(&self, series_id: i64) -> Result<Vec<Episode>> {
        debug!("Fetching episodes for series {}", series_id);

        let url = self.url("/api/episodes");
        let resp = retry_with_backoff("Fetch episodes", || {
            let request = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("seriesid[]", series_id.to_string())]);
            async move { request.send().await?.error_for_status() }
        })
        .await?;

        let parsed: DataEnvelope<Episode> = resp
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse episode list: {}", e)))?;

        debug!(
            "Found {} episodes for series {}",
            parsed.data.len(),
            series_id
        );

        Ok(parsed.data)
    }

    /// Resolve a language profile reference.
    ///
    /// Returns `Ok(None)` when the server knows no profile with that id;
    /// per the error model an unresolvable profile degrades to an empty
    /// desired set rather than failing the render.
    pub async fn fetch_profile(&self, profile_id: i64) -> Result<Option<LanguageProfile>> {
        debug!("Fetching language profile {}", profile_id);

        let url = self.url("/api/system/languages/profiles");
        let resp = retry_with_backoff("Fetch language profiles", || {
            let request = self.http.get(&url).header(API_KEY_HEADER, &self.api_key);
            async move { request.send().await?.error_for_status() }
        })
        .await?;

        let profiles: Vec<LanguageProfile> = resp
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse language profiles: {}", e)))?;

        Ok(profiles.into_iter().find(|p| p.profile_id == profile_id))
    }

    /// Run a manual subtitle search for one episode.
    pub async fn search_subtitles(
        &self,
        series_id: i64,
        episode_id: i64,
    ) -> Result<Vec<SearchResult>> {
        debug!("Searching subtitles for episode {}", episode_id);

        let url = self.url("/api/providers/episodes");
        let resp = retry_with_backoff("Search subtitles", || {
            let request = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[
                    ("seriesid", series_id.to_string()),
                    ("episodeid", episode_id.to_string()),
                ]);
            async move { request.send().await?.error_for_status() }
        })
        .await?;

        let parsed: DataEnvelope<SearchResult> = resp.json().await.map_err(|e| {
            AppError::Parse(format!(
                "Failed to parse search results for episode {}: {}",
                episode_id, e
            ))
        })?;

        debug!(
            "Found {} subtitle candidates for episode {}",
            parsed.data.len(),
            episode_id
        );

        Ok(parsed.data)
    }

    /// Fetch the subtitle history of one episode.
    pub async fn fetch_episode_history(
        &self,
        series_id: i64,
        episode_id: i64,
    ) -> Result<Vec<HistoryEntry>> {
        debug!("Fetching history for episode {}", episode_id);

        let url = self.url("/api/episodes/history");
        let resp = retry_with_backoff("Fetch episode history", || {
            let request = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[
                    ("seriesid", series_id.to_string()),
                    ("episodeid", episode_id.to_string()),
                ]);
            async move { request.send().await?.error_for_status() }
        })
        .await?;

        let parsed: DataEnvelope<HistoryEntry> = resp
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse episode history: {}", e)))?;

        Ok(parsed.data)
    }

    /// Request a subtitle download for an episode.
    ///
    /// Sent once, without the transport retry policy; failures surface to
    /// the invoking workflow as a [`AppError::Download`].
    pub async fn download_episode_subtitle(
        &self,
        series_id: i64,
        episode_id: i64,
        request: &DownloadRequest,
    ) -> Result<()> {
        info!(
            "Requesting {} subtitle for episode {} from {}",
            request.language, episode_id, request.provider
        );

        let resp = self
            .http
            .post(self.url("/api/providers/episodes"))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[
                ("seriesid", series_id.to_string()),
                ("episodeid", episode_id.to_string()),
            ])
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Download(format!("Download request failed: {}", e)))?;

        resp.error_for_status()
            .map_err(|e| AppError::Download(format!("Download request rejected: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = ApiClient::new("http://localhost:6767/", "key").unwrap();
        assert_eq!(client.base_url(), "http://localhost:6767");
        assert_eq!(client.url("/api/episodes"), "http://localhost:6767/api/episodes");
    }

    #[test]
    fn test_download_request_from_search_result() {
        let result = SearchResult {
            language: "en".to_string(),
            hearing_impaired: true,
            forced: false,
            provider: "opensubtitles".to_string(),
            subtitle: "payload-token".to_string(),
            score: Some(88),
            release: None,
        };
        let request = DownloadRequest::from(&result);
        assert_eq!(request.language, "en");
        assert!(request.hi);
        assert!(!request.forced);
        assert_eq!(request.provider, "opensubtitles");
        assert_eq!(request.subtitle, "payload-token");
    }

    #[test]
    fn test_download_request_serializes_expected_fields() {
        let request = DownloadRequest {
            language: "fr".to_string(),
            hi: false,
            forced: true,
            provider: "podnapisi".to_string(),
            subtitle: "x".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["language"], "fr");
        assert_eq!(json["hi"], false);
        assert_eq!(json["forced"], true);
        assert_eq!(json["provider"], "podnapisi");
        assert_eq!(json["subtitle"], "x");
    }

    #[test]
    fn test_data_envelope_deserialization() {
        let json = r#"{"data": [{"timestamp": "now", "description": "downloaded"}]}"#;
        let parsed: DataEnvelope<HistoryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].description, "downloaded");
    }
}
