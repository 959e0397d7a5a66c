//! Row action routing.
//!
//! A button press on an episode row names one of a fixed set of workflows;
//! this module maps that name to a modal request with the payload shape the
//! workflow expects. The router holds no state and performs no I/O of its
//! own; the direct-download dispatch below is the single network side effect
//! reachable from a row, and it forwards straight to the API client.

use crate::api::{ApiClient, DownloadRequest};
use crate::error::Result;
use crate::types::{Episode, SearchResult};

/// The workflows reachable from an episode row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKey {
    ManualSearch,
    History,
    Tools,
}

impl ActionKey {
    /// Wire/display name of the workflow.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKey::ManualSearch => "manual-search",
            ActionKey::History => "history",
            ActionKey::Tools => "tools",
        }
    }

    /// Parse a workflow name.
    pub fn from_str(key: &str) -> Option<Self> {
        match key {
            "manual-search" => Some(ActionKey::ManualSearch),
            "history" => Some(ActionKey::History),
            "tools" => Some(ActionKey::Tools),
            _ => None,
        }
    }
}

/// A routed request for the modal host, payload shaped per workflow.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalRequest {
    /// Manual subtitle search for a single episode.
    ManualSearch(Episode),
    /// Subtitle history of a single episode.
    History(Episode),
    /// Bulk subtitle tools. The workflow is shared with true multi-episode
    /// batches elsewhere, so even a single row enters as a one-element list.
    Tools(Vec<Episode>),
}

impl ModalRequest {
    /// The workflow this request targets.
    pub fn key(&self) -> ActionKey {
        match self {
            ModalRequest::ManualSearch(_) => ActionKey::ManualSearch,
            ModalRequest::History(_) => ActionKey::History,
            ModalRequest::Tools(_) => ActionKey::Tools,
        }
    }
}

/// Map a row button press to its workflow request.
pub fn route(row: &Episode, key: ActionKey) -> ModalRequest {
    match key {
        ActionKey::ManualSearch => ModalRequest::ManualSearch(row.clone()),
        ActionKey::History => ModalRequest::History(row.clone()),
        ActionKey::Tools => ModalRequest::Tools(vec![row.clone()]),
    }
}

/// Dispatch a direct subtitle download for a chosen search result.
///
/// Forwards `(series_id, episode_id)` and the result's full metadata to the
/// download API. Failures surface to the invoking workflow; the call is not
/// retried here.
pub async fn download(client: &ApiClient, episode: &Episode, result: &SearchResult) -> Result<()> {
    client
        .download_episode_subtitle(
            episode.series_id,
            episode.episode_id,
            &DownloadRequest::from(result),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode() -> Episode {
        Episode {
            series_id: 3,
            episode_id: 11,
            season: 1,
            episode: 2,
            title: "row".to_string(),
            scene_name: None,
            monitored: false,
            audio_languages: vec![],
            missing_subtitles: vec![],
            subtitles: vec![],
        }
    }

    #[test]
    fn test_manual_search_payload_is_bare_episode() {
        let row = episode();
        match route(&row, ActionKey::ManualSearch) {
            ModalRequest::ManualSearch(ep) => assert_eq!(ep, row),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_history_payload_is_bare_episode() {
        let row = episode();
        match route(&row, ActionKey::History) {
            ModalRequest::History(ep) => assert_eq!(ep.episode_id, 11),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_tools_payload_is_single_element_list() {
        let row = episode();
        match route(&row, ActionKey::Tools) {
            ModalRequest::Tools(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0], row);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_request_key_round_trip() {
        let row = episode();
        for key in [ActionKey::ManualSearch, ActionKey::History, ActionKey::Tools] {
            assert_eq!(route(&row, key).key(), key);
        }
    }

    #[test]
    fn test_action_key_string_round_trip() {
        for key in [ActionKey::ManualSearch, ActionKey::History, ActionKey::Tools] {
            assert_eq!(ActionKey::from_str(key.as_str()), Some(key));
        }
        assert_eq!(ActionKey::from_str("unknown"), None);
    }
}
