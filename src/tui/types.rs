//! TUI type definitions for screens, rows, modals, and actions.

use crate::router::ActionKey;
use crate::types::{Episode, HistoryEntry, SearchResult};
use ratatui::widgets::ListState;

/// The current screen/view of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Waiting for the fetch layer
    Loading,
    /// Grouped episode table
    EpisodeTable,
}

/// One visible row of the grouped episode table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRow {
    /// Collapsible season header
    Group {
        season: i64,
        key: String,
        expanded: bool,
        episode_count: usize,
    },
    /// Episode row inside an expanded group
    Episode(Episode),
}

/// Modal overlay currently shown, with its workflow-shaped payload.
#[derive(Debug)]
pub enum ActiveModal {
    /// Manual subtitle search for one episode
    ManualSearch {
        episode: Episode,
        results: Vec<SearchResult>,
        list_state: ListState,
        loading: bool,
    },
    /// Subtitle history of one episode
    History {
        episode: Episode,
        entries: Vec<HistoryEntry>,
        list_state: ListState,
        loading: bool,
    },
    /// Bulk subtitle tools over a list of episodes
    Tools {
        episodes: Vec<Episode>,
        list_state: ListState,
    },
}

/// Actions that can be returned from the TUI to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Refetch the episode list
    Reload,
    /// Open the named workflow for the selected row
    Row(ActionKey),
    /// Download the manual-search result at the given index
    Download(usize),
}
