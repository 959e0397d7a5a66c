//! Application state management and input handling.

use crate::profile::{LanguageProfile, ProfileResolver};
use crate::router::{ActionKey, ModalRequest};
use crate::table::{self, GroupingState};
use crate::types::{Episode, HistoryEntry, LanguageItem, SearchResult, Series};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::{ListState, TableState};

use super::types::{Action, ActiveModal, Screen, TableRow};

/// Application state for the TUI.
pub struct App {
    /// Current screen being displayed
    pub screen: Screen,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Series the table belongs to
    pub series: Option<Series>,
    /// Episode list, replaced wholesale on every fetch
    pub episodes: Vec<Episode>,
    /// Grouping/sort/expansion state, rederived on every episode list change
    pub grouping: GroupingState,
    /// Cursor over the visible rows
    pub table_state: TableState,
    /// Resolved language profile of the series
    pub profile: Option<LanguageProfile>,
    /// Desired-language set resolved from the profile
    pub desired: Vec<LanguageItem>,
    /// Whether to show only desired present subtitles
    pub only_desired: bool,
    /// Modal overlay currently open
    pub modal: Option<ActiveModal>,
    /// Loading message
    pub loading_message: String,
    /// Status message shown in the footer
    pub status_message: Option<String>,
    /// Error message to display
    pub error_message: Option<String>,
    /// Whether help modal is shown
    pub show_help: bool,
    resolver: ProfileResolver,
}

impl App {
    /// Create a new App with default state.
    pub fn new(only_desired: bool) -> Self {
        Self {
            screen: Screen::Loading,
            should_quit: false,
            series: None,
            episodes: Vec::new(),
            grouping: table::derive_initial_state(&[]),
            table_state: TableState::default(),
            profile: None,
            desired: Vec::new(),
            only_desired,
            modal: None,
            loading_message: String::new(),
            status_message: None,
            error_message: None,
            show_help: false,
            resolver: ProfileResolver::new(),
        }
    }

    /// Set the app to loading state with a message.
    pub fn set_loading(&mut self, message: &str) {
        self.screen = Screen::Loading;
        self.loading_message = message.to_string();
    }

    /// Set an error message.
    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    /// Clear error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Set the footer status message.
    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Set the series record.
    pub fn set_series(&mut self, series: Series) {
        self.series = Some(series);
    }

    /// Set the resolved profile and rebuild the desired-language set.
    pub fn set_profile(&mut self, profile: Option<LanguageProfile>) {
        self.desired = self.resolver.resolve(profile.as_ref()).to_vec();
        self.profile = profile;
    }

    /// Replace the episode list and rederive grouping state.
    ///
    /// The expansion default (max-season group open) is recomputed here,
    /// never carried over from a previous list.
    pub fn set_episodes(&mut self, episodes: Vec<Episode>) {
        self.grouping = table::derive_initial_state(&episodes);
        self.episodes = episodes;
        self.table_state.select(Some(0));
        self.screen = Screen::EpisodeTable;
    }

    /// Whether the present-subtitle filter applies this render pass.
    ///
    /// An empty desired set means no filtering criterion is available, so
    /// the toggle degrades to "no filter" instead of hiding everything.
    pub fn filter_active(&self) -> bool {
        self.only_desired && !self.desired.is_empty()
    }

    /// Manual search needs an assigned language profile.
    pub fn manual_search_allowed(&self) -> bool {
        self.series
            .as_ref()
            .map(|s| s.profile_id.is_some())
            .unwrap_or(false)
    }

    /// Flatten the grouped view into the rows currently visible.
    pub fn visible_rows(&self) -> Vec<TableRow> {
        let mut rows = Vec::new();
        for group in table::season_groups(&self.episodes, &self.grouping) {
            rows.push(TableRow::Group {
                season: group.season,
                key: group.key.clone(),
                expanded: group.expanded,
                episode_count: group.episodes.len(),
            });
            if group.expanded {
                for episode in group.episodes {
                    rows.push(TableRow::Episode(episode));
                }
            }
        }
        rows
    }

    /// The row under the cursor, if any.
    pub fn selected_row(&self) -> Option<TableRow> {
        let index = self.table_state.selected()?;
        self.visible_rows().into_iter().nth(index)
    }

    /// The episode under the cursor, if the cursor is on an episode row.
    pub fn selected_episode(&self) -> Option<Episode> {
        match self.selected_row() {
            Some(TableRow::Episode(episode)) => Some(episode),
            _ => None,
        }
    }

    /// Open the modal for a routed workflow request.
    pub fn show_modal(&mut self, request: ModalRequest) {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        self.modal = Some(match request {
            ModalRequest::ManualSearch(episode) => ActiveModal::ManualSearch {
                episode,
                results: Vec::new(),
                list_state,
                loading: true,
            },
            ModalRequest::History(episode) => ActiveModal::History {
                episode,
                entries: Vec::new(),
                list_state,
                loading: true,
            },
            ModalRequest::Tools(episodes) => ActiveModal::Tools {
                episodes,
                list_state,
            },
        });
    }

    /// Fill the open manual-search modal with fetched results.
    pub fn set_search_results(&mut self, results: Vec<SearchResult>) {
        if let Some(ActiveModal::ManualSearch {
            results: slot,
            loading,
            list_state,
            ..
        }) = &mut self.modal
        {
            *slot = results;
            *loading = false;
            list_state.select(Some(0));
        }
    }

    /// Fill the open history modal with fetched entries.
    pub fn set_history_entries(&mut self, entries: Vec<HistoryEntry>) {
        if let Some(ActiveModal::History {
            entries: slot,
            loading,
            list_state,
            ..
        }) = &mut self.modal
        {
            *slot = entries;
            *loading = false;
            list_state.select(Some(0));
        }
    }

    /// Close the open modal.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    fn move_selection(&mut self, delta: i64) {
        let len = self.visible_rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, len as i64 - 1);
        self.table_state.select(Some(next as usize));
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(current.min(len - 1)));
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        // Handle help modal
        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return Action::None;
        }

        // Toggle help
        if key.code == KeyCode::Char('?') {
            self.show_help = true;
            return Action::None;
        }

        // Modal input takes precedence over the table
        if self.modal.is_some() {
            return self.handle_modal_input(key);
        }

        match self.screen {
            Screen::EpisodeTable => self.handle_table_input(key),
            Screen::Loading => {
                // Allow quit during loading
                if key.code == KeyCode::Char('q') {
                    self.should_quit = true;
                    return Action::Quit;
                }
                Action::None
            }
        }
    }

    fn handle_table_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(TableRow::Group { key: group_key, .. }) = self.selected_row() {
                    self.grouping.toggle(&group_key);
                    self.clamp_selection();
                }
                Action::None
            }
            KeyCode::Char('m') => {
                if self.selected_episode().is_none() {
                    return Action::None;
                }
                if !self.manual_search_allowed() {
                    self.set_error("Series has no language profile; manual search is unavailable");
                    return Action::None;
                }
                Action::Row(ActionKey::ManualSearch)
            }
            KeyCode::Char('h') => {
                if self.selected_episode().is_some() {
                    Action::Row(ActionKey::History)
                } else {
                    Action::None
                }
            }
            KeyCode::Char('t') => {
                if self.selected_episode().is_some() {
                    Action::Row(ActionKey::Tools)
                } else {
                    Action::None
                }
            }
            KeyCode::Char('o') => {
                self.only_desired = !self.only_desired;
                Action::None
            }
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('q') => {
                self.should_quit = true;
                Action::Quit
            }
            _ => Action::None,
        }
    }

    fn handle_modal_input(&mut self, key: KeyEvent) -> Action {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            self.close_modal();
            return Action::None;
        }

        let Some(modal) = &mut self.modal else {
            return Action::None;
        };

        match modal {
            ActiveModal::ManualSearch {
                results,
                list_state,
                loading,
                ..
            } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    let i = list_state.selected().unwrap_or(0);
                    if i > 0 {
                        list_state.select(Some(i - 1));
                    }
                    Action::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let i = list_state.selected().unwrap_or(0);
                    if i < results.len().saturating_sub(1) {
                        list_state.select(Some(i + 1));
                    }
                    Action::None
                }
                KeyCode::Enter => {
                    if *loading || results.is_empty() {
                        return Action::None;
                    }
                    match list_state.selected() {
                        Some(i) if i < results.len() => Action::Download(i),
                        _ => Action::None,
                    }
                }
                _ => Action::None,
            },
            ActiveModal::History {
                entries,
                list_state,
                ..
            } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    let i = list_state.selected().unwrap_or(0);
                    if i > 0 {
                        list_state.select(Some(i - 1));
                    }
                    Action::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let i = list_state.selected().unwrap_or(0);
                    if i < entries.len().saturating_sub(1) {
                        list_state.select(Some(i + 1));
                    }
                    Action::None
                }
                _ => Action::None,
            },
            ActiveModal::Tools {
                episodes,
                list_state,
            } => {
                let item_count: usize = episodes.iter().map(|e| e.subtitles.len()).sum();
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        let i = list_state.selected().unwrap_or(0);
                        if i > 0 {
                            list_state.select(Some(i - 1));
                        }
                        Action::None
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let i = list_state.selected().unwrap_or(0);
                        if i < item_count.saturating_sub(1) {
                            list_state.select(Some(i + 1));
                        }
                        Action::None
                    }
                    _ => Action::None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;
    use crate::types::Subtitle;

    fn episode(season: i64, number: i64) -> Episode {
        Episode {
            series_id: 1,
            episode_id: season * 100 + number,
            season,
            episode: number,
            title: format!("ep {}", number),
            scene_name: None,
            monitored: true,
            audio_languages: vec![],
            missing_subtitles: vec![],
            subtitles: vec![Subtitle {
                code: "en".to_string(),
                name: "English".to_string(),
                hearing_impaired: false,
                forced: false,
                provider: None,
                path: Some("/s.srt".to_string()),
            }],
        }
    }

    fn series(profile_id: Option<i64>) -> Series {
        Series {
            id: 1,
            title: "show".to_string(),
            profile_id,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_set_episodes_expands_only_max_season() {
        let mut app = App::new(false);
        app.set_episodes(vec![episode(1, 1), episode(2, 1)]);

        let rows = app.visible_rows();
        // Two group headers, one expanded group with one episode.
        assert_eq!(rows.len(), 3);
        assert!(matches!(
            rows[0],
            TableRow::Group { season: 2, expanded: true, .. }
        ));
        assert!(matches!(rows[1], TableRow::Episode(_)));
        assert!(matches!(
            rows[2],
            TableRow::Group { season: 1, expanded: false, .. }
        ));
    }

    #[test]
    fn test_enter_on_group_row_toggles_expansion() {
        let mut app = App::new(false);
        app.set_episodes(vec![episode(1, 1), episode(1, 2)]);
        assert_eq!(app.visible_rows().len(), 3);

        app.handle_input(key(KeyCode::Enter));
        assert_eq!(app.visible_rows().len(), 1);

        app.handle_input(key(KeyCode::Enter));
        assert_eq!(app.visible_rows().len(), 3);
    }

    #[test]
    fn test_selected_episode_skips_group_rows() {
        let mut app = App::new(false);
        app.set_episodes(vec![episode(1, 1)]);

        // Cursor starts on the group header.
        assert!(app.selected_episode().is_none());
        app.handle_input(key(KeyCode::Down));
        assert!(app.selected_episode().is_some());
    }

    #[test]
    fn test_manual_search_requires_profile() {
        let mut app = App::new(false);
        app.set_series(series(None));
        app.set_episodes(vec![episode(1, 1)]);
        app.handle_input(key(KeyCode::Down));

        let action = app.handle_input(key(KeyCode::Char('m')));
        assert_eq!(action, Action::None);
        assert!(app.error_message.is_some());
    }

    #[test]
    fn test_row_actions_on_episode_row() {
        let mut app = App::new(false);
        app.set_series(series(Some(5)));
        app.set_episodes(vec![episode(1, 1)]);
        app.handle_input(key(KeyCode::Down));

        assert_eq!(
            app.handle_input(key(KeyCode::Char('m'))),
            Action::Row(ActionKey::ManualSearch)
        );
        assert_eq!(
            app.handle_input(key(KeyCode::Char('h'))),
            Action::Row(ActionKey::History)
        );
        assert_eq!(
            app.handle_input(key(KeyCode::Char('t'))),
            Action::Row(ActionKey::Tools)
        );
    }

    #[test]
    fn test_row_actions_ignored_on_group_row() {
        let mut app = App::new(false);
        app.set_series(series(Some(5)));
        app.set_episodes(vec![episode(1, 1)]);

        assert_eq!(app.handle_input(key(KeyCode::Char('h'))), Action::None);
        assert_eq!(app.handle_input(key(KeyCode::Char('t'))), Action::None);
    }

    #[test]
    fn test_filter_inactive_without_profile() {
        let mut app = App::new(true);
        assert!(app.only_desired);
        // No profile resolved: the toggle degrades to "no filter".
        assert!(!app.filter_active());

        app.set_profile(Some(LanguageProfile {
            profile_id: 1,
            name: "p".to_string(),
            items: vec![crate::profile::ProfileItem {
                id: 0,
                code: "en".to_string(),
                name: None,
                hearing_impaired: false,
                forced: false,
            }],
        }));
        assert!(app.filter_active());
    }

    #[test]
    fn test_modal_opens_and_closes() {
        let mut app = App::new(false);
        let ep = episode(1, 1);
        app.show_modal(router::route(&ep, ActionKey::History));
        assert!(app.modal.is_some());

        app.handle_input(key(KeyCode::Esc));
        assert!(app.modal.is_none());
    }

    #[test]
    fn test_manual_search_enter_downloads_selected() {
        let mut app = App::new(false);
        let ep = episode(1, 1);
        app.show_modal(router::route(&ep, ActionKey::ManualSearch));

        // Still loading: Enter does nothing.
        assert_eq!(app.handle_input(key(KeyCode::Enter)), Action::None);

        app.set_search_results(vec![
            SearchResult {
                language: "en".to_string(),
                hearing_impaired: false,
                forced: false,
                provider: "a".to_string(),
                subtitle: "x".to_string(),
                score: None,
                release: None,
            },
            SearchResult {
                language: "fr".to_string(),
                hearing_impaired: false,
                forced: false,
                provider: "b".to_string(),
                subtitle: "y".to_string(),
                score: None,
                release: None,
            },
        ]);

        app.handle_input(key(KeyCode::Down));
        assert_eq!(app.handle_input(key(KeyCode::Enter)), Action::Download(1));
    }

    #[test]
    fn test_toggle_only_desired() {
        let mut app = App::new(false);
        app.set_episodes(vec![episode(1, 1)]);
        app.handle_input(key(KeyCode::Char('o')));
        assert!(app.only_desired);
    }

    #[test]
    fn test_collapse_clamps_cursor() {
        let mut app = App::new(false);
        app.set_episodes(vec![episode(1, 1), episode(1, 2)]);
        // Move to the last episode row, then collapse the group.
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Up));
        app.handle_input(key(KeyCode::Up));
        app.handle_input(key(KeyCode::Enter));
        assert_eq!(app.table_state.selected(), Some(0));
    }
}
