//! Grouping and sort derivation for the episode table.
//!
//! Episodes are grouped by season and sorted season-then-episode descending.
//! Exactly one group starts expanded: the one holding the highest season
//! number in the current list. The state is derived fresh whenever the
//! episode list changes so a newly added season becomes the expanded one.

use crate::types::Episode;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Sortable columns of the episode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Season,
    Episode,
}

/// Grouping, sorting, and expansion state for the table.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupingState {
    /// Sort order as `(column, descending)` pairs, applied in sequence.
    pub sort_by: Vec<(SortColumn, bool)>,

    /// Column the rows are grouped by.
    pub group_by: SortColumn,

    /// Keys of currently expanded groups.
    pub expanded: HashSet<String>,
}

impl GroupingState {
    /// Toggle a group between expanded and collapsed.
    pub fn toggle(&mut self, key: &str) {
        if !self.expanded.remove(key) {
            self.expanded.insert(key.to_string());
        }
    }

    /// Whether a group is currently expanded.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }
}

/// Build the key identifying a season group.
pub fn group_key(season: i64) -> String {
    format!("season:{}", season)
}

/// Highest season number in the list, 0 when empty.
pub fn max_season(episodes: &[Episode]) -> i64 {
    episodes.iter().fold(0, |max, ep| max.max(ep.season))
}

/// Derive the initial table state for an episode list.
///
/// Sort is season descending then episode descending, grouped by season,
/// with only the max-season group expanded.
pub fn derive_initial_state(episodes: &[Episode]) -> GroupingState {
    let mut expanded = HashSet::new();
    expanded.insert(group_key(max_season(episodes)));

    GroupingState {
        sort_by: vec![(SortColumn::Season, true), (SortColumn::Episode, true)],
        group_by: SortColumn::Season,
        expanded,
    }
}

fn compare(a: &Episode, b: &Episode, sort_by: &[(SortColumn, bool)]) -> Ordering {
    for (column, descending) in sort_by {
        let ordering = match column {
            SortColumn::Season => a.season.cmp(&b.season),
            SortColumn::Episode => a.episode.cmp(&b.episode),
        };
        let ordering = if *descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// A season's worth of sorted episode rows.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonGroup {
    pub season: i64,
    pub key: String,
    pub expanded: bool,
    pub episodes: Vec<Episode>,
}

/// Materialize the grouped, sorted row view the table renders.
///
/// Groups appear in sort order; each group's episodes follow the full sort
/// sequence. Collapsed groups keep their episodes (for counts) but the
/// presenter skips their rows.
pub fn season_groups(episodes: &[Episode], state: &GroupingState) -> Vec<SeasonGroup> {
    let mut sorted: Vec<Episode> = episodes.to_vec();
    sorted.sort_by(|a, b| compare(a, b, &state.sort_by));

    let mut groups: Vec<SeasonGroup> = Vec::new();
    for episode in sorted {
        match groups.last_mut() {
            Some(group) if group.season == episode.season => group.episodes.push(episode),
            _ => {
                let key = group_key(episode.season);
                let expanded = state.is_expanded(&key);
                groups.push(SeasonGroup {
                    season: episode.season,
                    key,
                    expanded,
                    episodes: vec![episode],
                });
            }
        }
    }
    groups
}
