//! Subtitle reconciliation.
//!
//! Turns an episode's raw subtitle lists plus the desired-language set into
//! the ordered list of actionable entries the table renders: wanted-but-
//! missing subtitles first, then the present ones, optionally filtered down
//! to desired languages.

use crate::types::{Episode, LanguageItem, Subtitle};

/// Whether an actionable subtitle is still missing or already on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtitleKind {
    Missing,
    Valid,
}

impl SubtitleKind {
    /// Stable tag used in render keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleKind::Missing => "missing",
            SubtitleKind::Valid => "valid",
        }
    }
}

/// One entry of the reconciled subtitle list for an episode row.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionableSubtitle {
    /// Stable key for re-rendering; duplicates of the same language and
    /// kind are disambiguated by index, not by content.
    pub key: String,
    pub kind: SubtitleKind,
    pub subtitle: Subtitle,
}

impl ActionableSubtitle {
    /// True for entries that still need a download.
    pub fn is_missing(&self) -> bool {
        self.kind == SubtitleKind::Missing
    }
}

/// Build the stable render key for a reconciled entry.
pub fn build_key(index: usize, code: &str, kind: SubtitleKind) -> String {
    format!("{}-{}-{}", index, code, kind.as_str())
}

fn is_desired(subtitle: &Subtitle, desired: &[LanguageItem]) -> bool {
    // Language code only; hearing-impaired/forced attributes are not matched.
    desired.iter().any(|item| item.code == subtitle.code)
}

/// Reconcile an episode's subtitles against the desired-language set.
///
/// Missing entries come first in their original order, then the present
/// ones. With `only_desired` set, present entries are filtered to languages
/// in `desired`; an empty desired set then yields no present entries, so
/// callers without a filtering criterion should pass `only_desired = false`
/// (see [`crate::profile::ProfileResolver::resolve`]).
///
/// Total over well-formed input; an episode with no subtitles yields an
/// empty list.
pub fn reconcile(
    episode: &Episode,
    desired: &[LanguageItem],
    only_desired: bool,
) -> Vec<ActionableSubtitle> {
    let mut entries =
        Vec::with_capacity(episode.missing_subtitles.len() + episode.subtitles.len());

    for (index, subtitle) in episode.missing_subtitles.iter().enumerate() {
        entries.push(ActionableSubtitle {
            key: build_key(index, &subtitle.code, SubtitleKind::Missing),
            kind: SubtitleKind::Missing,
            subtitle: subtitle.clone(),
        });
    }

    let present = episode
        .subtitles
        .iter()
        .filter(|subtitle| !only_desired || is_desired(subtitle, desired));

    for (index, subtitle) in present.enumerate() {
        entries.push(ActionableSubtitle {
            key: build_key(index, &subtitle.code, SubtitleKind::Valid),
            kind: SubtitleKind::Valid,
            subtitle: subtitle.clone(),
        });
    }

    entries
}
