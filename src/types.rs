//! Type definitions for the episub application.
//!
//! This module contains the core data structures used throughout the
//! application for representing series, episodes, subtitles, and the
//! records returned by the subtitle manager API.

use serde::{Deserialize, Serialize};

/// A language with optional hearing-impaired/forced attributes.
///
/// Used both for episode audio tracks and for the resolved entries of a
/// language profile (the "desired" set).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LanguageItem {
    /// Two-letter language code (e.g., "en", "fr").
    #[serde(rename = "code2")]
    pub code: String,

    /// Display name of the language.
    pub name: String,

    /// Whether this entry targets hearing-impaired subtitles.
    #[serde(default, rename = "hi")]
    pub hearing_impaired: bool,

    /// Whether this entry targets forced subtitles.
    #[serde(default)]
    pub forced: bool,
}

/// A subtitle record attached to an episode.
///
/// Subtitles come in two logical kinds distinguished by which episode field
/// they live in: entries of `missing_subtitles` are wanted but not yet
/// downloaded, entries of `subtitles` are present on disk. A record never
/// appears in both lists.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Subtitle {
    /// Two-letter language code.
    #[serde(rename = "code2")]
    pub code: String,

    /// Display name of the language.
    pub name: String,

    /// Hearing-impaired variant flag.
    #[serde(default, rename = "hi")]
    pub hearing_impaired: bool,

    /// Forced variant flag.
    #[serde(default)]
    pub forced: bool,

    /// Provider that supplied this subtitle, if known.
    #[serde(default)]
    pub provider: Option<String>,

    /// Path of the subtitle file on disk, present only for downloaded
    /// subtitles.
    #[serde(default)]
    pub path: Option<String>,
}

impl Subtitle {
    /// Format the subtitle as a short badge for table cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use episub::types::Subtitle;
    ///
    /// let sub = Subtitle {
    ///     code: "en".to_string(),
    ///     name: "English".to_string(),
    ///     hearing_impaired: true,
    ///     forced: false,
    ///     provider: None,
    ///     path: None,
    /// };
    /// assert_eq!(sub.to_badge(), "en:hi");
    /// ```
    pub fn to_badge(&self) -> String {
        let mut badge = self.code.clone();
        if self.hearing_impaired {
            badge.push_str(":hi");
        }
        if self.forced {
            badge.push_str(":forced");
        }
        badge
    }
}

/// An episode of a series, as supplied by the fetch layer.
///
/// Treated as read-only input per render pass; the list is replaced
/// wholesale on refetch and never mutated in place.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Episode {
    /// Identifier of the series this episode belongs to.
    #[serde(rename = "sonarrSeriesId")]
    pub series_id: i64,

    /// Unique identifier of the episode.
    #[serde(rename = "sonarrEpisodeId")]
    pub episode_id: i64,

    /// Season number (non-negative).
    pub season: i64,

    /// Episode ordinal within the season.
    pub episode: i64,

    /// Episode title.
    pub title: String,

    /// Release scene name, when known.
    #[serde(default, rename = "sceneName")]
    pub scene_name: Option<String>,

    /// Whether the episode is monitored for subtitle acquisition.
    #[serde(default)]
    pub monitored: bool,

    /// Audio languages present in the media file.
    #[serde(default, rename = "audio_language")]
    pub audio_languages: Vec<LanguageItem>,

    /// Subtitle languages still wanted for this episode.
    #[serde(default)]
    pub missing_subtitles: Vec<Subtitle>,

    /// Subtitles already present on disk.
    #[serde(default)]
    pub subtitles: Vec<Subtitle>,
}

impl Episode {
    /// Format the episode for display in lists and modal titles.
    ///
    /// # Examples
    ///
    /// ```
    /// use episub::types::Episode;
    ///
    /// let ep = Episode {
    ///     series_id: 1,
    ///     episode_id: 10,
    ///     season: 2,
    ///     episode: 5,
    ///     title: "The Middle".to_string(),
    ///     scene_name: None,
    ///     monitored: true,
    ///     audio_languages: vec![],
    ///     missing_subtitles: vec![],
    ///     subtitles: vec![],
    /// };
    /// assert_eq!(ep.to_display(), "S02E05 - The Middle");
    /// ```
    pub fn to_display(&self) -> String {
        format!("S{:02}E{:02} - {}", self.season, self.episode, self.title)
    }
}

/// A series record with its assigned language profile reference.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Series {
    /// Unique identifier of the series.
    #[serde(rename = "sonarrSeriesId")]
    pub id: i64,

    /// Series title.
    pub title: String,

    /// Opaque reference to the assigned language profile, if any.
    /// Manual search is unavailable when no profile is assigned.
    #[serde(default, rename = "profileId")]
    pub profile_id: Option<i64>,
}

/// A manual-search result offered by a subtitle provider.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Two-letter language code of the offered subtitle.
    pub language: String,

    /// Hearing-impaired variant flag.
    #[serde(default, rename = "hearing_impaired")]
    pub hearing_impaired: bool,

    /// Forced variant flag.
    #[serde(default)]
    pub forced: bool,

    /// Name of the provider offering the subtitle.
    pub provider: String,

    /// Opaque provider payload identifying the subtitle to download.
    pub subtitle: String,

    /// Match score, when the provider reports one.
    #[serde(default)]
    pub score: Option<i64>,

    /// Release name the subtitle was made for.
    #[serde(default)]
    pub release: Option<String>,
}

impl SearchResult {
    /// Format the search result for display in the manual-search modal.
    ///
    /// # Examples
    ///
    /// ```
    /// use episub::types::SearchResult;
    ///
    /// let result = SearchResult {
    ///     language: "en".to_string(),
    ///     hearing_impaired: false,
    ///     forced: false,
    ///     provider: "opensubtitles".to_string(),
    ///     subtitle: "payload".to_string(),
    ///     score: Some(90),
    ///     release: Some("Show.S01E01.1080p".to_string()),
    /// };
    /// assert_eq!(result.to_display(), "[90] en  opensubtitles  Show.S01E01.1080p");
    /// ```
    pub fn to_display(&self) -> String {
        let score = match self.score {
            Some(s) => format!("[{}] ", s),
            None => String::new(),
        };
        let mut line = format!("{}{}  {}", score, self.language, self.provider);
        if let Some(release) = &self.release {
            line.push_str("  ");
            line.push_str(release);
        }
        line
    }
}

/// A single entry of an episode's subtitle history.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Human-readable timestamp of the event.
    pub timestamp: String,

    /// Description of what happened (e.g., "downloaded", "deleted").
    pub description: String,

    /// Provider involved, when applicable.
    #[serde(default)]
    pub provider: Option<String>,

    /// Language code involved, when applicable.
    #[serde(default)]
    pub language: Option<String>,
}

impl HistoryEntry {
    /// Format the history entry for display in the history modal.
    pub fn to_display(&self) -> String {
        let mut line = format!("{}  {}", self.timestamp, self.description);
        if let Some(lang) = &self.language {
            line.push_str(&format!(" [{}]", lang));
        }
        if let Some(provider) = &self.provider {
            line.push_str(&format!(" ({})", provider));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode() -> Episode {
        Episode {
            series_id: 7,
            episode_id: 42,
            season: 1,
            episode: 3,
            title: "Pilot's End".to_string(),
            scene_name: Some("show.s01e03.1080p-grp".to_string()),
            monitored: true,
            audio_languages: vec![],
            missing_subtitles: vec![],
            subtitles: vec![],
        }
    }

    #[test]
    fn test_episode_to_display() {
        assert_eq!(episode().to_display(), "S01E03 - Pilot's End");
    }

    #[test]
    fn test_episode_to_display_pads_numbers() {
        let mut ep = episode();
        ep.season = 12;
        ep.episode = 104;
        assert_eq!(ep.to_display(), "S12E104 - Pilot's End");
    }

    #[test]
    fn test_subtitle_badge_plain() {
        let sub = Subtitle {
            code: "fr".to_string(),
            name: "French".to_string(),
            hearing_impaired: false,
            forced: false,
            provider: None,
            path: None,
        };
        assert_eq!(sub.to_badge(), "fr");
    }

    #[test]
    fn test_subtitle_badge_forced() {
        let sub = Subtitle {
            code: "en".to_string(),
            name: "English".to_string(),
            hearing_impaired: false,
            forced: true,
            provider: None,
            path: None,
        };
        assert_eq!(sub.to_badge(), "en:forced");
    }

    #[test]
    fn test_search_result_display_without_score() {
        let result = SearchResult {
            language: "de".to_string(),
            hearing_impaired: false,
            forced: false,
            provider: "podnapisi".to_string(),
            subtitle: "x".to_string(),
            score: None,
            release: None,
        };
        assert_eq!(result.to_display(), "de  podnapisi");
    }

    #[test]
    fn test_history_entry_display() {
        let entry = HistoryEntry {
            timestamp: "2 hours ago".to_string(),
            description: "downloaded".to_string(),
            provider: Some("opensubtitles".to_string()),
            language: Some("en".to_string()),
        };
        assert_eq!(
            entry.to_display(),
            "2 hours ago  downloaded [en] (opensubtitles)"
        );
    }

    #[test]
    fn test_episode_deserializes_api_field_names() {
        let json = r#"{
            "sonarrSeriesId": 1,
            "sonarrEpisodeId": 2,
            "season": 3,
            "episode": 4,
            "title": "T",
            "sceneName": "scene",
            "monitored": true,
            "audio_language": [{"code2": "en", "name": "English"}],
            "missing_subtitles": [{"code2": "fr", "name": "French"}],
            "subtitles": [{"code2": "en", "name": "English", "path": "/s.srt"}]
        }"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.series_id, 1);
        assert_eq!(ep.episode_id, 2);
        assert_eq!(ep.audio_languages.len(), 1);
        assert_eq!(ep.missing_subtitles[0].code, "fr");
        assert_eq!(ep.subtitles[0].path.as_deref(), Some("/s.srt"));
    }
}
