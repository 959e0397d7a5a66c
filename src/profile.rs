//! Language profile resolution.
//!
//! A series references a language profile by id; the profile carries the
//! ordered set of languages the user wants subtitles in. This module turns
//! that opaque reference into the concrete desired-language set used by the
//! reconciler, memoizing on profile identity so repeated render passes do
//! not recompute it.

use crate::types::LanguageItem;
use serde::Deserialize;

/// A single accepted language inside a profile.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ProfileItem {
    /// Item id within the profile.
    pub id: i64,

    /// Two-letter language code.
    #[serde(rename = "language")]
    pub code: String,

    /// Display name, when the server supplies one.
    #[serde(default)]
    pub name: Option<String>,

    /// Hearing-impaired requirement flag.
    #[serde(default, rename = "hi")]
    pub hearing_impaired: bool,

    /// Forced requirement flag.
    #[serde(default)]
    pub forced: bool,
}

/// A named, ordered set of accepted subtitle languages.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LanguageProfile {
    /// Unique identifier of the profile.
    #[serde(rename = "profileId")]
    pub profile_id: i64,

    /// Profile display name.
    pub name: String,

    /// Accepted languages, in priority order.
    pub items: Vec<ProfileItem>,
}

/// Resolve a profile into its ordered language items.
///
/// Pure function of the profile contents; item order is preserved.
pub fn resolve_items(profile: &LanguageProfile) -> Vec<LanguageItem> {
    profile
        .items
        .iter()
        .map(|item| LanguageItem {
            code: item.code.clone(),
            name: item.name.clone().unwrap_or_else(|| item.code.clone()),
            hearing_impaired: item.hearing_impaired,
            forced: item.forced,
        })
        .collect()
}

/// Memoizing resolver for language profiles.
///
/// Keeps the last resolved `(profile_id, items)` pair so that resolving the
/// same profile across consecutive render passes is free. An absent profile
/// resolves to the empty set; callers must treat that as "no filtering
/// criterion available" rather than "hide everything".
#[derive(Debug, Default)]
pub struct ProfileResolver {
    cached: Option<(i64, Vec<LanguageItem>)>,
}

impl ProfileResolver {
    /// Create a resolver with an empty cache.
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Resolve a profile reference into the desired-language set.
    pub fn resolve(&mut self, profile: Option<&LanguageProfile>) -> &[LanguageItem] {
        let Some(profile) = profile else {
            return &[];
        };

        let hit = matches!(&self.cached, Some((id, _)) if *id == profile.profile_id);
        if !hit {
            self.cached = Some((profile.profile_id, resolve_items(profile)));
        }

        self.cached
            .as_ref()
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64, codes: &[&str]) -> LanguageProfile {
        LanguageProfile {
            profile_id: id,
            name: format!("profile-{}", id),
            items: codes
                .iter()
                .enumerate()
                .map(|(i, code)| ProfileItem {
                    id: i as i64,
                    code: code.to_string(),
                    name: None,
                    hearing_impaired: false,
                    forced: false,
                })
                .collect(),
        }
    }

    #[test]
    fn test_resolve_none_is_empty() {
        let mut resolver = ProfileResolver::new();
        assert!(resolver.resolve(None).is_empty());
    }

    #[test]
    fn test_resolve_preserves_order() {
        let mut resolver = ProfileResolver::new();
        let p = profile(1, &["en", "fr", "de"]);
        let items = resolver.resolve(Some(&p));
        let codes: Vec<&str> = items.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "fr", "de"]);
    }

    #[test]
    fn test_resolve_falls_back_to_code_for_name() {
        let mut resolver = ProfileResolver::new();
        let p = profile(1, &["en"]);
        assert_eq!(resolver.resolve(Some(&p))[0].name, "en");
    }

    #[test]
    fn test_resolve_memoizes_on_profile_id() {
        let mut resolver = ProfileResolver::new();
        let p = profile(1, &["en"]);
        resolver.resolve(Some(&p));

        // Same id with mutated contents returns the cached resolution.
        let mut stale = p.clone();
        stale.items.push(ProfileItem {
            id: 9,
            code: "fr".to_string(),
            name: None,
            hearing_impaired: false,
            forced: false,
        });
        assert_eq!(resolver.resolve(Some(&stale)).len(), 1);
    }

    #[test]
    fn test_resolve_recomputes_on_new_profile_id() {
        let mut resolver = ProfileResolver::new();
        resolver.resolve(Some(&profile(1, &["en"])));
        let items = resolver.resolve(Some(&profile(2, &["fr", "de"])));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].code, "fr");
    }

    #[test]
    fn test_resolve_items_carries_flags() {
        let p = LanguageProfile {
            profile_id: 3,
            name: "hi".to_string(),
            items: vec![ProfileItem {
                id: 0,
                code: "en".to_string(),
                name: Some("English".to_string()),
                hearing_impaired: true,
                forced: false,
            }],
        };
        let items = resolve_items(&p);
        assert!(items[0].hearing_impaired);
        assert_eq!(items[0].name, "English");
    }
}
