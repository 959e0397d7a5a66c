//! A terminal episode-subtitle manager written in Rust.
//!
//! episub is a TUI front end for a Bazarr-style subtitle server. It shows
//! the episodes of a series grouped by season, reconciles each episode's
//! missing and downloaded subtitles against the series language profile,
//! and drives the per-row workflows: manual provider search, subtitle
//! history, and bulk subtitle tools.
//!
//! # Features
//!
//! - Season-grouped episode table with collapsible groups
//! - Missing/valid subtitle badges per episode
//! - Language-profile aware filtering of present subtitles
//! - Manual subtitle search with one-key download
//! - Per-episode subtitle history
//!
//! # Usage
//!
//! ```bash
//! # Open the episode table for series 42
//! cargo run -- --series 42
//!
//! # Point at a remote server
//! cargo run -- --series 42 --url http://bazarr.local:6767 --apikey SECRET
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod profile;
pub mod reconcile;
pub mod router;
pub mod table;
pub mod tui;
pub mod types;
