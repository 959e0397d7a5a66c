//! Terminal User Interface for episub using ratatui.
//!
//! This module provides a full-screen TUI with a grouped season/episode
//! table and modal overlays for the row workflows.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::App;
pub use types::{Action, ActiveModal, Screen, TableRow};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
