//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
};

use crate::reconcile::{ActionableSubtitle, reconcile};
use crate::types::Episode;

use super::state::App;
use super::types::{ActiveModal, Screen, TableRow};

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Loading => draw_loading(frame, app, chunks[1]),
        Screen::EpisodeTable => draw_episode_table(frame, app, chunks[1]),
    }

    draw_footer(frame, app, chunks[2]);

    // Modal overlays sit above the table
    if app.modal.is_some() {
        draw_modal(frame, app);
    }

    if let Some(error) = app.error_message.clone() {
        draw_error_popup(frame, &error);
    }

    if app.show_help {
        draw_help_modal(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "episub",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];

    if let Some(series) = &app.series {
        spans.push(Span::styled(
            series.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }

    if let Some(profile) = &app.profile {
        spans.push(Span::styled(
            format!("[{}]", profile.name),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw("  "));
    }

    if app.filter_active() {
        spans.push(Span::styled(
            "[only desired]",
            Style::default().fg(Color::Yellow),
        ));
    }

    let header =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn subtitle_spans(entries: &[ActionableSubtitle]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for entry in entries {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        if entry.is_missing() {
            spans.push(Span::styled(
                format!("!{}", entry.subtitle.to_badge()),
                Style::default().fg(Color::Red),
            ));
        } else {
            spans.push(Span::styled(
                entry.subtitle.to_badge(),
                Style::default().fg(Color::Green),
            ));
        }
    }
    spans
}

fn audio_badges(episode: &Episode) -> String {
    episode
        .audio_languages
        .iter()
        .map(|lang| lang.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn draw_episode_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(area);

    let visible = app.visible_rows();
    let filter_active = app.filter_active();

    let rows: Vec<Row> = visible
        .iter()
        .map(|row| match row {
            TableRow::Group {
                season,
                expanded,
                episode_count,
                ..
            } => {
                let arrow = if *expanded { "▾" } else { "▸" };
                let label = format!(
                    "{} Season {}  ({} episodes)",
                    arrow, season, episode_count
                );
                Row::new(vec![
                    Cell::from(""),
                    Cell::from(""),
                    Cell::from(label),
                    Cell::from(""),
                    Cell::from(""),
                ])
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            }
            TableRow::Episode(episode) => {
                let marker = if episode.monitored { "●" } else { "○" };
                let entries = reconcile(episode, &app.desired, filter_active);
                Row::new(vec![
                    Cell::from(marker),
                    Cell::from(format!("E{:02}", episode.episode)),
                    Cell::from(episode.title.clone()),
                    Cell::from(audio_badges(episode)),
                    Cell::from(Line::from(subtitle_spans(&entries))),
                ])
            }
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(5),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(30),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Ep", "Title", "Audio", "Subtitles"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Episodes"))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    if visible.is_empty() {
        let empty = Paragraph::new("No episodes found for this series")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Episodes"));
        frame.render_widget(empty, chunks[0]);
    } else {
        frame.render_stateful_widget(table, chunks[0], &mut app.table_state);
    }

    draw_detail_pane(frame, app, chunks[1]);
}

fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let detail = match app.selected_row() {
        Some(TableRow::Episode(episode)) => {
            let entries = reconcile(&episode, &app.desired, app.filter_active());
            let missing = entries.iter().filter(|e| e.is_missing()).count();

            let mut lines = vec![episode.to_display()];
            if let Some(scene) = &episode.scene_name {
                lines.push(format!("Scene: {}", scene));
            }
            lines.push(format!(
                "Subtitles: {} present, {} missing",
                entries.len() - missing,
                missing
            ));
            for entry in &entries {
                let kind = if entry.is_missing() { "missing" } else { "valid" };
                let mut line = format!("  {}  {}", entry.subtitle.to_badge(), kind);
                if let Some(path) = &entry.subtitle.path {
                    line.push_str("  ");
                    line.push_str(path);
                }
                lines.push(line);
            }
            lines.join("\n")
        }
        Some(TableRow::Group {
            season,
            episode_count,
            expanded,
            ..
        }) => {
            let hint = if expanded { "collapse" } else { "expand" };
            format!(
                "Season {}  ({} episodes)\n\nPress Enter to {}",
                season, episode_count, hint
            )
        }
        None => String::new(),
    };

    let widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true });

    frame.render_widget(widget, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.modal.is_some() {
        match app.modal {
            Some(ActiveModal::ManualSearch { .. }) => {
                "[↑↓] navigate  [Enter] download  [Esc] close  [?] help"
            }
            _ => "[↑↓] navigate  [Esc] close  [?] help",
        }
    } else if let Some(status) = &app.status_message {
        return frame.render_widget(
            Paragraph::new(status.as_str())
                .style(Style::default().fg(Color::Green))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    } else {
        match app.screen {
            Screen::EpisodeTable => {
                "[↑↓] navigate  [Enter] expand  [m] search  [h] history  [t] tools  [o] desired  [r] reload  [?] help  [q] quit"
            }
            Screen::Loading => "[?] help  [q] quit",
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let loading = Paragraph::new(app.loading_message.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"));

    frame.render_widget(loading, area);
}

fn draw_modal(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    match &mut app.modal {
        Some(ActiveModal::ManualSearch {
            episode,
            results,
            list_state,
            loading,
        }) => {
            let title = format!("Manual Search - {}", episode.to_display());
            if *loading {
                let waiting = Paragraph::new("Searching providers...")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL).title(title));
                frame.render_widget(waiting, area);
            } else if results.is_empty() {
                let empty = Paragraph::new("No subtitles found")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL).title(title));
                frame.render_widget(empty, area);
            } else {
                let items: Vec<ListItem> = results
                    .iter()
                    .map(|r| ListItem::new(r.to_display()))
                    .collect();
                let list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .highlight_style(
                        Style::default()
                            .bg(Color::DarkGray)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, area, list_state);
            }
        }
        Some(ActiveModal::History {
            episode,
            entries,
            list_state,
            loading,
        }) => {
            let title = format!("History - {}", episode.to_display());
            if *loading {
                let waiting = Paragraph::new("Loading history...")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL).title(title));
                frame.render_widget(waiting, area);
            } else if entries.is_empty() {
                let empty = Paragraph::new("No history for this episode")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL).title(title));
                frame.render_widget(empty, area);
            } else {
                let items: Vec<ListItem> = entries
                    .iter()
                    .map(|e| ListItem::new(e.to_display()))
                    .collect();
                let list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .highlight_style(Style::default().bg(Color::DarkGray))
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, area, list_state);
            }
        }
        Some(ActiveModal::Tools {
            episodes,
            list_state,
        }) => {
            let title = format!(
                "Subtitle Tools - {} episode{}",
                episodes.len(),
                if episodes.len() == 1 { "" } else { "s" }
            );
            let items: Vec<ListItem> = episodes
                .iter()
                .flat_map(|ep| {
                    ep.subtitles.iter().map(|sub| {
                        let path = sub.path.as_deref().unwrap_or("-");
                        ListItem::new(format!(
                            "{}  {}  {}",
                            ep.to_display(),
                            sub.to_badge(),
                            path
                        ))
                    })
                })
                .collect();

            if items.is_empty() {
                let empty = Paragraph::new("No downloaded subtitles to operate on")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL).title(title));
                frame.render_widget(empty, area);
            } else {
                let list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .highlight_style(Style::default().bg(Color::DarkGray))
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, area, list_state);
            }
        }
        None => {}
    }
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let content = "\
Episode Table
─────────────
  j / ↓       Move down
  k / ↑       Move up
  Enter       Expand/collapse season group
  m           Manual subtitle search
  h           Episode subtitle history
  t           Bulk subtitle tools
  o           Toggle only-desired filter
  r           Reload episode list
  q           Quit

Modals
──────
  j / ↓ k / ↑ Navigate
  Enter       Download selected result (manual search)
  Esc / q     Close

Global
──────
  ?           Show/hide this help
  Ctrl+C      Force quit

Press ? to close";

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
