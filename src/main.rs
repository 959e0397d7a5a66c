//! Main entry point for the episub TUI application.

use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use episub::api::ApiClient;
use episub::config::Config;
use episub::router::{self, ActionKey};
use episub::tui::{Action, ActiveModal, App, draw, poll_event};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;

/// Command-line arguments for the episub application.
#[derive(Parser, Debug)]
#[command(
    name = "episub",
    version,
    about = "A TUI episode subtitle manager",
    long_about = "Browse the episodes of a series, see which subtitles are missing \
                  against its language profile, and search, download, and inspect \
                  subtitles from a Bazarr-compatible server."
)]
struct Args {
    /// Series to open (overrides the config default)
    #[arg(short, long)]
    series: Option<i64>,

    /// Base URL of the subtitle server (overrides config)
    #[arg(short, long)]
    url: Option<String>,

    /// API key for the subtitle server (overrides config)
    #[arg(short, long)]
    apikey: Option<String>,

    /// Show only present subtitles whose language is in the series profile
    #[arg(short, long)]
    only_desired: bool,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Fetch the series, its language profile, and its episodes into the app.
///
/// A failed profile fetch is not fatal: the table still renders, the
/// desired-language set stays empty, and manual search is gated on the
/// series having a profile assigned at all.
async fn load_series(client: &ApiClient, app: &mut App, series_id: i64) -> episub::error::Result<()> {
    let series = client.fetch_series(series_id).await?;

    let profile = match series.profile_id {
        Some(profile_id) => match client.fetch_profile(profile_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Failed to fetch language profile {}: {}", profile_id, e);
                None
            }
        },
        None => None,
    };

    app.set_series(series);
    app.set_profile(profile);

    let episodes = client.fetch_episodes(series_id).await?;
    info!("Loaded {} episodes for series {}", episodes.len(), series_id);
    app.set_episodes(episodes);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    let server_url = args.url.clone().unwrap_or_else(|| config.server_url.clone());
    let api_key = args.apikey.clone().unwrap_or_else(|| config.api_key.clone());
    let only_desired = args.only_desired || config.only_desired;

    let series_id = match args.series.or(config.series_id) {
        Some(id) => id,
        None => {
            eprintln!("Error: No series given. Pass --series <id> or set series_id in the config.");
            std::process::exit(1);
        }
    };

    let client = match ApiClient::new(&server_url, &api_key) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: Could not create API client: {}", e);
            std::process::exit(1);
        }
    };

    info!("Using server: {}", client.base_url());

    // Initialize terminal
    let mut terminal = init_terminal()?;

    // Create app state
    let mut app = App::new(only_desired);

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &client, series_id).await;

    // Restore terminal
    restore_terminal()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &ApiClient,
    series_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initial load before the first frame
    app.set_loading("Loading episodes...");
    terminal.draw(|f| draw(f, app))?;

    load_series(client, app, series_id).await?;

    loop {
        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Poll for events
        if let Some(event) = poll_event(Duration::from_millis(100))? {
            if let Event::Key(key) = event {
                let action = app.handle_input(key);

                // Clear any stale error before handling the new action
                if !matches!(action, Action::None) {
                    app.clear_error();
                }

                match action {
                    Action::Quit => break,
                    Action::Reload => {
                        app.status_message = None;
                        app.set_loading("Reloading episodes...");
                        terminal.draw(|f| draw(f, app))?;

                        if let Err(e) = load_series(client, app, series_id).await {
                            app.set_error(&e.to_string());
                            app.screen = episub::tui::Screen::EpisodeTable;
                        }
                    }
                    Action::Row(key) => {
                        if let Some(episode) = app.selected_episode() {
                            let request = router::route(&episode, key);
                            app.show_modal(request);
                            terminal.draw(|f| draw(f, app))?;

                            match key {
                                ActionKey::ManualSearch => {
                                    match client
                                        .search_subtitles(episode.series_id, episode.episode_id)
                                        .await
                                    {
                                        Ok(results) => app.set_search_results(results),
                                        Err(e) => {
                                            app.close_modal();
                                            app.set_error(&e.to_string());
                                        }
                                    }
                                }
                                ActionKey::History => {
                                    match client
                                        .fetch_episode_history(
                                            episode.series_id,
                                            episode.episode_id,
                                        )
                                        .await
                                    {
                                        Ok(entries) => app.set_history_entries(entries),
                                        Err(e) => {
                                            app.close_modal();
                                            app.set_error(&e.to_string());
                                        }
                                    }
                                }
                                // The tools modal works on already-fetched data
                                ActionKey::Tools => {}
                            }
                        }
                    }
                    Action::Download(i) => {
                        let picked = match &app.modal {
                            Some(ActiveModal::ManualSearch {
                                episode, results, ..
                            }) => results.get(i).map(|r| (episode.clone(), r.clone())),
                            _ => None,
                        };

                        if let Some((episode, result)) = picked {
                            app.set_status(&format!(
                                "Downloading {} from {}...",
                                result.language, result.provider
                            ));
                            terminal.draw(|f| draw(f, app))?;

                            match router::download(client, &episode, &result).await {
                                Ok(()) => {
                                    app.close_modal();
                                    app.set_status(&format!(
                                        "Downloaded {} subtitle for {}",
                                        result.language,
                                        episode.to_display()
                                    ));

                                    // Refresh so the badge flips from missing to valid
                                    match client.fetch_episodes(series_id).await {
                                        Ok(episodes) => app.set_episodes(episodes),
                                        Err(e) => {
                                            warn!("Refresh after download failed: {}", e)
                                        }
                                    }
                                }
                                Err(e) => {
                                    app.set_error(&e.to_string());
                                }
                            }
                        }
                    }
                    Action::None => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
