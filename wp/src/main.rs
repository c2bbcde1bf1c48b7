//! Waypoint - terminal client for the AI travel-agent service
//!
//! CLI entry point: launches the TUI by default, with batch subcommands for
//! history, bookings, and a service health check.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use waypoint::api::{self, BookingsQuery, HistoryQuery, TravelApi};
use waypoint::cli::{Cli, Command, OutputFormat};
use waypoint::config::Config;
use waypoint::domain::{BookingStatus, SearchStatus};
use waypoint::history::PageState;
use waypoint::tui;

/// Log file location under the user data directory
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("waypoint")
        .join("logs")
}

/// Set up file-based logging (the terminal belongs to the TUI)
fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = log_dir();
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = match level_str.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("waypoint.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Waypoint loaded config: base-url={}", config.api.base_url);

    let client = api::create_client(&config.api).context("Failed to create agent service client")?;

    debug!(has_command = cli.command.is_some(), "main: dispatching");
    match cli.command {
        None => {
            debug!("main: no command specified, launching TUI");
            tui::run(&config, client).await
        }
        Some(Command::History {
            limit,
            offset,
            origin,
            destination,
            status,
            format,
        }) => cmd_history(client.as_ref(), limit, offset, origin, destination, status, format).await,
        Some(Command::Bookings {
            limit,
            offset,
            status,
            format,
        }) => cmd_bookings(client.as_ref(), limit, offset, status, format).await,
        Some(Command::Health) => cmd_health(client.as_ref()).await,
    }
}

/// List past flight searches
async fn cmd_history(
    api: &dyn TravelApi,
    limit: u32,
    offset: u32,
    origin: Option<String>,
    destination: Option<String>,
    status: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    debug!(limit, offset, "cmd_history: called");
    let status = match status.as_deref() {
        None => None,
        Some("success") => Some(SearchStatus::Success),
        Some("error") => Some(SearchStatus::Error),
        Some(other) => {
            eprintln!("Invalid status '{}'. Valid: success, error", other);
            return Ok(());
        }
    };

    let query = HistoryQuery {
        limit,
        offset,
        origin,
        destination,
        status,
    };
    let page = api.search_history(query).await.context("Failed to fetch history")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "items": page.items, "total": page.total });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if page.items.is_empty() {
                println!("No searches found");
            } else {
                println!(
                    "{:<24} {:<14} {:<5} {:<10} {:<9} {:<8}",
                    "ROUTE", "DEPARTURE", "PAX", "CABIN", "STATUS", "RESULTS"
                );
                println!("{}", "-".repeat(76));
                for item in &page.items {
                    println!(
                        "{:<24} {:<14} {:<5} {:<10} {:<9} {:<8}",
                        format!("{} -> {}", item.origin, item.destination),
                        item.departure_date,
                        item.passengers,
                        item.cabin_class,
                        item.search_status,
                        item.result_count
                    );
                }
            }
            println!();
            println!("{}", page_state(limit, offset, page.total).label());
        }
    }

    Ok(())
}

/// List bookings
async fn cmd_bookings(
    api: &dyn TravelApi,
    limit: u32,
    offset: u32,
    status: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    debug!(limit, offset, "cmd_bookings: called");
    let status = match status.as_deref() {
        None => None,
        Some("confirmed") => Some(BookingStatus::Confirmed),
        Some("cancelled") => Some(BookingStatus::Cancelled),
        Some("pending") => Some(BookingStatus::Pending),
        Some(other) => {
            eprintln!("Invalid status '{}'. Valid: confirmed, cancelled, pending", other);
            return Ok(());
        }
    };

    let query = BookingsQuery { limit, offset, status };
    let page = api.bookings(query).await.context("Failed to fetch bookings")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "items": page.items, "total": page.total });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if page.items.is_empty() {
                println!("No bookings found");
            } else {
                println!(
                    "{:<22} {:<16} {:<22} {:<10} {:<12} {:<12}",
                    "BOOKING", "TYPE", "PASSENGER", "STATUS", "AMOUNT", "CONFIRMATION"
                );
                println!("{}", "-".repeat(100));
                for item in &page.items {
                    println!(
                        "{:<22} {:<16} {:<22} {:<10} {:<12} {:<12}",
                        item.booking_id,
                        item.booking_type,
                        item.passenger_name,
                        item.status,
                        format!("{:.0} {}", item.total_amount, item.currency),
                        item.confirmation_code
                    );
                }
            }
            println!();
            println!("{}", page_state(limit, offset, page.total).label());
        }
    }

    Ok(())
}

/// Check service liveness
async fn cmd_health(api: &dyn TravelApi) -> Result<()> {
    debug!("cmd_health: called");
    match api.health().await {
        Ok(health) => {
            println!("Service: {}", health.status);
            if !health.message.is_empty() {
                println!("{}", health.message);
            }
        }
        Err(e) => {
            println!("Service unreachable: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn page_state(limit: u32, offset: u32, total: u32) -> PageState {
    let mut page = PageState::new(limit);
    page.offset = offset;
    page.total = total;
    page
}
