use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cleanly::api::{BackendClient, CleaningApi};
use cleanly::models::Config;
use cleanly::session::{Session, SessionStore};
use cleanly::ui::components::{display_value, format_price, format_start, humanize_key};

/// Terminal client for the cleaning-service booking backend
#[derive(Parser)]
#[command(name = "cleanly")]
#[command(version)]
#[command(about = "Book cleanings, track jobs and manage the service catalog from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal client (default)
    Tui,
    /// Print the aggregate metrics
    Metrics,
    /// Print the service catalog
    Services,
    /// Print the bookings of the stored identity
    Bookings {
        /// List jobs assigned to the stored id as a cleaner
        #[arg(long)]
        cleaner: bool,
    },
    /// Print the stored identity
    Whoami,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cleanly=info"))
}

/// Logs go to a file while the terminal is owned by the UI
fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            init_file_logging(&config.log_path)?;
            info!("Starting cleanly against {}", config.backend_url);
            if let Err(e) = cleanly::ui::run_app_async(config).await {
                error!("TUI error: {:#}", e);
                eprintln!("❌ TUI Error: {:#}", e);
                std::process::exit(1);
            }
        }
        command => {
            init_stderr_logging();
            run_headless(command, &config).await?;
        }
    }

    Ok(())
}

async fn run_headless(command: Command, config: &Config) -> Result<()> {
    let client = BackendClient::new(config).context("Failed to build backend client")?;
    let session = Session::open(SessionStore::new(config.session_path.clone()))
        .with_context(|| format!("Failed to read session file {}", config.session_path.display()))?;

    match command {
        Command::Metrics => {
            let metrics = client.admin_metrics().await.context("Failed to load metrics")?;
            println!("📊 Metrics ({})", config.backend_url);
            for (key, value) in &metrics {
                println!("  {}: {}", humanize_key(key), display_value(value));
            }
        }
        Command::Services => {
            let services = client.list_services().await.context("Failed to load services")?;
            println!("🧹 {} service(s)", services.len());
            for service in services {
                let state = if service.is_active { "" } else { " (inactive)" };
                println!("  {:<12} {} ${}{}", service.name, service.display_name, service.base_price, state);
            }
        }
        Command::Bookings { cleaner } => {
            let id = session.user_id();
            let bookings = if cleaner {
                client.cleaner_bookings(id).await
            } else {
                client.customer_bookings(id).await
            }
            .context("Failed to load bookings")?;

            println!("📋 {} booking(s) for {}", bookings.len(), id);
            for booking in bookings {
                println!(
                    "  {} · {} · {} · ${}",
                    booking.service_type,
                    format_start(booking.scheduled_start.as_deref()),
                    booking.status,
                    format_price(booking.price_estimate)
                );
            }
        }
        Command::Whoami => {
            let identity = session.identity();
            println!("👤 {} ({})", identity.principal.id(), identity.role);
        }
        Command::Tui => anyhow::bail!("tui is not a headless command"),
    }

    Ok(())
}
