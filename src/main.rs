//! Notekeeper Bot — supervisor entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Open the note store and build the notes service
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run comms channels until shutdown
//!   8. Cancel token + exit

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use notekeeper_bot::config::{self, StoreKind};
use notekeeper_bot::error::AppError;
use notekeeper_bot::logger;
use notekeeper_bot::subsystems::comms;
use notekeeper_bot::subsystems::notes::NotesService;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    let _log_guard = logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        bot_name = %config.bot_name,
        work_dir = %config.work_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let notes = Arc::new(NotesService::from_config(&config)?);

    // Shared shutdown token — Ctrl-C cancels it, all channels watch it.
    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    print_startup_summary(&config);

    let channels = comms::start(&config, notes, shutdown.clone());
    channels.join().await?;

    shutdown.cancel();
    info!("all channels stopped — bye");

    Ok(())
}

fn print_startup_summary(config: &config::Config) {
    let store_line = match config.notes.store {
        StoreKind::Sqlite => format!("sqlite {}", config.notes.db_path.display()),
        StoreKind::Memory => "memory (not persisted)".to_string(),
    };
    let enabled = |on: bool| if on { "enabled" } else { "disabled" };

    println!("── Notekeeper ─────────────────────────────");
    println!(" bot:        {}", config.bot_name);
    println!(" pid:        {}", std::process::id());
    println!(" store:      {store_line}");
    println!(" users:      {}", config.authorized_users.len());
    println!(" pty:        {}", enabled(config.comms_pty_should_load()));
    println!(" telegram:   {}", enabled(config.comms_telegram_should_load()));
    println!("────────────────────────────────────────────");
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: notekeeper-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug
    //   -vvvv+  → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
