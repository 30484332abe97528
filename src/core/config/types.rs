//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs that subsystems consume.
//! Raw TOML deserialization types live in `raw.rs`.

use std::collections::BTreeSet;
use std::path::PathBuf;

// ── Comms ───────────────────────────────────────────────────────────────────

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Whether the PTY channel is explicitly enabled.
    pub enabled: bool,
    /// Sender identity attached to every console line.
    pub identity: String,
}

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Whether the Telegram channel is explicitly enabled.
    pub enabled: bool,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub telegram: TelegramConfig,
}

// ── Notes ───────────────────────────────────────────────────────────────────

/// Which [`NoteStore`](crate::subsystems::notes::NoteStore) backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// SQLite file under `work_dir`.
    Sqlite,
    /// Process memory only; notes vanish on exit.
    Memory,
}

/// Notes subsystem configuration.
#[derive(Debug, Clone)]
pub struct NotesConfig {
    pub store: StoreKind,
    /// Absolute path of the SQLite database (already joined with `work_dir`).
    pub db_path: PathBuf,
}

// ── Top-level ───────────────────────────────────────────────────────────────

/// Fully-resolved supervisor configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    /// Working directory for all persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Append log output to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    pub comms: CommsConfig,
    pub notes: NotesConfig,
    /// Handles allowed to use the bot, without a leading `@`.
    pub authorized_users: BTreeSet<String>,
}

impl Config {
    /// Returns `true` if the PTY channel should be loaded.
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    /// Returns `true` if the Telegram channel should be loaded.
    pub fn comms_telegram_should_load(&self) -> bool {
        self.comms.telegram.enabled
    }
}
