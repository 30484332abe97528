//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub supervisor: RawSupervisor,
    #[serde(default)]
    pub comms: RawComms,
    #[serde(default)]
    pub notes: RawNotes,
    #[serde(default)]
    pub auth: RawAuth,
}

#[derive(Deserialize)]
pub(super) struct RawSupervisor {
    pub bot_name: String,
    pub work_dir: String,
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

// ── Comms ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawComms {
    #[serde(default)]
    pub pty: RawPty,
    #[serde(default)]
    pub telegram: RawTelegram,
}

#[derive(Deserialize)]
pub(super) struct RawPty {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_pty_identity")]
    pub identity: String,
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true, identity: default_pty_identity() }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawTelegram {
    /// Defaults to `false`: Telegram must be explicitly enabled.
    #[serde(default)]
    pub enabled: bool,
}

// ── Notes ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawNotes {
    /// `"sqlite"` or `"memory"`.
    #[serde(default = "default_store")]
    pub store: String,
    /// Relative to `work_dir` unless absolute.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for RawNotes {
    fn default() -> Self {
        Self { store: default_store(), db_file: default_db_file() }
    }
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawAuth {
    #[serde(default)]
    pub authorized_users: Vec<String>,
}

// ── Defaults ────────────────────────────────────────────────────────────────

pub(super) fn default_pty_identity() -> String {
    "console".to_string()
}

pub(super) fn default_store() -> String {
    "sqlite".to_string()
}

pub(super) fn default_db_file() -> String {
    "notes.db".to_string()
}

fn default_true() -> bool {
    true
}
