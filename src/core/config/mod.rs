//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `NOTEKEEPER_*` env overrides.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs consumed by subsystems
//!   (`Config`, `NotesConfig`, `CommsConfig`, etc.).
//! - **raw** — Raw TOML deserialization types (`RawConfig`, `RawNotes`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load** — Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`, `parse_user_list`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from, parse_user_list};
pub use types::*;

impl Config {
    /// Safe `Config` for tests — in-memory store, console channel only.
    pub fn test_default(work_dir: &std::path::Path) -> Self {
        Self {
            bot_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            log_file: None,
            comms: CommsConfig {
                pty: PtyConfig { enabled: true, identity: raw::default_pty_identity() },
                telegram: TelegramConfig { enabled: false },
            },
            notes: NotesConfig {
                store: StoreKind::Memory,
                db_path: work_dir.join(raw::default_db_file()),
            },
            authorized_users: std::collections::BTreeSet::from(["alice".to_string()]),
        }
    }
}
