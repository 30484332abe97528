//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `NOTEKEEPER_WORK_DIR`, `NOTEKEEPER_LOG_LEVEL` and
//! `NOTEKEEPER_AUTHORIZED_USERS` env overrides.

use std::collections::{BTreeSet, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::{self, RawConfig};
use super::types::*;

/// Deep-merge two TOML values.
/// Tables are merged recursively — the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env-var overrides.
/// If no path is given and `config/default.toml` does not exist, returns a hardcoded minimal default.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let work_dir_override = env::var("NOTEKEEPER_WORK_DIR").ok();
    let log_level_override = env::var("NOTEKEEPER_LOG_LEVEL").ok();
    let users_override = env::var("NOTEKEEPER_AUTHORIZED_USERS").ok();

    if let Some(path) = config_path {
        return load_from(
            Path::new(path),
            work_dir_override.as_deref(),
            log_level_override.as_deref(),
            users_override.as_deref(),
        );
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(
            default_path,
            work_dir_override.as_deref(),
            log_level_override.as_deref(),
            users_override.as_deref(),
        )
    } else {
        // Hardcoded minimal default
        let work_dir_str = work_dir_override.unwrap_or_else(|| "~/.notekeeper".to_string());
        let work_dir = expand_home(&work_dir_str);
        let log_level = log_level_override.unwrap_or_else(|| "info".to_string());
        let db_path = work_dir.join(raw::default_db_file());

        Ok(Config {
            bot_name: "notekeeper".to_string(),
            work_dir,
            log_level,
            log_file: None,
            comms: CommsConfig {
                pty: PtyConfig { enabled: true, identity: raw::default_pty_identity() },
                telegram: TelegramConfig { enabled: false },
            },
            notes: NotesConfig { store: StoreKind::Sqlite, db_path },
            authorized_users: users_override
                .as_deref()
                .map(parse_user_list)
                .unwrap_or_default(),
        })
    }
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
/// Follows `[meta] base = "..."` inheritance chains before resolving.
pub fn load_from(
    path: &Path,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
    users_override: Option<&str>,
) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val)
        .map_err(|e: toml::de::Error| {
            AppError::Config(format!("config error in {}: {e}", path.display()))
        })?;

    let s = parsed.supervisor;

    let work_dir_str = work_dir_override.unwrap_or(&s.work_dir).to_string();
    let work_dir = expand_home(&work_dir_str);
    let log_level = log_level_override.unwrap_or(&s.log_level).to_string();
    let log_file = s.log_file.map(|f| resolve_in(&work_dir, &f));

    let store = match parsed.notes.store.as_str() {
        "sqlite" => StoreKind::Sqlite,
        "memory" => StoreKind::Memory,
        other => {
            return Err(AppError::Config(format!(
                "unknown notes store '{other}' in {} (expected \"sqlite\" or \"memory\")",
                path.display()
            )));
        }
    };
    let db_path = resolve_in(&work_dir, &parsed.notes.db_file);

    let authorized_users = match users_override {
        Some(list) => parse_user_list(list),
        None => parsed
            .auth
            .authorized_users
            .iter()
            .filter_map(|u| normalize_handle(u))
            .collect(),
    };

    Ok(Config {
        bot_name: s.bot_name,
        work_dir,
        log_level,
        log_file,
        comms: CommsConfig {
            pty: PtyConfig {
                enabled: parsed.comms.pty.enabled,
                identity: parsed.comms.pty.identity,
            },
            telegram: TelegramConfig {
                enabled: parsed.comms.telegram.enabled,
            },
        },
        notes: NotesConfig { store, db_path },
        authorized_users,
    })
}

/// Parse a comma- or whitespace-separated handle list, e.g. `"alice, @bob carol"`.
pub fn parse_user_list(list: &str) -> BTreeSet<String> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(normalize_handle)
        .collect()
}

/// Trim and drop a leading `@`. Empty handles yield `None`.
fn normalize_handle(handle: &str) -> Option<String> {
    let h = handle.trim();
    let h = h.strip_prefix('@').unwrap_or(h);
    if h.is_empty() { None } else { Some(h.to_string()) }
}

fn resolve_in(work_dir: &Path, file: &str) -> PathBuf {
    let p = expand_home(file);
    if p.is_absolute() { p } else { work_dir.join(p) }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
