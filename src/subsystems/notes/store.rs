//! Store trait — the note persistence contract.
//!
//! A [`NoteStore`] maps note names to note text.  Backends are synchronous
//! and `Send + Sync`; async callers dispatch through `spawn_blocking`
//! (see [`CommsState`](crate::subsystems::comms::CommsState)).
//!
//! `Err` is reserved for store-layer failures.  Absence is reported in the
//! `Ok` value (`None`, [`UpdateOutcome::NotFound`], [`DeleteOutcome::NotFound`]).
//!
//! Each method is atomic on its own: update/delete decide existence and
//! mutate inside one critical section, so two handlers racing on the same
//! name never interleave between the check and the write.

use crate::error::AppError;

/// Result of [`NoteStore::update_if_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Result of [`NoteStore::delete_if_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Pluggable note persistence.
pub trait NoteStore: Send + Sync {
    /// Backend name used in log messages (e.g. `"sqlite"`).
    fn store_type(&self) -> &str;

    /// Insert or replace the text stored under `name`.
    fn save(&self, name: &str, text: &str) -> Result<(), AppError>;

    /// Replace the text of an existing note; leaves the store untouched otherwise.
    fn update_if_exists(&self, name: &str, text: &str) -> Result<UpdateOutcome, AppError>;

    /// Remove an existing note.
    fn delete_if_exists(&self, name: &str) -> Result<DeleteOutcome, AppError>;

    fn get(&self, name: &str) -> Result<Option<String>, AppError>;

    /// Names starting with `prefix`, ascending.  An empty prefix lists all notes.
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError>;
}

/// Reject names that would break the note-name invariant.
pub(crate) fn check_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::Store("note name must not be empty".into()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(AppError::Store(format!("note name '{name}' contains whitespace")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_rejected() {
        assert!(matches!(check_name(""), Err(AppError::Store(_))));
    }

    #[test]
    fn whitespace_name_rejected() {
        assert!(check_name("two words").is_err());
        assert!(check_name("tab\there").is_err());
    }

    #[test]
    fn token_names_accepted() {
        for n in ["recipe", "Recipe", "my-note", "a.b", "ñandú", "#tag"] {
            assert!(check_name(n).is_ok(), "expected '{n}' to be accepted");
        }
    }
}
