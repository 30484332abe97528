//! Command router — maps a [`ParsedCommand`] to one store operation and a reply.
//!
//! Validation order per command:
//! - `save`/`update`: reply payload first, then the name argument.
//! - `delete`: name argument.
//! - `list`: optional prefix, never fails validation.
//!
//! Validation failures and missing notes are replies, not errors.  Only
//! store-layer failures come back as `Err`.

use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use super::command::{CommandName, ParsedCommand};
use super::replies;
use super::store::{DeleteOutcome, NoteStore, UpdateOutcome};
use super::Inbound;

pub struct CommandRouter {
    store: Arc<dyn NoteStore>,
}

impl CommandRouter {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub fn dispatch(&self, cmd: &ParsedCommand, inbound: &Inbound) -> Result<String, AppError> {
        let sender = inbound.sender_label();
        info!(%sender, command = %cmd.name, "handling command");

        match cmd.name {
            CommandName::Start => Ok(replies::GREETING.to_string()),
            CommandName::Help => Ok(replies::HELP.to_string()),
            CommandName::Save => self.save(cmd.first_arg(), inbound.reply_payload()),
            CommandName::Update => self.update(cmd.first_arg(), inbound.reply_payload()),
            CommandName::Delete => self.delete(cmd.first_arg()),
            CommandName::List => self.list(cmd.first_arg().unwrap_or("")),
        }
    }

    pub fn save(&self, name: Option<&str>, payload: Option<&str>) -> Result<String, AppError> {
        let Some(text) = payload else {
            return Ok(replies::SAVE_REPLY_REQUIRED.to_string());
        };
        let Some(name) = name else {
            return Ok(replies::NAME_REQUIRED.to_string());
        };
        self.store.save(name, text)?;
        info!(note = %name, bytes = text.len(), "note saved");
        Ok(replies::saved(name))
    }

    pub fn update(&self, name: Option<&str>, payload: Option<&str>) -> Result<String, AppError> {
        let Some(text) = payload else {
            return Ok(replies::UPDATE_REPLY_REQUIRED.to_string());
        };
        let Some(name) = name else {
            return Ok(replies::NAME_REQUIRED.to_string());
        };
        match self.store.update_if_exists(name, text)? {
            UpdateOutcome::Updated => {
                info!(note = %name, bytes = text.len(), "note updated");
                Ok(replies::updated(name))
            }
            UpdateOutcome::NotFound => Ok(replies::does_not_exist(name)),
        }
    }

    pub fn delete(&self, name: Option<&str>) -> Result<String, AppError> {
        let Some(name) = name else {
            return Ok(replies::NAME_REQUIRED.to_string());
        };
        match self.store.delete_if_exists(name)? {
            DeleteOutcome::Deleted => {
                info!(note = %name, "note deleted");
                Ok(replies::deleted(name))
            }
            DeleteOutcome::NotFound => Ok(replies::does_not_exist(name)),
        }
    }

    pub fn list(&self, prefix: &str) -> Result<String, AppError> {
        let names = self.store.list_by_prefix(prefix)?;
        if names.is_empty() {
            Ok(replies::NO_NOTES.to_string())
        } else {
            Ok(replies::note_list(&names))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::notes::stores::tmp::TmpNoteStore;

    fn router() -> (Arc<TmpNoteStore>, CommandRouter) {
        let store = Arc::new(TmpNoteStore::new());
        (store.clone(), CommandRouter::new(store))
    }

    fn run(router: &CommandRouter, text: &str, reply_to: Option<&str>) -> String {
        let inbound = Inbound::new(Some("alice"), text, reply_to);
        let cmd = ParsedCommand::parse(text).expect("test input must be a command");
        router.dispatch(&cmd, &inbound).unwrap()
    }

    #[test]
    fn save_requires_reply_before_name() {
        let (store, r) = router();
        assert_eq!(run(&r, "/save", None), replies::SAVE_REPLY_REQUIRED);
        assert_eq!(run(&r, "/save x", None), replies::SAVE_REPLY_REQUIRED);
        assert_eq!(run(&r, "/save", Some("body")), replies::NAME_REQUIRED);
        assert!(store.list_by_prefix("").unwrap().is_empty());
    }

    #[test]
    fn save_stores_reply_text() {
        let (store, r) = router();
        assert_eq!(run(&r, "/save recipe", Some("Recipe body")), replies::saved("recipe"));
        assert_eq!(store.get("recipe").unwrap().as_deref(), Some("Recipe body"));
    }

    #[test]
    fn blank_reply_counts_as_missing() {
        let (store, r) = router();
        assert_eq!(run(&r, "/save x", Some("  \n")), replies::SAVE_REPLY_REQUIRED);
        assert_eq!(store.get("x").unwrap(), None);
    }

    #[test]
    fn only_first_argument_is_used() {
        let (store, r) = router();
        run(&r, "/save first second", Some("t"));
        assert_eq!(store.list_by_prefix("").unwrap(), vec!["first"]);
    }

    #[test]
    fn update_missing_note() {
        let (store, r) = router();
        assert_eq!(run(&r, "/update ghost", Some("x")), replies::does_not_exist("ghost"));
        assert_eq!(run(&r, "/update ghost", None), replies::UPDATE_REPLY_REQUIRED);
        assert!(store.list_by_prefix("").unwrap().is_empty());
    }

    #[test]
    fn update_existing_note() {
        let (store, r) = router();
        store.save("todo", "old").unwrap();
        assert_eq!(run(&r, "/update todo", Some("new")), replies::updated("todo"));
        assert_eq!(store.get("todo").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn delete_paths() {
        let (store, r) = router();
        assert_eq!(run(&r, "/delete", None), replies::NAME_REQUIRED);
        assert_eq!(run(&r, "/delete gone", None), replies::does_not_exist("gone"));
        store.save("gone", "t").unwrap();
        assert_eq!(run(&r, "/delete gone", None), replies::deleted("gone"));
        assert_eq!(store.get("gone").unwrap(), None);
    }

    #[test]
    fn list_with_and_without_prefix() {
        let (store, r) = router();
        assert_eq!(run(&r, "/list", None), replies::NO_NOTES);
        store.save("note_b", "t").unwrap();
        store.save("note_a", "t").unwrap();
        store.save("misc", "t").unwrap();
        assert_eq!(run(&r, "/notes", None), "List of saved notes:\n#misc\n#note_a\n#note_b");
        assert_eq!(run(&r, "/list note", None), "List of saved notes:\n#note_a\n#note_b");
        assert_eq!(run(&r, "/list zz", None), replies::NO_NOTES);
    }

    #[test]
    fn static_commands() {
        let (_, r) = router();
        assert_eq!(run(&r, "/start", None), replies::GREETING);
        assert_eq!(run(&r, "/help", None), replies::HELP);
    }
}
