//! Notes subsystem — the note store and the command-dispatch logic around it.
//!
//! # Architecture
//!
//! ```text
//! Inbound ─▶ NotesService ─▶ AuthorizationGate
//!                 │
//!                 ├─ "/cmd args" ─▶ CommandRouter ─▶ NoteStore
//!                 └─ "… #name …" ─▶ RetrievalMatcher ─▶ NoteStore
//! ```
//!
//! [`NotesService`] is the one surface the comms channels call.  It applies
//! the gate once per entry point, so every command and the inline-reference
//! path share the same authorization rule:
//!
//! - recognized command from an unauthorized sender → denial text;
//! - free text with a `#name` reference from an unauthorized sender → denial
//!   text;
//! - free text without a reference → no reply, whoever sent it.
//!
//! Store failures never escape [`NotesService::handle`]: they are logged and
//! answered with a generic failure reply so the channel keeps serving.

pub mod auth;
pub mod command;
pub mod inline;
pub mod replies;
pub mod router;
pub mod store;
pub mod stores;

pub use auth::AuthorizationGate;
pub use command::{CommandName, ParsedCommand};
pub use inline::RetrievalMatcher;
pub use router::CommandRouter;
pub use store::{DeleteOutcome, NoteStore, UpdateOutcome};

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::{Config, StoreKind};
use crate::error::AppError;
use stores::sqlite::SqliteNoteStore;
use stores::tmp::TmpNoteStore;

// ── Inbound ──────────────────────────────────────────────────────────────────

/// One inbound chat event as delivered by a comms channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inbound {
    /// Sender handle; `None` when the transport has no handle for the user.
    pub sender: Option<String>,
    pub text: String,
    /// Text of the message this one replies to.
    pub reply_to: Option<String>,
    /// This bot's own handle on the transport.  Commands addressed to a
    /// different `@handle` are ignored.
    pub recipient: Option<String>,
}

impl Inbound {
    pub fn new(sender: Option<&str>, text: &str, reply_to: Option<&str>) -> Self {
        Self {
            sender: sender.map(str::to_string),
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
            recipient: None,
        }
    }

    pub fn with_recipient(mut self, handle: impl Into<String>) -> Self {
        self.recipient = Some(handle.into());
        self
    }

    /// Replied-to text, if present and not blank.
    pub fn reply_payload(&self) -> Option<&str> {
        self.reply_to.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub(crate) fn sender_label(&self) -> &str {
        self.sender.as_deref().unwrap_or("<anonymous>")
    }
}

// ── Store selection ──────────────────────────────────────────────────────────

/// Open the backend selected by `[notes] store`.
pub fn open_store(config: &Config) -> Result<Arc<dyn NoteStore>, AppError> {
    let store: Arc<dyn NoteStore> = match config.notes.store {
        StoreKind::Sqlite => Arc::new(SqliteNoteStore::open(&config.notes.db_path)?),
        StoreKind::Memory => Arc::new(TmpNoteStore::new()),
    };
    info!(store = store.store_type(), "note store opened");
    Ok(store)
}

// ── NotesService ─────────────────────────────────────────────────────────────

pub struct NotesService {
    gate: AuthorizationGate,
    router: CommandRouter,
    matcher: RetrievalMatcher,
}

impl NotesService {
    pub fn new(store: Arc<dyn NoteStore>, gate: AuthorizationGate) -> Self {
        Self {
            gate,
            router: CommandRouter::new(store.clone()),
            matcher: RetrievalMatcher::new(store),
        }
    }

    /// Open the configured store and build the gate from `authorized_users`.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let store = open_store(config)?;
        let gate = AuthorizationGate::new(config.authorized_users.iter().cloned());
        info!(authorized_users = config.authorized_users.len(), "notes service ready");
        Ok(Self::new(store, gate))
    }

    /// Whether `sender` passes the allow-list.
    pub fn is_authorized(&self, sender: &str) -> bool {
        self.gate.is_authorized(Some(sender))
    }

    /// Full dispatch: command rule first, inline-reference rule second.
    ///
    /// `None` means the message needs no reply.
    pub fn handle(&self, inbound: &Inbound) -> Option<String> {
        match ParsedCommand::parse(&inbound.text) {
            Some(cmd) if !cmd.is_addressed_to(inbound.recipient.as_deref()) => {
                debug!(command = %cmd.name, addressee = ?cmd.addressee, "command for another bot");
                None
            }
            Some(cmd) => Some(self.command(&cmd, inbound)),
            None => self.free_text(inbound),
        }
    }

    /// Run an already-parsed command behind the gate.
    pub fn command(&self, cmd: &ParsedCommand, inbound: &Inbound) -> String {
        self.guarded(inbound, || self.router.dispatch(cmd, inbound))
    }

    pub fn start(&self, inbound: &Inbound) -> String {
        self.named(CommandName::Start, inbound)
    }

    pub fn help(&self, inbound: &Inbound) -> String {
        self.named(CommandName::Help, inbound)
    }

    pub fn save(&self, inbound: &Inbound) -> String {
        self.named(CommandName::Save, inbound)
    }

    pub fn update(&self, inbound: &Inbound) -> String {
        self.named(CommandName::Update, inbound)
    }

    pub fn delete(&self, inbound: &Inbound) -> String {
        self.named(CommandName::Delete, inbound)
    }

    pub fn list(&self, inbound: &Inbound) -> String {
        self.named(CommandName::List, inbound)
    }

    /// Inline-reference rule.  Gated only once a reference is present, so
    /// ordinary chatter from anyone stays unanswered.
    pub fn free_text(&self, inbound: &Inbound) -> Option<String> {
        inline::first_reference(&inbound.text)?;
        Some(self.guarded(inbound, || {
            self.matcher
                .resolve(&inbound.text)
                .map(|reply| reply.unwrap_or_default())
        }))
    }

    /// Entry point for transports that already routed on the command name:
    /// arguments are the tokens after the first one in `inbound.text`.
    fn named(&self, name: CommandName, inbound: &Inbound) -> String {
        let cmd = ParsedCommand {
            name,
            args: inbound
                .text
                .split_whitespace()
                .skip(1)
                .map(str::to_string)
                .collect(),
            addressee: None,
        };
        self.command(&cmd, inbound)
    }

    /// The single authorization + failure wrapper around every entry point.
    fn guarded<F>(&self, inbound: &Inbound, op: F) -> String
    where
        F: FnOnce() -> Result<String, AppError>,
    {
        let sender = inbound.sender_label();
        if !self.gate.is_authorized(inbound.sender.as_deref()) {
            info!(%sender, "sender is not authorized");
            return replies::UNAUTHORIZED.to_string();
        }
        match op() {
            Ok(reply) => reply,
            Err(e) => {
                error!(%sender, "note operation failed: {e}");
                replies::INTERNAL_ERROR.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose every operation fails, for the failure path.
    struct BrokenStore;

    impl NoteStore for BrokenStore {
        fn store_type(&self) -> &str {
            "broken"
        }
        fn save(&self, _: &str, _: &str) -> Result<(), AppError> {
            Err(AppError::Store("disk gone".into()))
        }
        fn update_if_exists(&self, _: &str, _: &str) -> Result<UpdateOutcome, AppError> {
            Err(AppError::Store("disk gone".into()))
        }
        fn delete_if_exists(&self, _: &str) -> Result<DeleteOutcome, AppError> {
            Err(AppError::Store("disk gone".into()))
        }
        fn get(&self, _: &str) -> Result<Option<String>, AppError> {
            Err(AppError::Store("disk gone".into()))
        }
        fn list_by_prefix(&self, _: &str) -> Result<Vec<String>, AppError> {
            Err(AppError::Store("disk gone".into()))
        }
    }

    fn service() -> (Arc<TmpNoteStore>, NotesService) {
        let store = Arc::new(TmpNoteStore::new());
        let gate = AuthorizationGate::new(["alice".to_string()]);
        (store.clone(), NotesService::new(store, gate))
    }

    #[test]
    fn unauthorized_command_is_denied_without_side_effects() {
        let (store, svc) = service();
        let reply = svc.handle(&Inbound::new(Some("eve"), "/save x", Some("payload")));
        assert_eq!(reply.as_deref(), Some(replies::UNAUTHORIZED));
        assert!(store.list_by_prefix("").unwrap().is_empty());
    }

    #[test]
    fn unauthorized_static_commands_are_denied() {
        let (_, svc) = service();
        for text in ["/start", "/help"] {
            let reply = svc.handle(&Inbound::new(Some("eve"), text, None));
            assert_eq!(reply.as_deref(), Some(replies::UNAUTHORIZED));
        }
        assert_eq!(svc.start(&Inbound::new(None, "/start", None)), replies::UNAUTHORIZED);
    }

    #[test]
    fn inline_reference_is_gated() {
        let (store, svc) = service();
        store.save("recipe", "secret").unwrap();
        let reply = svc.handle(&Inbound::new(Some("eve"), "#recipe", None));
        assert_eq!(reply.as_deref(), Some(replies::UNAUTHORIZED));
    }

    #[test]
    fn plain_chatter_gets_no_reply() {
        let (_, svc) = service();
        assert_eq!(svc.handle(&Inbound::new(Some("alice"), "hello there", None)), None);
        assert_eq!(svc.handle(&Inbound::new(Some("eve"), "hello there", None)), None);
    }

    #[test]
    fn unknown_command_falls_through_to_inline() {
        let (store, svc) = service();
        store.save("x", "body").unwrap();
        let reply = svc.handle(&Inbound::new(Some("alice"), "/show #x", None)).unwrap();
        assert!(reply.contains("body"));
        assert_eq!(svc.handle(&Inbound::new(Some("alice"), "/show x", None)), None);
    }

    #[test]
    fn command_for_another_bot_is_ignored() {
        let (store, svc) = service();
        store.save("x", "body").unwrap();
        let to_me = |text: &str| Inbound::new(Some("alice"), text, None).with_recipient("NotesBot");

        assert_eq!(svc.handle(&to_me("/delete@OtherBot x")), None);
        assert_eq!(store.get("x").unwrap().as_deref(), Some("body"));
        assert_eq!(svc.handle(&to_me("/start@OtherBot")), None);

        assert_eq!(
            svc.handle(&to_me("/delete@notesbot x")).as_deref(),
            Some(replies::deleted("x").as_str())
        );
        assert_eq!(store.get("x").unwrap(), None);
    }

    #[test]
    fn named_entry_points_parse_arguments() {
        let (store, svc) = service();
        let alice = |text: &str, reply: Option<&str>| Inbound::new(Some("alice"), text, reply);

        assert_eq!(svc.save(&alice("/save todo", Some("milk"))), replies::saved("todo"));
        assert_eq!(svc.update(&alice("/update todo", Some("eggs"))), replies::updated("todo"));
        assert_eq!(store.get("todo").unwrap().as_deref(), Some("eggs"));
        assert_eq!(svc.list(&alice("/notes to", None)), "List of saved notes:\n#todo");
        assert_eq!(svc.delete(&alice("/delete todo", None)), replies::deleted("todo"));
        assert_eq!(svc.help(&alice("/help", None)), replies::HELP);
    }

    #[test]
    fn store_failure_yields_generic_reply() {
        let svc = NotesService::new(
            Arc::new(BrokenStore),
            AuthorizationGate::new(["alice".to_string()]),
        );
        let alice = |text: &str| Inbound::new(Some("alice"), text, Some("body"));
        for text in ["/save n", "/update n", "/delete n", "/list", "#n"] {
            assert_eq!(svc.handle(&alice(text)).as_deref(), Some(replies::INTERNAL_ERROR));
        }
        // Commands that never touch the store still work.
        assert_eq!(svc.handle(&alice("/start")).as_deref(), Some(replies::GREETING));
    }

    #[test]
    fn from_config_uses_memory_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = Config::test_default(tmp.path());
        let svc = NotesService::from_config(&cfg).unwrap();
        let reply = svc.handle(&Inbound::new(Some("alice"), "/list", None));
        assert_eq!(reply.as_deref(), Some(replies::NO_NOTES));
        assert!(!cfg.notes.db_path.exists());
    }
}
