//! Command tokenizer — turns a raw chat line into a typed [`ParsedCommand`].
//!
//! A command is a message whose first whitespace-delimited token starts with
//! `/`.  Telegram appends `@botname` in group chats (`/save@NotesBot x`);
//! the suffix is kept as [`ParsedCommand::addressee`] so the service can skip
//! commands meant for another bot.  Names outside [`CommandName`] are not
//! commands and the message falls through to inline-reference matching.

use std::fmt;

/// Recognized command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    Start,
    Help,
    Save,
    Update,
    Delete,
    /// `/list`, also reachable as `/notes`.
    List,
}

impl CommandName {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "save" => Some(Self::Save),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "list" | "notes" => Some(Self::List),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Save => "save",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command name plus its whitespace-split arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: CommandName,
    pub args: Vec<String>,
    /// Bot handle after `@` in the command token, if any.
    pub addressee: Option<String>,
}

impl ParsedCommand {
    /// Returns `None` when `text` is not a recognized command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?.strip_prefix('/')?;
        let (head, addressee) = match head.split_once('@') {
            Some((name, bot)) => (name, Some(bot.to_string())),
            None => (head, None),
        };
        let name = CommandName::from_token(head)?;
        Some(Self {
            name,
            args: tokens.map(str::to_string).collect(),
            addressee,
        })
    }

    /// Whether a bot known as `handle` should act on this command.
    ///
    /// Unaddressed commands are for everyone.  Without a known handle (the
    /// console) any addressee is accepted.  Telegram usernames compare
    /// case-insensitively.
    pub fn is_addressed_to(&self, handle: Option<&str>) -> bool {
        match (self.addressee.as_deref(), handle) {
            (Some(addressee), Some(me)) => {
                addressee.eq_ignore_ascii_case(me.strip_prefix('@').unwrap_or(me))
            }
            _ => true,
        }
    }

    /// The only argument `save`/`update`/`delete`/`list` look at.
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}
