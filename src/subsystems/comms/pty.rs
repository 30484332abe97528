//! PTY (console) comms channel — reads lines from stdin, hands them to the
//! notes service, prints the reply to stdout.
//!
//! Every line is sent as the configured console identity.  A console has no
//! "reply to message" gesture, so a line starting with `> ` stages its text
//! as the replied-to payload of the NEXT line:
//!
//! ```text
//! > two eggs, one onion
//! /save omelette
//! ```
//!
//! Runs until the `shutdown` token is cancelled (Ctrl-C) or stdin is closed.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::subsystems::notes::Inbound;
use crate::subsystems::runtime::{Component, ComponentFuture};
use super::state::{CommsEvent, CommsState};

const REPLY_PREFIX: &str = "> ";

// ── PtyChannel ───────────────────────────────────────────────────────────────

/// A PTY channel instance.  Multiple instances would each get a unique id.
pub struct PtyChannel {
    channel_id: String,
    identity: String,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(
        channel_id: impl Into<String>,
        identity: impl Into<String>,
        state: Arc<CommsState>,
    ) -> Self {
        Self { channel_id: channel_id.into(), identity: identity.into(), state }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_pty(self.channel_id, self.identity, self.state, shutdown))
    }
}

// ── Line handling ────────────────────────────────────────────────────────────

/// Turns console lines into [`Inbound`] events, carrying a staged reply payload.
#[derive(Debug, Default)]
struct ConsoleSession {
    identity: String,
    staged_reply: Option<String>,
}

impl ConsoleSession {
    fn new(identity: impl Into<String>) -> Self {
        Self { identity: identity.into(), staged_reply: None }
    }

    /// `None` for blank lines and for lines that only stage a reply payload.
    fn accept(&mut self, line: &str) -> Option<Inbound> {
        let line = line.trim_end();
        if let Some(payload) = line.strip_prefix(REPLY_PREFIX) {
            self.staged_reply = Some(payload.to_string());
            return None;
        }
        let input = line.trim();
        if input.is_empty() {
            return None;
        }
        Some(Inbound {
            sender: Some(self.identity.clone()),
            text: input.to_string(),
            reply_to: self.staged_reply.take(),
            recipient: None,
        })
    }
}

// ── run_pty ──────────────────────────────────────────────────────────────────

async fn run_pty(
    channel_id: String,
    identity: String,
    state: Arc<CommsState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!(%channel_id, %identity, "pty channel started — type a command and press Enter. Ctrl-C to quit.");
    println!("─────────────────────────────────");
    println!(" Notekeeper console  (Ctrl-C to quit)");
    println!(" '> text' stages a reply for the next line");
    if !state.is_authorized(&identity) {
        warn!(%identity, "console identity is not an authorized user");
        println!(" '{identity}' is not in [auth] authorized_users: commands will be denied");
    }
    println!("─────────────────────────────────");

    state.report_event(CommsEvent::SessionStarted { channel_id: channel_id.clone() });

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut session = ConsoleSession::new(identity);

    loop {
        print!("> ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("pty channel shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("pty read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("pty stdin closed");
                        break;
                    }
                    Ok(Some(line)) => {
                        let Some(inbound) = session.accept(&line) else { continue };
                        debug!(text = %inbound.text, "pty received line");

                        match state.send_message(&channel_id, inbound).await {
                            Err(e) => {
                                warn!("send_message error: {e}, pty exiting");
                                break;
                            }
                            Ok(Some(reply)) => println!("{reply}"),
                            Ok(None) => {}
                        }
                    }
                }
            }
        }
    }

    state.report_event(CommsEvent::ChannelShutdown { channel_id });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_has_identity_and_no_reply() {
        let mut s = ConsoleSession::new("console");
        let inbound = s.accept("  /list  ").unwrap();
        assert_eq!(inbound.sender.as_deref(), Some("console"));
        assert_eq!(inbound.text, "/list");
        assert_eq!(inbound.reply_to, None);
    }

    #[test]
    fn staged_reply_applies_to_next_line_only() {
        let mut s = ConsoleSession::new("console");
        assert!(s.accept("> Recipe body").is_none());
        let first = s.accept("/save recipe").unwrap();
        assert_eq!(first.reply_to.as_deref(), Some("Recipe body"));
        let second = s.accept("/save other").unwrap();
        assert_eq!(second.reply_to, None);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut s = ConsoleSession::new("console");
        assert!(s.accept("").is_none());
        assert!(s.accept("   ").is_none());
    }
}
