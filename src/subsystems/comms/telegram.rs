//! Telegram comms channel — long-polls the Bot API through `teloxide`,
//! hands each text message to the notes service and replies in the same chat.
//!
//! Mapping to [`Inbound`]:
//! - sender  ← `from.username` (users without a username are never authorized)
//! - text    ← message text
//! - reply   ← text of `reply_to_message`, when the user replied to one
//! - recipient ← the bot's own username from `getMe`, so group-chat commands
//!   addressed to another bot (`/delete@OtherBot`) are ignored

use std::env;
use std::sync::Arc;

use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::subsystems::notes::Inbound;
use crate::subsystems::notes::replies;
use crate::subsystems::runtime::{Component, ComponentFuture};
use super::state::{CommsEvent, CommsState};

// ── Constants ────────────────────────────────────────────────────────────────

/// Telegram has a 4096 character limit per message.
/// We chunk at 4000 to be safe.
const MAX_MESSAGE_LENGTH: usize = 4000;

// ── TelegramChannel ──────────────────────────────────────────────────────────

/// A Telegram channel instance.
pub struct TelegramChannel {
    channel_id: String,
    state: Arc<CommsState>,
}

impl TelegramChannel {
    pub fn new(channel_id: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), state }
    }
}

impl Component for TelegramChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_telegram(self.channel_id, self.state, shutdown))
    }
}

/// Build the [`Inbound`] for a text message; `None` for non-text updates.
fn inbound_from(msg: &Message, bot_username: Option<&str>) -> Option<Inbound> {
    let text = msg.text()?;
    Some(Inbound {
        sender: msg.from.as_ref().and_then(|u| u.username.clone()),
        text: text.to_string(),
        reply_to: msg
            .reply_to_message()
            .and_then(|m| m.text())
            .map(str::to_string),
        recipient: bot_username.map(str::to_string),
    })
}

/// Split `text` into chunks of at most [`MAX_MESSAGE_LENGTH`] characters.
fn chunk_reply(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(MAX_MESSAGE_LENGTH)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

// ── run_telegram ─────────────────────────────────────────────────────────────

async fn run_telegram(
    channel_id: String,
    state: Arc<CommsState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let token = match env::var("TELEGRAM_BOT_TOKEN") {
        Ok(t) => t,
        Err(_) => {
            warn!(%channel_id, "TELEGRAM_BOT_TOKEN not set, telegram channel exiting");
            return Ok(());
        }
    };

    info!(%channel_id, "telegram channel starting");

    let bot = Bot::new(token);

    let me = bot
        .get_me()
        .await
        .map_err(|e| AppError::Comms(format!("telegram getMe failed: {e}")))?;
    let bot_username = me.user.username.clone();
    info!(%channel_id, username = ?bot_username, "telegram bot identified");

    let state_clone = state.clone();
    let channel_id_clone = channel_id.clone();

    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let state = state_clone.clone();
        let channel_id = channel_id_clone.clone();
        let bot_username = bot_username.clone();
        async move {
            let Some(inbound) = inbound_from(&msg, bot_username.as_deref()) else {
                return respond(());
            };
            debug!(%channel_id, from = ?inbound.sender, "telegram received message");

            match state.send_message(&channel_id, inbound).await {
                Ok(Some(reply)) => {
                    for chunk in chunk_reply(&reply) {
                        if let Err(e) = bot.send_message(msg.chat.id, chunk).await {
                            warn!("failed to send telegram reply: {e}");
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("send_message error: {e}");
                    let _ = bot.send_message(msg.chat.id, replies::INTERNAL_ERROR).await;
                }
            }
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler).build();

    state.report_event(CommsEvent::SessionStarted { channel_id: channel_id.clone() });

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received — closing telegram channel");
        }
        _ = dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    state.report_event(CommsEvent::ChannelShutdown { channel_id });
    Ok(())
}
