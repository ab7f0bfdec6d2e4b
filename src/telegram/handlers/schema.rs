//! Dispatcher schema and handler chain builders

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{user_id_of, HandlerDeps, HandlerError};
use crate::registration::engine::RegistrationEngine;
use crate::registration::event::{Action, Event};
use crate::registration::reply::Reply;
use crate::registration::texts;
use crate::telegram::admin::handle_backup_command;
use crate::telegram::bot::Command;
use crate::telegram::keyboards::send_replies;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// # Arguments
/// * `deps` - Handler dependencies (registration engine, backup handle)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Runs the engine off the async runtime: a confirmation hits SQLite.
async fn run_engine(engine: &Arc<RegistrationEngine>, user_id: i64, event: Event) -> Result<Vec<Reply>, HandlerError> {
    let engine = Arc::clone(engine);
    Ok(tokio::task::spawn_blocking(move || engine.handle(user_id, event)).await?)
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let Some(user_id) = msg.from.as_ref().and_then(user_id_of) else {
                    return Ok(());
                };
                log::info!("🎯 Received command: {:?} from user {}", cmd, user_id);

                let event = match cmd {
                    Command::Start => Event::Start,
                    Command::Cancel => Event::Cancel,
                    Command::Help => Event::Help,
                    Command::Backup => {
                        if let Err(e) = handle_backup_command(&bot, msg.chat.id, user_id, &deps.backup).await {
                            log::error!("❌ /backup handler failed for user {}: {}", user_id, e);
                        }
                        return Ok(());
                    }
                };

                let replies = run_engine(&deps.engine, user_id, event).await?;
                send_replies(&bot, msg.chat.id, replies).await?;
                Ok(())
            }
        },
    ))
}

/// Free text in private chats goes to the engine; an unrecognized `/command`
/// gets a hint instead.
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .filter_map(|msg: Message| msg.text().map(str::to_owned))
        .endpoint(move |bot: Bot, msg: Message, text: String| {
            let deps = deps.clone();
            async move {
                let Some(user_id) = msg.from.as_ref().and_then(user_id_of) else {
                    return Ok(());
                };

                if text.starts_with('/') {
                    bot.send_message(msg.chat.id, texts::UNKNOWN_COMMAND).await?;
                    return Ok(());
                }

                let replies = run_engine(&deps.engine, user_id, Event::Text(text)).await?;
                send_replies(&bot, msg.chat.id, replies).await?;
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // Stop the client-side spinner whatever happens next
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query: {}", e);
            }

            let Some(user_id) = user_id_of(&q.from) else {
                return Ok(());
            };
            let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
                return Ok(());
            };

            let action = match q.data.as_deref().unwrap_or_default().parse::<Action>() {
                Ok(action) => action,
                Err(e) => {
                    log::warn!("{} from user {}", e, user_id);
                    return Ok(());
                }
            };

            let replies = run_engine(&deps.engine, user_id, Event::Action(action)).await?;
            send_replies(&bot, chat_id, replies).await?;
            Ok(())
        }
    })
}
