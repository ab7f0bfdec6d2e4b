//! Conversion of engine replies into Telegram messages

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::registration::reply::{Keyboard, Reply};

/// Inline keyboard whose callback data is the wire payload of each action
pub fn to_inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.to_string()))
            .collect::<Vec<_>>()
    }))
}

/// Sends replies in order; stops at the first failed send
pub async fn send_replies(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> ResponseResult<()> {
    for reply in replies {
        let request = bot.send_message(chat_id, reply.text);
        match reply.keyboard {
            Some(keyboard) => request.reply_markup(to_inline_markup(&keyboard)).await?,
            None => request.await?,
        };
    }
    Ok(())
}
