// src/bot/types.rs — Inbound events and outbound replies
//
// The dialog engine consumes one InboundEvent per turn and returns the
// replies to deliver; it never talks to the transport directly.

use crate::bot::callback::Callback;
use crate::telegram::types::{InlineKeyboardMarkup, ReplyKeyboardMarkup, ReplyMarkup};

/// A slash command understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCmd {
    Start,
    Select,
    Create,
    Delete,
}

impl BotCmd {
    pub fn parse(text: &str) -> Option<Self> {
        // "/start@SomeBot" also arrives in group chats
        let cmd = text.trim().split_whitespace().next()?;
        let cmd = cmd.split('@').next()?;
        match cmd {
            "/start" => Some(BotCmd::Start),
            "/select" => Some(BotCmd::Select),
            "/create" => Some(BotCmd::Create),
            "/delete" => Some(BotCmd::Delete),
            _ => None,
        }
    }
}

/// One inbound chat event, already classified by the transport.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub chat_id: i64,
    pub user_id: i64,
    pub display_name: String,
    /// Message the pressed button was attached to; None for plain texts.
    pub message_id: Option<i64>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Command(BotCmd),
    Text(String),
    Callback(Callback),
}

impl EventKind {
    /// Classify a message text. Anything that is not a known command is
    /// plain text, a stray "/whatever" included, so the phase machine
    /// always gets a chance to answer.
    pub fn of_text(text: &str) -> Self {
        match BotCmd::parse(text) {
            Some(cmd) => EventKind::Command(cmd),
            None => EventKind::Text(text.to_string()),
        }
    }
}

/// One outbound action against the originating chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Send {
        text: String,
        markup: Option<ReplyMarkup>,
        /// Pin the message after sending (first-contact greeting).
        pin: bool,
    },
    /// Replace the text (and inline keyboard) of the button message.
    EditText {
        text: String,
        markup: Option<InlineKeyboardMarkup>,
    },
    /// Replace only the inline keyboard of the button message.
    EditMarkup { markup: InlineKeyboardMarkup },
}

impl Reply {
    pub fn send(text: impl Into<String>) -> Self {
        Reply::Send {
            text: text.into(),
            markup: None,
            pin: false,
        }
    }

    pub fn send_pinned(text: impl Into<String>) -> Self {
        Reply::Send {
            text: text.into(),
            markup: None,
            pin: true,
        }
    }

    pub fn send_inline(text: impl Into<String>, markup: InlineKeyboardMarkup) -> Self {
        Reply::Send {
            text: text.into(),
            markup: Some(ReplyMarkup::Inline(markup)),
            pin: false,
        }
    }

    pub fn send_keyboard(text: impl Into<String>, markup: ReplyKeyboardMarkup) -> Self {
        Reply::Send {
            text: text.into(),
            markup: Some(ReplyMarkup::Reply(markup)),
            pin: false,
        }
    }

    pub fn edit_text(text: impl Into<String>) -> Self {
        Reply::EditText {
            text: text.into(),
            markup: None,
        }
    }

    pub fn edit_with(text: impl Into<String>, markup: InlineKeyboardMarkup) -> Self {
        Reply::EditText {
            text: text.into(),
            markup: Some(markup),
        }
    }

    pub fn edit_markup(markup: InlineKeyboardMarkup) -> Self {
        Reply::EditMarkup { markup }
    }

    /// Text payload, for assertions and logging.
    pub fn text(&self) -> &str {
        match self {
            Reply::Send { text, .. } | Reply::EditText { text, .. } => text,
            Reply::EditMarkup { .. } => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(BotCmd::parse("/start"), Some(BotCmd::Start));
        assert_eq!(BotCmd::parse("/select@HabitgramBot"), Some(BotCmd::Select));
        assert_eq!(BotCmd::parse("  /delete  "), Some(BotCmd::Delete));
        assert_eq!(BotCmd::parse("/unknown"), None);
        assert_eq!(BotCmd::parse("hello"), None);
    }

    #[test]
    fn test_unknown_slash_text_stays_text() {
        assert_eq!(EventKind::of_text("/start"), EventKind::Command(BotCmd::Start));
        assert_eq!(
            EventKind::of_text("/help"),
            EventKind::Text("/help".to_string())
        );
        assert_eq!(
            EventKind::of_text("10 km"),
            EventKind::Text("10 km".to_string())
        );
    }
}
