// src/bot/mod.rs — Conversation layer

pub mod calendar;
pub mod callback;
pub mod datepicker;
pub mod engine;
pub mod keyboards;
pub mod session;
pub mod types;

pub use engine::DialogEngine;
pub use session::{ChartDraft, EntryDraft, Phase, UserSession};
pub use types::{BotCmd, EventKind, InboundEvent, Reply};
