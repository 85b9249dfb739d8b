// src/telegram/mod.rs — Chat transport

pub mod api;
pub mod types;

pub use api::TelegramApi;
