// src/lib.rs — Library root for Habitgram

pub mod bot;
pub mod infra;
pub mod pixela;
pub mod store;
pub mod telegram;
pub mod util;
