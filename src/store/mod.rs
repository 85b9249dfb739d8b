// src/store/mod.rs — Durable per-user storage

pub mod directory;
pub mod schema;
#[allow(clippy::module_inception)]
pub mod store;

pub use directory::UserDirectory;
pub use store::Store;
