//! SQLite-backed storage implementation.

mod acks;
mod calls;
mod clients;
mod config;
mod leads;
mod rules;
pub mod schema;
mod store;

pub use store::SqliteStore;
