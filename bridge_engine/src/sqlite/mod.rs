//! SQLite backend for the bridge's ledger store.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
