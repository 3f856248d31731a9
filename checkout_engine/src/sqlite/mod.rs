//! SQLite database module for the checkout engine.
//!
//! Migrations live in `migrations/` and are embedded into the binary by [`SqliteDatabase::run_migrations`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
