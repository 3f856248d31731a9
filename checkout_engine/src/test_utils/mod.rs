//! Helpers for tests that need a real database or a scripted payment provider.
pub mod fake_provider;
pub mod prepare_env;

pub use fake_provider::FakeProvider;
pub use prepare_env::{create_database, prepare_test_env, random_db_path, run_migrations};
