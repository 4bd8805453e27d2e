//! Persistence for the quiz: repository traits, an in-memory adapter and SQLite.

pub mod repository;
pub mod sqlite;
