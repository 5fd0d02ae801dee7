//! Database access.
//!
//! Statements are written with `:name` placeholders and executed with a map
//! of named values. The wrapper adds nothing beyond binding and decoding.

pub mod database;

pub use database::{named, Database, DbError, DbValue, Executed, NamedParams};
