//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on infrastructure helpers (SQLite access, config loading)
//! but are themselves concrete structs; the seam to the CLI is the
//! [`DatabaseActions`](crate::application::actions::DatabaseActions) trait.

mod database;

pub use database::DatabaseService;
