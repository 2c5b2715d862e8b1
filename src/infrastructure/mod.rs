//! Infrastructure layer: SQLite access and DI container
//!
//! This layer implements storage access and wires up services.

pub mod di;
pub mod error;
pub mod sqlite;

pub use error::InfraError;
