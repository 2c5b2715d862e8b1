//! Application layer: the database action contract and its services
//!
//! This layer orchestrates domain logic and depends on infrastructure helpers.

pub mod actions;
pub mod error;
pub mod error_ext;
pub mod services;

pub use actions::{DatabaseActions, Target, DEFAULT_BINDING};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, SqlResultExt};
