//! wxctl: weather-station archive database maintenance
//!
//! Layers, innermost first:
//! - [`domain`]: column types, table layout, archive days, daily aggregation
//! - [`application`]: the [`DatabaseActions`](application::DatabaseActions) contract and its SQLite service
//! - [`infrastructure`]: SQLite access and service wiring
//! - [`cli`]: clap definitions and dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
