//! # Vocab Common Library
//!
//! Shared code for the vocab services including:
//! - Common error type
//! - Configuration file and root folder resolution
//! - Clock abstraction for time-dependent logic
//! - SQLite connection pool initialization

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, ManualClock, SystemClock};
