//! SQLite connection pool setup

pub mod init;

pub use init::*;
