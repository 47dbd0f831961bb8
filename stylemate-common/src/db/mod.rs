//! Database connection setup and schema migrations
//!
//! Shared by the Local Store and the Remote Collection API database.

pub mod init;
pub mod migrations;

pub use init::{connect, connect_in_memory};
pub use migrations::{get_schema_version, run_migrations, Migration};
