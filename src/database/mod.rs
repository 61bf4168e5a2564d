//! vidsearch database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! SQLite storage backend.
//!
//! # Usage
//!
//! ```no_run
//! use vidsearch::database::Database;
//!
//! let db = Database::open("vidsearch.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
