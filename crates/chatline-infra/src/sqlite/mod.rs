//! SQLite storage layer.
//!
//! WAL-mode database with split read/write connection pools, shared by the
//! SQLite history backend.

pub mod pool;
