//! Per-user conversation history.
//!
//! - `policy`: pure windowing rules for a transcript
//! - `backend`: `HistoryBackend` trait for whole-table persistence
//! - `memory`: in-process backend for tests and ephemeral runs
//! - `store`: `HistoryStore`, the read-modify-write layer over a backend

pub mod backend;
pub mod memory;
pub mod policy;
pub mod store;
