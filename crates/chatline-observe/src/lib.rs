//! Logging and trace export for Chatline.

pub mod tracing_setup;
