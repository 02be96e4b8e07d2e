//! Text-generation backend abstractions for Chatline.
//!
//! - `TextGenerator`: RPITIT trait for concrete backends
//! - `BoxTextGenerator`: object-safe wrapper for runtime backend selection
//! - `BlockingGenerator`: adapter for synchronous, in-process backends

pub mod blocking;
pub mod box_generator;
pub mod generator;
