// src/ingest/providers/mod.rs
pub mod json_feed;
pub mod simulated;

pub use json_feed::JsonFeedSource;
pub use simulated::SimulatedSource;
