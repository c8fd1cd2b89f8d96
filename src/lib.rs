// Palisade: content moderation decision engine.
//
// This is the library root. Each module corresponds to a major subsystem
// of the moderation pipeline.

pub mod analyzers;
pub mod config;
pub mod decision;
pub mod engine;
pub mod models;
pub mod output;
pub mod rules;
pub mod sanitize;
pub mod scorer;
pub mod sink;
pub mod stats;
