//! Dubforge - video download, subtitle and re-dub pipeline
//!
//! This library crate exposes the core functionality for integration testing.

pub mod bridge;
pub mod config;
pub mod pipeline;
pub mod subtitles;
pub mod translate;
pub mod trim;
