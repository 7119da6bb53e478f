//! Baja town dashboard backend.
//!
//! Periodically asks a generative model with web search for the town's
//! weather, Danube level and sun/moon data, keeps the latest snapshot, and
//! serves it as an HTML page and a JSON view.

pub mod config;
pub mod logging;
pub mod module;
pub mod service;
