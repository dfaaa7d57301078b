//! Terminal client for a historical-weather service.
//!
//! Pick a place on the world map, enter a date, and get the server's
//! 20-year summary for that day. Past queries are listed and can be
//! replayed.

pub mod analysis;
pub mod api;
pub mod app;
pub mod config;
pub mod events;
pub mod history;
pub mod location;
pub mod logging;
pub mod map;
pub mod models;
pub mod runtime;
pub mod ui;
