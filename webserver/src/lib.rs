//! HTTP API for the EcoTrak tracker
//!
//! A thin axum front-end over `TrackerHandle`: every request becomes one
//! tracker command, and tracker errors map onto HTTP statuses.

pub mod error;
pub mod state;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use webserver_impl::WebServer;
