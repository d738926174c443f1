//! Findash Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::AppError;
pub use state::AppState;
