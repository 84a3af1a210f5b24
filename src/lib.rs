//! Bookshelf Server
//!
//! A small REST JSON API keeping book records in memory, with validation
//! and filtered listing of the shelf.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state with the production collaborators (system clock, random ids)
    pub fn new(config: &AppConfig) -> Self {
        Self {
            services: Arc::new(services::Services::new(&config.books)),
        }
    }
}
