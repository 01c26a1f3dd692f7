//! Libris Library Borrowing Server
//!
//! Tracks books and members and lets members borrow and return books,
//! exposed as a REST JSON API.

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
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, store: repository::SharedStore) -> Self {
        let services = services::Services::new(store, &config.library);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
