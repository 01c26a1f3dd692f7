//! Business logic services

pub mod borrowing;
pub mod catalog;
pub mod members;
pub mod stats;

use crate::{config::LibraryConfig, repository::SharedStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub borrowing: borrowing::BorrowingService,
    pub stats: stats::StatsService,
    store: SharedStore,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: SharedStore, library: &LibraryConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            members: members::MembersService::new(store.clone()),
            borrowing: borrowing::BorrowingService::new(store.clone(), library.max_books_per_member),
            stats: stats::StatsService::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}
