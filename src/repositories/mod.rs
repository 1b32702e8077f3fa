use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod form_repository;
pub mod party_repository;
pub mod salesman_repository;
pub mod sequence_repository;

pub use form_repository::{FormFilter, FormRepository};
pub use party_repository::PartyRepository;
pub use salesman_repository::SalesmanRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
