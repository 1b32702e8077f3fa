use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder,
};
use std::sync::Arc;

use crate::entities::salesman::{
    ActiveModel as SalesmanActiveModel, Column, Entity as Salesman, Model as SalesmanModel,
};
use crate::errors::AppError;
use crate::repositories::Repository;

use super::BaseRepository;

#[derive(Debug, Clone)]
pub struct SalesmanRepository {
    base: BaseRepository,
}

impl SalesmanRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<SalesmanModel>, AppError> {
        Salesman::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn find_all(&self) -> Result<Vec<SalesmanModel>, AppError> {
        Salesman::find()
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn create(&self, salesman: SalesmanActiveModel) -> Result<SalesmanModel, AppError> {
        salesman
            .insert(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }
}

impl Repository for SalesmanRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
