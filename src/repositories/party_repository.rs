use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;

use crate::entities::party::{
    ActiveModel as PartyActiveModel, Column, Entity as Party, Model as PartyModel,
};
use crate::errors::AppError;
use crate::repositories::Repository;

use super::BaseRepository;

#[derive(Debug, Clone)]
pub struct PartyRepository {
    base: BaseRepository,
}

impl PartyRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<PartyModel>, AppError> {
        Party::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn find_all(&self) -> Result<Vec<PartyModel>, AppError> {
        Party::find()
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Parties owned by one salesman
    pub async fn find_by_salesman(&self, salesman_id: i64) -> Result<Vec<PartyModel>, AppError> {
        Party::find()
            .filter(Column::SalesmanId.eq(salesman_id))
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn create(&self, party: PartyActiveModel) -> Result<PartyModel, AppError> {
        party
            .insert(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }
}

impl Repository for PartyRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
