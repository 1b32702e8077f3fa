use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;

use crate::entities::quotation_form::{
    ActiveModel as FormActiveModel, Column, Entity as QuotationForm, Model as FormModel,
};
use crate::errors::AppError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Optional filters for listing forms; an empty filter matches every form.
#[derive(Debug, Clone, Default)]
pub struct FormFilter {
    pub salesman_id: Option<i64>,
    pub party_id: Option<i64>,
    /// Substring of the quotation number
    pub number_contains: Option<String>,
    /// Inclusive lower bound on the quotation date
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound on the quotation date
    pub to_date: Option<NaiveDate>,
}

impl FormFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(salesman_id) = self.salesman_id {
            condition = condition.add(Column::SalesmanId.eq(salesman_id));
        }
        if let Some(party_id) = self.party_id {
            condition = condition.add(Column::PartyId.eq(party_id));
        }
        if let Some(needle) = self.number_contains.as_deref().filter(|s| !s.is_empty()) {
            condition = condition.add(Column::QuotationNumber.contains(needle));
        }
        if let Some(from) = self.from_date {
            condition = condition.add(Column::QuotationDate.gte(from));
        }
        if let Some(to) = self.to_date {
            condition = condition.add(Column::QuotationDate.lte(to));
        }
        condition
    }
}

/// Repository for quotation form persistence
#[derive(Debug, Clone)]
pub struct FormRepository {
    base: BaseRepository,
}

impl FormRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find a form by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<FormModel>, AppError> {
        QuotationForm::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Every form, oldest first
    pub async fn find_all(&self) -> Result<Vec<FormModel>, AppError> {
        QuotationForm::find()
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Forms matching `filter`, oldest first
    pub async fn search(&self, filter: &FormFilter) -> Result<Vec<FormModel>, AppError> {
        QuotationForm::find()
            .filter(filter.condition())
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Insert when the id is unset, update otherwise
    pub async fn save(&self, form: FormActiveModel) -> Result<FormModel, DbErr> {
        save(self.get_db(), form).await
    }

    /// Delete a form by ID, returning the number of rows removed
    pub async fn delete_by_id(&self, id: i64) -> Result<u64, AppError> {
        let result = QuotationForm::delete_by_id(id)
            .exec(self.get_db())
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(result.rows_affected)
    }
}

impl Repository for FormRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

/// Insert-or-update on any connection, including an open transaction.
pub async fn save<C: ConnectionTrait>(conn: &C, form: FormActiveModel) -> Result<FormModel, DbErr> {
    if form.id.is_not_set() {
        form.insert(conn).await
    } else {
        form.update(conn).await
    }
}

/// Highest-id form whose quotation number contains `needle`.
pub async fn find_most_recent_containing<C: ConnectionTrait>(
    conn: &C,
    needle: &str,
) -> Result<Option<FormModel>, DbErr> {
    QuotationForm::find()
        .filter(Column::QuotationNumber.contains(needle))
        .order_by_desc(Column::Id)
        .one(conn)
        .await
}
