use metrics::counter;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::salesman,
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::SalesmanRepository,
};

use super::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSalesman {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub mobile_number: Option<String>,
}

/// Service for managing salesmen
#[derive(Clone)]
pub struct SalesmanService {
    salesmen: SalesmanRepository,
    event_sender: Option<Arc<EventSender>>,
}

impl SalesmanService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            salesmen: SalesmanRepository::new(db_pool),
            event_sender,
        }
    }

    /// Registers a salesman
    #[instrument(skip(self))]
    pub async fn create_salesman(&self, input: NewSalesman) -> Result<salesman::Model, ServiceError> {
        input.validate()?;

        let model = salesman::ActiveModel {
            id: NotSet,
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name),
            email: Set(input.email),
            mobile_number: Set(input.mobile_number),
            created_at: NotSet,
        };
        let created = self.salesmen.create(model).await?;

        counter!("erms_quotation.salesmen_created", 1);
        info!(salesman_id = created.id, "Salesman created");
        if let Some(sender) = &self.event_sender {
            sender.publish(Event::SalesmanCreated(created.id)).await;
        }
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_salesman(&self, id: i64) -> Result<Option<salesman::Model>, ServiceError> {
        self.salesmen.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_salesmen(&self) -> Result<Vec<salesman::Model>, ServiceError> {
        self.salesmen.find_all().await
    }
}
