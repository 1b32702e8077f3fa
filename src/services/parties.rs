use metrics::counter;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::party,
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::{PartyRepository, SalesmanRepository},
};

use super::validate_not_blank;

/// Customer details captured when a salesman adds a party.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewParty {
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub customer_name: String,
    #[validate(length(min = 6, max = 20))]
    pub mobile_number: Option<String>,
    pub billing_address: Option<String>,
    pub state: Option<String>,
    #[validate(range(min = 100000, max = 999999))]
    pub pincode: Option<i64>,
    pub city: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_state: Option<String>,
    #[validate(range(min = 100000, max = 999999))]
    pub shipping_pincode: Option<i64>,
    pub shipping_city: Option<String>,
    /// GST identification number
    #[validate(length(equal = 15))]
    pub gst_in: Option<String>,
}

/// Service for managing parties
#[derive(Clone)]
pub struct PartyService {
    parties: PartyRepository,
    salesmen: SalesmanRepository,
    event_sender: Option<Arc<EventSender>>,
}

impl PartyService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            parties: PartyRepository::new(db_pool.clone()),
            salesmen: SalesmanRepository::new(db_pool),
            event_sender,
        }
    }

    /// Adds a party owned by `salesman_id`
    #[instrument(skip(self, input), fields(customer_name = %input.customer_name))]
    pub async fn create_party(
        &self,
        salesman_id: i64,
        input: NewParty,
    ) -> Result<party::Model, ServiceError> {
        input.validate()?;

        if self.salesmen.find_by_id(salesman_id).await?.is_none() {
            warn!(salesman_id, "Party owner not found");
            return Err(ServiceError::NotFound(format!(
                "Salesman {} not found",
                salesman_id
            )));
        }

        let model = party::ActiveModel {
            id: NotSet,
            customer_name: Set(input.customer_name.trim().to_string()),
            mobile_number: Set(input.mobile_number),
            billing_address: Set(input.billing_address),
            state: Set(input.state),
            pincode: Set(input.pincode),
            city: Set(input.city),
            shipping_address: Set(input.shipping_address),
            shipping_state: Set(input.shipping_state),
            shipping_pincode: Set(input.shipping_pincode),
            shipping_city: Set(input.shipping_city),
            gst_in: Set(input.gst_in),
            salesman_id: Set(salesman_id),
            created_at: NotSet,
        };
        let created = self.parties.create(model).await?;

        counter!("erms_quotation.parties_created", 1);
        info!(party_id = created.id, salesman_id, "Party created");
        if let Some(sender) = &self.event_sender {
            sender
                .publish(Event::PartyCreated {
                    party_id: created.id,
                    salesman_id,
                })
                .await;
        }
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_party(&self, id: i64) -> Result<Option<party::Model>, ServiceError> {
        self.parties.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_parties(&self) -> Result<Vec<party::Model>, ServiceError> {
        self.parties.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn list_parties_for_salesman(
        &self,
        salesman_id: i64,
    ) -> Result<Vec<party::Model>, ServiceError> {
        self.parties.find_by_salesman(salesman_id).await
    }
}
