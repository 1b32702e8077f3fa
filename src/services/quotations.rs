use chrono::{Local, NaiveDate};
use metrics::counter;
use sea_orm::{
    ActiveValue::{self, NotSet, Set},
    TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::quotation_form,
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::{form_repository, FormFilter, FormRepository, PartyRepository, SalesmanRepository},
};

use super::numbering::{FinancialYear, QuotationNumber};
use super::sequence::SerialAllocator;
use super::validate_not_blank;

/// Caller-supplied part of a new quotation form; the number is always generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewQuotationForm {
    pub quotation_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub payment_terms: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[validate(length(max = 64))]
    pub po_no: Option<String>,
    pub lut: Option<bool>,
}

/// Fields to overwrite on an existing form. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FormPatch {
    #[validate(custom = "validate_not_blank")]
    pub quotation_number: Option<String>,
    pub quotation_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub payment_terms: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[validate(length(max = 64))]
    pub po_no: Option<String>,
    pub lut: Option<bool>,
}

impl FormPatch {
    pub fn is_empty(&self) -> bool {
        self.quotation_number.is_none()
            && self.quotation_date.is_none()
            && self.payment_terms.is_none()
            && self.due_date.is_none()
            && self.po_no.is_none()
            && self.lut.is_none()
    }

    fn apply(self, form: &mut quotation_form::ActiveModel) {
        merge_if_present(&mut form.quotation_number, self.quotation_number);
        merge_if_present(&mut form.quotation_date, self.quotation_date.map(Some));
        merge_if_present(&mut form.payment_terms, self.payment_terms.map(Some));
        merge_if_present(&mut form.due_date, self.due_date.map(Some));
        merge_if_present(&mut form.po_no, self.po_no.map(Some));
        merge_if_present(&mut form.lut, self.lut.map(Some));
    }
}

/// Sets `target` only when a value was supplied.
pub fn merge_if_present<T>(target: &mut ActiveValue<T>, value: Option<T>)
where
    T: Into<Value>,
{
    if let Some(value) = value {
        *target = Set(value);
    }
}

/// Service for issuing and maintaining quotation forms
#[derive(Clone)]
pub struct QuotationService {
    db_pool: Arc<DbPool>,
    forms: FormRepository,
    salesmen: SalesmanRepository,
    parties: PartyRepository,
    allocator: Arc<SerialAllocator>,
    event_sender: Option<Arc<EventSender>>,
}

impl QuotationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self::with_allocator(db_pool, event_sender, Arc::new(SerialAllocator::new()))
    }

    /// Services sharing one database in one process should share an allocator.
    pub fn with_allocator(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        allocator: Arc<SerialAllocator>,
    ) -> Self {
        Self {
            forms: FormRepository::new(db_pool.clone()),
            salesmen: SalesmanRepository::new(db_pool.clone()),
            parties: PartyRepository::new(db_pool.clone()),
            db_pool,
            allocator,
            event_sender,
        }
    }

    /// Issues a new quotation for `party_id` dated by the local clock
    pub async fn create_form(
        &self,
        salesman_id: i64,
        party_id: i64,
        input: NewQuotationForm,
    ) -> Result<quotation_form::Model, ServiceError> {
        let today = Local::now().date_naive();
        self.create_form_dated(salesman_id, party_id, input, today)
            .await
    }

    /// Issues a new quotation as if today were `today`
    #[instrument(skip(self, input))]
    pub async fn create_form_dated(
        &self,
        salesman_id: i64,
        party_id: i64,
        input: NewQuotationForm,
        today: NaiveDate,
    ) -> Result<quotation_form::Model, ServiceError> {
        input.validate()?;

        let salesman = self
            .salesmen
            .find_by_id(salesman_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Salesman {} not found", salesman_id)))?;
        let party = self
            .parties
            .find_by_id(party_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Party {} not found", party_id)))?;

        if salesman.first_name.trim().is_empty() {
            warn!(salesman_id, "Salesman has no first name; number will have an empty prefix");
        }

        let financial_year = FinancialYear::containing(today);
        let _guard = self.allocator.lock(financial_year).await;

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin transaction for quotation");
            ServiceError::DatabaseError(e)
        })?;

        let serial = self.allocator.next_serial(&txn, financial_year).await?;
        let number = QuotationNumber::new(&salesman.first_name, financial_year, serial).to_string();

        let form = quotation_form::ActiveModel {
            id: NotSet,
            quotation_number: Set(number.clone()),
            quotation_date: Set(input.quotation_date),
            payment_terms: Set(input.payment_terms),
            due_date: Set(input.due_date),
            po_no: Set(input.po_no),
            lut: Set(input.lut),
            party_id: Set(party.id),
            salesman_id: Set(salesman.id),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let created = form_repository::save(&txn, form)
            .await
            .map_err(|e| ServiceError::from_write_err(e, format!("quotation number {} already issued", number)))?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, quotation_number = %number, "Failed to commit quotation");
            ServiceError::DatabaseError(e)
        })?;

        counter!("erms_quotation.forms_created", 1);
        info!(form_id = created.id, quotation_number = %created.quotation_number, "Quotation created");
        self.publish(Event::QuotationCreated {
            form_id: created.id,
            quotation_number: created.quotation_number.clone(),
        })
        .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_form(&self, id: i64) -> Result<Option<quotation_form::Model>, ServiceError> {
        self.forms.find_by_id(id).await
    }

    /// Every form, oldest first
    #[instrument(skip(self))]
    pub async fn list_forms(&self) -> Result<Vec<quotation_form::Model>, ServiceError> {
        self.forms.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn search_forms(
        &self,
        filter: FormFilter,
    ) -> Result<Vec<quotation_form::Model>, ServiceError> {
        self.forms.search(&filter).await
    }

    /// Overwrites the fields `patch` carries and returns the merged form
    #[instrument(skip(self))]
    pub async fn update_form(
        &self,
        id: i64,
        patch: FormPatch,
    ) -> Result<quotation_form::Model, ServiceError> {
        patch.validate()?;

        let existing = self
            .forms
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quotation form {} not found", id)))?;

        if patch.is_empty() {
            debug!(form_id = id, "Empty patch");
        }

        let target_number = patch.quotation_number.clone();
        let mut form: quotation_form::ActiveModel = existing.into();
        patch.apply(&mut form);

        let updated = self.forms.save(form).await.map_err(|e| {
            let what = match target_number {
                Some(number) => format!("quotation number {} already issued", number),
                None => format!("quotation form {}", id),
            };
            ServiceError::from_write_err(e, what)
        })?;

        info!(form_id = id, "Quotation updated");
        self.publish(Event::QuotationUpdated(id)).await;
        Ok(updated)
    }

    /// Removes a form; deleting a missing id is not an error
    #[instrument(skip(self))]
    pub async fn delete_form(&self, id: i64) -> Result<(), ServiceError> {
        let removed = self.forms.delete_by_id(id).await?;
        if removed == 0 {
            debug!(form_id = id, "No quotation form to delete");
            return Ok(());
        }

        info!(form_id = id, "Quotation deleted");
        self.publish(Event::QuotationDeleted(id)).await;
        Ok(())
    }

    async fn publish(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.publish(event).await;
        }
    }
}
