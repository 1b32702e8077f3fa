#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use erms_quotation::{
    db::{self, DbConfig, DbPool},
    entities::{party, quotation_form, salesman},
    events::{Event, EventSender},
    services::{
        parties::{NewParty, PartyService},
        quotations::QuotationService,
        salesmen::{NewSalesman, SalesmanService},
        sequence::SerialAllocator,
    },
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use tokio::sync::mpsc;

/// Services wired to a fresh in-memory SQLite database.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub salesmen: SalesmanService,
    pub parties: PartyService,
    pub quotations: QuotationService,
    pub events: mpsc::Receiver<Event>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::establish_connection("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        Self::from_pool(pool).await
    }

    /// Services on a file-backed SQLite database with a multi-connection pool.
    pub async fn with_sqlite_file(path: &Path, max_connections: u32) -> Self {
        let config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("failed to open sqlite file");
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: DbPool) -> Self {
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let db = Arc::new(pool);
        let (sender, events) = EventSender::channel(256);
        let sender = Some(Arc::new(sender));

        Self {
            salesmen: SalesmanService::new(db.clone(), sender.clone()),
            parties: PartyService::new(db.clone(), sender.clone()),
            quotations: QuotationService::with_allocator(
                db.clone(),
                sender,
                Arc::new(SerialAllocator::new()),
            ),
            db,
            events,
        }
    }

    pub async fn seed_salesman(&self, first_name: &str) -> salesman::Model {
        self.salesmen
            .create_salesman(NewSalesman {
                first_name: first_name.to_string(),
                last_name: Some("Kumar".to_string()),
                email: None,
                mobile_number: None,
            })
            .await
            .expect("failed to seed salesman")
    }

    pub async fn seed_party(&self, salesman_id: i64, customer_name: &str) -> party::Model {
        self.parties
            .create_party(
                salesman_id,
                NewParty {
                    customer_name: customer_name.to_string(),
                    city: Some("Pune".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("failed to seed party")
    }

    /// Writes a salesman row directly, bypassing input validation.
    pub async fn insert_raw_salesman(&self, first_name: &str) -> salesman::Model {
        salesman::ActiveModel {
            id: NotSet,
            first_name: Set(first_name.to_string()),
            last_name: Set(None),
            email: Set(None),
            mobile_number: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert raw salesman")
    }

    /// Writes a form row directly, bypassing number allocation.
    pub async fn insert_raw_form(
        &self,
        quotation_number: &str,
        salesman_id: i64,
        party_id: i64,
    ) -> quotation_form::Model {
        quotation_form::ActiveModel {
            id: NotSet,
            quotation_number: Set(quotation_number.to_string()),
            quotation_date: Set(None),
            payment_terms: Set(None),
            due_date: Set(None),
            po_no: Set(None),
            lut: Set(None),
            party_id: Set(party_id),
            salesman_id: Set(salesman_id),
            created_at: Set(Utc::now()),
            updated_at: NotSet,
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert raw form")
    }

    /// Events published so far, without waiting for more.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut seen = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            seen.push(event);
        }
        seen
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
