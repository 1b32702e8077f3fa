use dashmap::DashMap;
use metrics::counter;
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::repositories::{form_repository, sequence_repository};
use crate::services::numbering::{parse_serial, FinancialYear};

/// Hands out per-financial-year serials.
///
/// Callers hold the guard from [`SerialAllocator::lock`] for the whole
/// transaction that allocates a serial and inserts the form. Allocators that
/// do not share a lock (other services, other processes) serialize on the
/// database write lock taken by the opening `UPDATE`: a row lock on Postgres,
/// the database lock on SQLite.
#[derive(Debug, Default)]
pub struct SerialAllocator {
    locks: DashMap<FinancialYear, Arc<Mutex<()>>>,
}

impl SerialAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive allocation rights on `financial_year`.
    pub async fn lock(&self, financial_year: FinancialYear) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(financial_year)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Next serial for `financial_year`, seeding the counter from stored forms
    /// the first time the year is seen.
    ///
    /// The increment is the first statement on `conn`, so the write lock is held
    /// before anything is read.
    pub async fn next_serial<C: ConnectionTrait>(
        &self,
        conn: &C,
        financial_year: FinancialYear,
    ) -> Result<u32, ServiceError> {
        let label = financial_year.label();

        let serial = match sequence_repository::increment(conn, &label).await? {
            Some(serial) => serial,
            None => {
                let seed = seed_from_forms(conn, financial_year).await?;
                let seed = i32::try_from(seed).map_err(|_| {
                    ServiceError::MalformedState(format!("serial {} out of range", seed))
                })?;
                if sequence_repository::insert_if_absent(conn, &label, seed).await? > 0 {
                    info!(financial_year = %label, seed, "Started quotation sequence");
                }
                sequence_repository::increment(conn, &label)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::MalformedState(format!(
                            "quotation sequence {} vanished while seeding",
                            label
                        ))
                    })?
            }
        };

        counter!("erms_quotation.serials_allocated", 1);
        debug!(financial_year = %label, serial, "Allocated serial");

        u32::try_from(serial)
            .map_err(|_| ServiceError::MalformedState(format!("negative serial {}", serial)))
    }
}

/// Serial of the newest stored form in the year, or 0 when there is none.
async fn seed_from_forms<C: ConnectionTrait>(
    conn: &C,
    financial_year: FinancialYear,
) -> Result<u32, ServiceError> {
    let needle = financial_year.number_needle();
    match form_repository::find_most_recent_containing(conn, &needle).await? {
        Some(form) => parse_serial(&form.quotation_number, financial_year),
        None => Ok(0),
    }
}
