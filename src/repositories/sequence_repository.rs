//! Per-financial-year serial counters.
//!
//! Every function takes a generic connection so allocation can run inside the
//! transaction that also inserts the form.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::entities::quotation_sequence::{
    ActiveModel as SequenceActiveModel, Column, Entity as QuotationSequence,
    Model as SequenceModel,
};

pub async fn find<C: ConnectionTrait>(
    conn: &C,
    financial_year: &str,
) -> Result<Option<SequenceModel>, DbErr> {
    QuotationSequence::find_by_id(financial_year.to_owned())
        .one(conn)
        .await
}

/// Creates the counter row starting at `last_serial`; an existing row wins.
pub async fn insert_if_absent<C: ConnectionTrait>(
    conn: &C,
    financial_year: &str,
    last_serial: i32,
) -> Result<u64, DbErr> {
    let row = SequenceActiveModel {
        financial_year: Set(financial_year.to_owned()),
        last_serial: Set(last_serial),
        updated_at: Set(Utc::now()),
    };

    QuotationSequence::insert(row)
        .on_conflict(
            OnConflict::column(Column::FinancialYear)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
}

/// Bumps the counter in place and returns the new value, or `None` when the
/// year has no counter row yet.
///
/// This is a write, so issuing it first in a transaction makes SQLite take the
/// write lock up front and queue competing allocations on its busy timeout.
pub async fn increment<C: ConnectionTrait>(
    conn: &C,
    financial_year: &str,
) -> Result<Option<i32>, DbErr> {
    let result = QuotationSequence::update_many()
        .col_expr(Column::LastSerial, Expr::col(Column::LastSerial).add(1))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::FinancialYear.eq(financial_year))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    find(conn, financial_year)
        .await?
        .map(|row| Some(row.last_serial))
        .ok_or_else(|| DbErr::RecordNotFound(format!("quotation sequence {}", financial_year)))
}
