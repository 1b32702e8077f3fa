//! ERMS quotation core
//!
//! Salesmen, the parties they quote to, and quotation forms whose numbers are
//! allocated per financial year (`RAJ/QT/24-25-001`).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod repositories;
pub mod services;

pub mod prelude {
    pub use crate::db::DbPool;
    pub use crate::entities::{party, quotation_form, salesman};
    pub use crate::errors::{AppError, ServiceError};
    pub use crate::events::{Event, EventSender};
    pub use crate::repositories::FormFilter;
    pub use crate::services::{
        numbering::{FinancialYear, QuotationNumber},
        parties::{NewParty, PartyService},
        quotations::{FormPatch, NewQuotationForm, QuotationService},
        salesmen::{NewSalesman, SalesmanService},
        sequence::SerialAllocator,
    };
}
