//! Quotation number formatting and parsing.
//!
//! A number looks like `RAJ/QT/24-25-001`: a name prefix, the `QT` marker, the
//! financial-year label and a zero-padded serial.

use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::errors::ServiceError;

/// Marker between the prefix and the financial year.
pub const QUOTATION_MARKER: &str = "QT";

/// Number of leading first-name characters used as the prefix.
pub const PREFIX_LEN: usize = 3;

/// Accounting year running from 1 April to 31 March, identified by the
/// calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FinancialYear {
    start_year: i32,
}

impl FinancialYear {
    pub fn starting_in(start_year: i32) -> Self {
        Self { start_year }
    }

    /// The financial year a calendar date falls into.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            Self::starting_in(date.year())
        } else {
            Self::starting_in(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Label such as `24-25`. Components are not padded, so 2000 gives `0-1`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Substring every number issued in this year contains.
    pub fn number_needle(&self) -> String {
        format!("/{}/{}-", QUOTATION_MARKER, self)
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start_year.rem_euclid(100),
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

/// Upper-cased first `PREFIX_LEN` characters of `first_name`; shorter names are
/// used whole and an empty name gives an empty prefix.
pub fn name_prefix(first_name: &str) -> String {
    first_name
        .chars()
        .take(PREFIX_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// A fully assembled quotation number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationNumber {
    pub prefix: String,
    pub financial_year: FinancialYear,
    pub serial: u32,
}

impl QuotationNumber {
    pub fn new(first_name: &str, financial_year: FinancialYear, serial: u32) -> Self {
        Self {
            prefix: name_prefix(first_name),
            financial_year,
            serial,
        }
    }
}

impl fmt::Display for QuotationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}-{:03}",
            self.prefix, QUOTATION_MARKER, self.financial_year, self.serial
        )
    }
}

/// Extracts the serial from a stored number issued in `financial_year`.
///
/// The serial is whatever follows the last `{label}-`; the label itself
/// contains a `-`, so a plain split on `-` is not used.
pub fn parse_serial(number: &str, financial_year: FinancialYear) -> Result<u32, ServiceError> {
    let anchor = format!("{}-", financial_year);
    let malformed = || {
        ServiceError::MalformedState(format!(
            "quotation number '{}' has no serial after '{}'",
            number, anchor
        ))
    };

    if number.split('-').count() < 3 {
        return Err(malformed());
    }

    let start = number.rfind(&anchor).ok_or_else(malformed)? + anchor.len();
    let tail = &number[start..];
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    tail.parse::<u32>().map_err(|_| malformed())
}
