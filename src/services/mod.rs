// Quotation numbering
pub mod numbering;
pub mod sequence;

// Entity services
pub mod parties;
pub mod quotations;
pub mod salesmen;

use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
