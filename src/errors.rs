use sea_orm::error::DbErr;
use sea_orm::SqlErr;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Stored data does not have the shape the service relies on,
    /// e.g. a quotation number without a parsable serial.
    #[error("Malformed state: {0}")]
    MalformedState(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Maps unique-constraint violations to `Conflict`, everything else to `DatabaseError`.
    pub fn from_write_err(error: DbErr, what: impl Into<String>) -> Self {
        match error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::Conflict(format!("{} ({})", what.into(), detail))
            }
            _ => ServiceError::DatabaseError(error),
        }
    }
}

pub type AppError = ServiceError;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn display_includes_category() {
        assert_eq!(
            ServiceError::NotFound("Salesman 7 not found".into()).to_string(),
            "Not found: Salesman 7 not found"
        );
        assert_eq!(
            ServiceError::MalformedState("bad number".into()).to_string(),
            "Malformed state: bad number"
        );
    }

    #[test]
    fn non_unique_write_errors_stay_database_errors() {
        let err = ServiceError::from_write_err(DbErr::Custom("disk full".into()), "insert form");
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }

    #[test]
    fn validation_errors_convert() {
        let err: ServiceError = Named { name: String::new() }.validate().unwrap_err().into();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn db_errors_convert_with_question_mark() {
        fn fails() -> Result<(), ServiceError> {
            let write: Result<(), DbErr> = Err(DbErr::Custom("nope".into()));
            write?;
            Ok(())
        }
        assert!(matches!(fails(), Err(ServiceError::DatabaseError(_))));
    }
}
