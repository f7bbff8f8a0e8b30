use std::time::Duration;

use models::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(ValidationErrors),
    #[error("menu {0} not found")]
    NotFound(i64),
    #[error("edit conflict: menu {0} was modified or deleted since it was read")]
    EditConflict(i64),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::EditConflict(_) => 2003,
            ServiceError::Timeout(_) => 2101,
            ServiceError::Db(_) => 2200,
        }
    }

    /// Conventional HTTP status for an API layer sitting on top of the store.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 422,
            ServiceError::NotFound(_) => 404,
            ServiceError::EditConflict(_) => 409,
            ServiceError::Timeout(_) => 504,
            ServiceError::Db(_) => 500,
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Db(e.to_string())
    }
}
