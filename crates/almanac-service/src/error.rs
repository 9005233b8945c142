use thiserror::Error;
use uuid::Uuid;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Event not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Recur(#[from] almanac_recur::error::RecurError),

    #[error(transparent)]
    Core(#[from] almanac_core::error::CoreError),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
