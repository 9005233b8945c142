use thiserror::Error;
use uuid::Uuid;

/// Recurrence engine errors
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Event {0} is not a recurring event")]
    NotRecurring(Uuid),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid expansion window: {0}")]
    InvalidWindow(String),

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
