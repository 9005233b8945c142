//! Almanac event service.
//!
//! Async entry points over an injected [`store::EventStore`]: create and
//! fetch events, expand a series over a window, and edit or delete single
//! occurrences through per-date exclusions.

pub mod error;
pub mod events;
pub mod store;

pub use error::{ServiceError, ServiceResult};
pub use events::{EventService, NewEvent};
pub use store::{EventStore, InMemoryEventStore};
