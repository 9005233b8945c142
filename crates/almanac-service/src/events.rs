//! Event operations exposed to callers.

use std::sync::Arc;

use almanac_core::config::Settings;
use almanac_recur::exclusion::{self, OccurrenceEdit, parse_calendar_date};
use almanac_recur::expand::{ExpansionOptions, ExpansionWindow, expand_instances};
use almanac_recur::model::{BaseEvent, EventDetails, OccurrenceInstance, RecurrenceRuleDto};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::store::EventStore;

/// Input for [`EventService::create_event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(flatten)]
    pub details: EventDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRuleDto>,
}

impl NewEvent {
    #[must_use]
    pub const fn new(details: EventDetails) -> Self {
        Self {
            details,
            recurrence: None,
        }
    }

    #[must_use]
    pub fn with_recurrence(mut self, rule: RecurrenceRuleDto) -> Self {
        self.recurrence = Some(rule);
        self
    }
}

/// ## Summary
/// Event operations over an injected record store.
///
/// Expansion reads a snapshot of the base event and never writes; exclusion
/// changes go through `EventStore::update` so concurrent edits of the same
/// series are serialized per record.
#[derive(Debug)]
pub struct EventService<S> {
    store: Arc<S>,
    options: ExpansionOptions,
}

impl<S> Clone for EventService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
        }
    }
}

impl<S: EventStore> EventService<S> {
    #[must_use]
    pub const fn new(store: Arc<S>, options: ExpansionOptions) -> Self {
        Self { store, options }
    }

    /// ## Summary
    /// Creates a service using the expansion limits from `settings`.
    ///
    /// ## Errors
    /// Returns `ServiceError::Recur` if the recurrence limits are invalid.
    pub fn from_settings(store: Arc<S>, settings: &Settings) -> ServiceResult<Self> {
        let options = ExpansionOptions::try_from(&settings.recurrence)?;
        Ok(Self::new(store, options))
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn options(&self) -> &ExpansionOptions {
        &self.options
    }

    /// ## Summary
    /// Validates and stores a new event.
    ///
    /// ## Errors
    /// Returns `ServiceError::Recur` if the recurrence rule is invalid, or a
    /// storage error.
    ///
    /// ## Side Effects
    /// Inserts one record.
    #[tracing::instrument(skip(self, new_event), fields(title = %new_event.details.title))]
    pub async fn create_event(&self, new_event: NewEvent) -> ServiceResult<BaseEvent> {
        let NewEvent {
            details,
            recurrence,
        } = new_event;

        let mut event = BaseEvent::new(details);
        if let Some(rule) = recurrence {
            event.recurrence = Some(rule.validate()?);
        }

        self.store.save(event.clone()).await?;
        tracing::debug!(event_id = %event.id, recurring = event.is_recurring(), "Created event");

        Ok(event)
    }

    /// ## Summary
    /// Fetches a stored event.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if no event has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_event(&self, id: Uuid) -> ServiceResult<BaseEvent> {
        self.store
            .fetch(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// ## Summary
    /// Expands a recurring event into the instances inside `[start, end]`.
    ///
    /// Boundaries are ISO dates (`YYYY-MM-DD`, covering the whole day) or
    /// ISO date-times.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown id, and
    /// `ServiceError::Recur` for a non-recurring event or a malformed window.
    #[tracing::instrument(skip(self))]
    pub async fn expand_recurring_event(
        &self,
        id: Uuid,
        start: &str,
        end: &str,
    ) -> ServiceResult<Vec<OccurrenceInstance>> {
        let window = ExpansionWindow::parse(start, end)?;
        let event = self.get_event(id).await?;

        let instances = expand_instances(&event, &window, &self.options)?;
        tracing::debug!(count = instances.len(), "Expanded recurring event");

        Ok(instances)
    }

    /// ## Summary
    /// Excludes the occurrence on `date` from the series.
    ///
    /// Excluding an already excluded date leaves the event unchanged.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown id, and
    /// `ServiceError::Recur` for a non-recurring event or a malformed date.
    ///
    /// ## Side Effects
    /// Updates the stored series.
    #[tracing::instrument(skip(self))]
    pub async fn add_exclusion_date(&self, id: Uuid, date: &str) -> ServiceResult<BaseEvent> {
        let date = parse_calendar_date(date)?;

        self.store
            .update(id, |event| {
                exclusion::add_exclusion(event, date)?;
                Ok(event.clone())
            })
            .await
    }

    /// ## Summary
    /// Replaces the occurrence on `date` with a standalone event carrying
    /// `details`.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown id, and
    /// `ServiceError::Recur` for a non-recurring event or a malformed date.
    ///
    /// ## Side Effects
    /// Updates the stored series and inserts the standalone event.
    #[tracing::instrument(skip(self, details))]
    pub async fn edit_occurrence(
        &self,
        id: Uuid,
        date: &str,
        details: EventDetails,
    ) -> ServiceResult<OccurrenceEdit> {
        let date = parse_calendar_date(date)?;

        let edit = self
            .store
            .update(id, |event| {
                let edit = exclusion::edit_occurrence(event.clone(), date, details)?;
                *event = edit.base.clone();
                Ok(edit)
            })
            .await?;

        self.store.save(edit.standalone.clone()).await?;
        tracing::debug!(standalone_id = %edit.standalone.id, "Stored edited occurrence");

        Ok(edit)
    }

    /// ## Summary
    /// Deletes the single occurrence on `date`; the rest of the series stays.
    ///
    /// ## Errors
    /// Same as [`EventService::add_exclusion_date`].
    ///
    /// ## Side Effects
    /// Updates the stored series.
    #[tracing::instrument(skip(self))]
    pub async fn delete_occurrence(&self, id: Uuid, date: &str) -> ServiceResult<BaseEvent> {
        self.add_exclusion_date(id, date).await
    }

    /// ## Summary
    /// Restores a previously deleted or edited occurrence.
    ///
    /// A standalone event created by an edit is left in place.
    ///
    /// ## Errors
    /// Same as [`EventService::add_exclusion_date`].
    #[tracing::instrument(skip(self))]
    pub async fn restore_occurrence(&self, id: Uuid, date: &str) -> ServiceResult<BaseEvent> {
        let date = parse_calendar_date(date)?;

        self.store
            .update(id, |event| {
                exclusion::remove_exclusion(event, date)?;
                Ok(event.clone())
            })
            .await
    }

    /// ## Summary
    /// Deletes an event record.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if no event has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: Uuid) -> ServiceResult<()> {
        if self.store.remove(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }
}
