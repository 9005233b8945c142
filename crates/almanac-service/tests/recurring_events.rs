//! End-to-end scenarios through the event service.

use std::sync::Arc;

use almanac_recur::expand::{ExpansionOptions, SeedMode};
use almanac_recur::model::{EventDetails, Notification, NotificationKind, OccurrenceInstance, RecurrenceRuleDto};
use almanac_service::{EventService, InMemoryEventStore, NewEvent};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

fn service_with(options: ExpansionOptions) -> EventService<InMemoryEventStore> {
    EventService::new(Arc::new(InMemoryEventStore::new()), options)
}

fn dates(instances: &[OccurrenceInstance]) -> Vec<NaiveDate> {
    instances.iter().map(OccurrenceInstance::occurrence_date).collect()
}

#[test_log::test(tokio::test)]
async fn daily_series_with_one_exclusion() {
    let service = service_with(ExpansionOptions::default());
    let event = service
        .create_event(
            NewEvent::new(EventDetails::new("Gym", at(2024, 1, 1, 7, 0)).with_end_date(at(2024, 1, 1, 8, 0)))
                .with_recurrence(RecurrenceRuleDto::daily()),
        )
        .await
        .unwrap();

    service.add_exclusion_date(event.id, "2024-01-03").await.unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2024-01-05")
        .await
        .unwrap();

    assert_eq!(
        dates(&instances),
        vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 4), day(2024, 1, 5)]
    );
    for instance in &instances {
        assert_eq!(instance.parent_event_id, event.id);
        assert_eq!(instance.end_date() - instance.start_date(), chrono::TimeDelta::hours(1));
        assert_eq!(instance.id, format!("{}-{}", event.id, instance.occurrence_date()));
    }
}

#[test_log::test(tokio::test)]
async fn weekday_series_limited_by_count() {
    let service = service_with(ExpansionOptions::default());
    let event = service
        .create_event(
            NewEvent::new(EventDetails::new("Focus time", at(2024, 1, 1, 13, 0))).with_recurrence(
                RecurrenceRuleDto::weekly()
                    .with_days_of_week(&[1, 2, 3, 4, 5])
                    .with_count(3),
            ),
        )
        .await
        .unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2024-12-31")
        .await
        .unwrap();

    assert_eq!(dates(&instances), vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);
    assert!(
        instances
            .iter()
            .all(|i| !matches!(i.start_date().weekday(), Weekday::Sat | Weekday::Sun))
    );
}

#[test_log::test(tokio::test)]
async fn monthly_series_returns_to_the_31st() {
    let service = service_with(ExpansionOptions::default());
    let event = service
        .create_event(
            NewEvent::new(EventDetails::new("Invoices", at(2024, 1, 31, 17, 0)))
                .with_recurrence(RecurrenceRuleDto::monthly()),
        )
        .await
        .unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2024-04-30")
        .await
        .unwrap();

    assert_eq!(
        dates(&instances),
        vec![day(2024, 1, 31), day(2024, 2, 29), day(2024, 3, 31), day(2024, 4, 30)]
    );
}

#[test_log::test(tokio::test)]
async fn end_date_is_inclusive() {
    let service = service_with(ExpansionOptions::default());
    let event = service
        .create_event(
            NewEvent::new(EventDetails::new("Sprint", at(2024, 1, 1, 10, 0)))
                .with_recurrence(RecurrenceRuleDto::weekly().with_end_date(at(2024, 1, 15, 10, 0))),
        )
        .await
        .unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2024-03-01")
        .await
        .unwrap();

    assert_eq!(dates(&instances), vec![day(2024, 1, 1), day(2024, 1, 8), day(2024, 1, 15)]);
}

#[test_log::test(tokio::test)]
async fn edited_occurrence_replaces_generated_one() {
    let service = service_with(ExpansionOptions::default());
    let event = service
        .create_event(
            NewEvent::new(
                EventDetails::new("Standup", at(2024, 1, 1, 9, 0))
                    .with_notification(Notification::new(NotificationKind::Popup, 5, "Standup in 5")),
            )
            .with_recurrence(RecurrenceRuleDto::daily()),
        )
        .await
        .unwrap();

    let edit = service
        .edit_occurrence(
            event.id,
            "2024-01-02T09:00:00",
            EventDetails::new("Standup (moved)", at(2024, 1, 2, 11, 0)),
        )
        .await
        .unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2024-01-03")
        .await
        .unwrap();
    assert_eq!(dates(&instances), vec![day(2024, 1, 1), day(2024, 1, 3)]);

    let reminders: Vec<_> = instances[1].reminders().map(|(_, fire_at)| fire_at).collect();
    assert_eq!(reminders, vec![at(2024, 1, 3, 8, 55)]);

    let standalone = service.get_event(edit.standalone.id).await.unwrap();
    assert_eq!(standalone.parent_event_id, Some(event.id));
    assert_eq!(standalone.details.start_date, at(2024, 1, 2, 11, 0));
}

#[test_log::test(tokio::test)]
async fn series_start_seeding_keeps_phase() {
    let window_seeded = service_with(ExpansionOptions::default());
    let series_seeded = service_with(ExpansionOptions::default().with_seed_mode(SeedMode::SeriesStart));

    let new_event = NewEvent::new(EventDetails::new("Payroll", at(2024, 1, 5, 12, 0)))
        .with_recurrence(RecurrenceRuleDto::daily().with_interval(7));

    let a = window_seeded.create_event(new_event.clone()).await.unwrap();
    let b = series_seeded.create_event(new_event).await.unwrap();

    let from_window = window_seeded
        .expand_recurring_event(a.id, "2024-02-01", "2024-02-29")
        .await
        .unwrap();
    let from_series = series_seeded
        .expand_recurring_event(b.id, "2024-02-01", "2024-02-29")
        .await
        .unwrap();

    // Window seeding starts at the window boundary itself.
    assert_eq!(from_window[0].start_date(), at(2024, 2, 1, 0, 0));
    // Series seeding lands on the series' own Fridays at noon.
    assert_eq!(
        from_series.iter().map(OccurrenceInstance::start_date).collect::<Vec<_>>(),
        vec![
            at(2024, 2, 2, 12, 0),
            at(2024, 2, 9, 12, 0),
            at(2024, 2, 16, 12, 0),
            at(2024, 2, 23, 12, 0),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn iteration_bound_returns_partial_result() {
    let service = service_with(ExpansionOptions::default().with_max_iterations(10));
    let event = service
        .create_event(
            NewEvent::new(EventDetails::new("Water plants", at(2024, 1, 1, 8, 0)))
                .with_recurrence(RecurrenceRuleDto::daily()),
        )
        .await
        .unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2024-12-31")
        .await
        .unwrap();

    assert_eq!(instances.len(), 10);
}

#[test_log::test(tokio::test)]
async fn large_count_is_not_capped_by_default() {
    let service = service_with(ExpansionOptions::default());
    let event = service
        .create_event(
            NewEvent::new(EventDetails::new("Journal", at(2024, 1, 1, 21, 0)))
                .with_recurrence(RecurrenceRuleDto::daily().with_count(1500)),
        )
        .await
        .unwrap();

    let instances = service
        .expand_recurring_event(event.id, "2024-01-01", "2030-12-31")
        .await
        .unwrap();

    assert_eq!(instances.len(), 1500);
    assert_eq!(instances.last().map(OccurrenceInstance::occurrence_date), Some(day(2028, 2, 8)));
}
