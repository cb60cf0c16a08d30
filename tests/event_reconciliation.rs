//! Scenario tests for the event engine, running against the in-memory store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use daybook::traits::DataStore;
use daybook::{paths, Event, EventPlanner, EventRecord, FailurePolicy, MemoryStore};

const USER: &str = "user-1";

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).single().unwrap()
}

fn record(event_id: &str, title: &str, date: &DateTime<Utc>) -> EventRecord {
    EventRecord {
        event_id: event_id.to_string(),
        date: date.timestamp(),
        start: None,
        end: None,
        title: title.to_string(),
        desc: String::new(),
    }
}

async fn seed_event(store: &MemoryStore, event_id: &str, title: &str, date: &DateTime<Utc>) {
    store
        .set(&paths::event(event_id), serde_json::to_value(record(event_id, title, date)).unwrap())
        .await
        .unwrap();
    store
        .set(&paths::event_index(USER, date, event_id), json!({ "eventID": event_id }))
        .await
        .unwrap();
}

#[tokio::test]
async fn load_covers_a_five_day_window() {
    let _ = env_logger::builder().is_test(true).try_init();
    let reference = date(2023, 6, 1);

    let store = MemoryStore::new();
    seed_event(&store, "e-first", "on the reference day", &reference).await;
    seed_event(&store, "e-last", "on the final day", &(reference + Duration::days(4))).await;
    seed_event(&store, "e-out", "one day too far", &(reference + Duration::days(5))).await;

    let mut planner = EventPlanner::new(store, USER);
    planner.load_events(reference).await.unwrap();

    let ids: Vec<_> = planner.events().iter().filter_map(|e| e.id()).collect();
    assert_eq!(ids, vec!["e-first", "e-last"]);
}

#[tokio::test]
async fn create_event_writes_record_and_date_pointer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let when = date(2023, 6, 2);

    let mut planner = EventPlanner::new(MemoryStore::new(), USER);
    let mut event = Event::new("standup", "daily sync", when);
    event.set_time_range(Some(when), Some(when + Duration::minutes(15)));
    let event_id = planner.create_event(event).await.unwrap();

    let record_value = planner.store().get(&paths::event(&event_id)).await.unwrap().unwrap();
    let stored: EventRecord = serde_json::from_value(record_value).unwrap();
    assert_eq!(stored.title, "standup");
    assert_eq!(stored.date, when.timestamp());
    assert_eq!(stored.start, Some(when.timestamp()));

    assert_eq!(
        planner.store().get(&paths::event_index(USER, &when, &event_id)).await.unwrap(),
        Some(json!({ "eventID": event_id }))
    );
    assert_eq!(planner.events().len(), 1);
    assert!(!planner.events()[0].is_all_day());
}

#[tokio::test]
async fn changing_the_date_relocates_the_index_pointer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let d1 = date(2023, 6, 2);
    let d2 = date(2023, 6, 20);

    let store = MemoryStore::new();
    seed_event(&store, "e1", "movable", &d1).await;

    let mut planner = EventPlanner::new(store, USER);
    planner.load_events(d1).await.unwrap();

    let mut moved = planner.events()[0].clone();
    moved.set_date(d2);
    planner.update_event(moved).await.unwrap();

    // the pointer exists at the new date and no longer at the old one
    assert_eq!(
        planner.store().get(&paths::event_index(USER, &d2, "e1")).await.unwrap(),
        Some(json!({ "eventID": "e1" }))
    );
    assert_eq!(planner.store().get(&paths::event_index(USER, &d1, "e1")).await.unwrap(), None);

    let record_value = planner.store().get(&paths::event("e1")).await.unwrap().unwrap();
    let stored: EventRecord = serde_json::from_value(record_value).unwrap();
    assert_eq!(stored.date, d2.timestamp());
    assert_eq!(planner.events()[0].date(), &d2);
}

#[tokio::test]
async fn same_date_updates_rewrite_the_record_in_place() {
    let _ = env_logger::builder().is_test(true).try_init();
    let when = date(2023, 6, 2);

    let store = MemoryStore::new();
    seed_event(&store, "e1", "before", &when).await;

    let mut planner = EventPlanner::new(store, USER);
    planner.load_events(when).await.unwrap();

    let mut renamed = planner.events()[0].clone();
    renamed.set_title("after");
    planner.update_event(renamed).await.unwrap();

    let record_value = planner.store().get(&paths::event("e1")).await.unwrap().unwrap();
    let stored: EventRecord = serde_json::from_value(record_value).unwrap();
    assert_eq!(stored.title, "after");
    assert_eq!(
        planner.store().get(&paths::event_index(USER, &when, "e1")).await.unwrap(),
        Some(json!({ "eventID": "e1" }))
    );
}

#[tokio::test]
async fn delete_event_removes_record_and_pointer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let when = date(2023, 6, 2);

    let store = MemoryStore::new();
    seed_event(&store, "e1", "cancelled", &when).await;

    let mut planner = EventPlanner::new(store, USER);
    planner.load_events(when).await.unwrap();

    let event = planner.events()[0].clone();
    planner.delete_event(&event).await.unwrap();

    assert_eq!(planner.store().get(&paths::event("e1")).await.unwrap(), None);
    assert_eq!(planner.store().get(&paths::event_index(USER, &when, "e1")).await.unwrap(), None);
    assert!(planner.events().is_empty());

    // deleting again is a quiet no-op
    planner.delete_event(&event).await.unwrap();
}

#[tokio::test]
async fn ghost_pointers_are_excluded_and_deleted() {
    let _ = env_logger::builder().is_test(true).try_init();
    let when = date(2023, 6, 2);

    let store = MemoryStore::new();
    store
        .set(&paths::event_index(USER, &when, "ghost"), json!({ "eventID": "ghost" }))
        .await
        .unwrap();
    seed_event(&store, "e1", "a real event", &when).await;

    let mut planner = EventPlanner::new(store, USER);
    planner.load_events(when).await.unwrap();

    let ids: Vec<_> = planner.events().iter().filter_map(|e| e.id()).collect();
    assert_eq!(ids, vec!["e1"]);
    assert_eq!(
        planner.store().get(&paths::event_index(USER, &when, "ghost")).await.unwrap(),
        None,
        "the dangling date pointer must be self-healed away"
    );
}

#[tokio::test]
async fn updating_an_event_without_an_id_is_reported() {
    let _ = env_logger::builder().is_test(true).try_init();
    let when = date(2023, 6, 2);

    let mut planner = EventPlanner::new(MemoryStore::new(), USER);
    planner.update_event(Event::new("no id yet", "", when)).await.unwrap();

    planner.set_policy(FailurePolicy::FailFast);
    assert!(planner.update_event(Event::new("no id yet", "", when)).await.is_err());
}
