//! Calendar events and their remote record form

use std::error::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils;

pub type EventId = String;

/// A time-bound calendar event.
///
/// `start`/`end` are optional; an event with neither runs all day
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    id: Option<EventId>,
    title: String,
    desc: String,
    date: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl Event {
    /// Create a brand new event that is not on the store yet
    pub fn new<S: ToString, T: ToString>(title: S, desc: T, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            desc: desc.to_string(),
            date,
            start: None,
            end: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn desc(&self) -> &str {
        &self.desc
    }
    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }
    pub fn start(&self) -> Option<&DateTime<Utc>> {
        self.start.as_ref()
    }
    pub fn end(&self) -> Option<&DateTime<Utc>> {
        self.end.as_ref()
    }
    pub fn is_all_day(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn set_title<S: ToString>(&mut self, title: S) {
        self.title = title.to_string();
    }
    pub fn set_desc<S: ToString>(&mut self, desc: S) {
        self.desc = desc.to_string();
    }
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }
    pub fn set_time_range(&mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) {
        self.start = start;
        self.end = end;
    }

    pub(crate) fn set_id(&mut self, id: EventId) {
        self.id = Some(id);
    }

    pub fn to_record(&self, event_id: &str) -> EventRecord {
        EventRecord {
            event_id: event_id.to_string(),
            date: self.date.timestamp(),
            start: self.start.map(|d| d.timestamp()),
            end: self.end.map(|d| d.timestamp()),
            title: self.title.clone(),
            desc: self.desc.clone(),
        }
    }

    pub fn from_record(record: EventRecord) -> Result<Self, Box<dyn Error>> {
        let date = utils::from_epoch(record.date)
            .ok_or_else(|| format!("event {}: invalid date timestamp", record.event_id))?;
        Ok(Self {
            id: Some(record.event_id),
            title: record.title,
            desc: record.desc,
            date,
            start: record.start.and_then(utils::from_epoch),
            end: record.end.and_then(utils::from_epoch),
        })
    }
}

/// The wire form of an event, written at `events/{eventID}`.
/// `start`/`end` are serialized as explicit nulls when absent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub date: i64,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub desc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).single().unwrap()
    }

    #[test]
    fn record_round_trip() {
        let mut event = Event::new("dentist", "bring the referral", date(2023, 2, 9, 0));
        event.set_time_range(Some(date(2023, 2, 9, 14)), Some(date(2023, 2, 9, 15)));
        let record = event.to_record("e1");
        assert_eq!(record.start, Some(date(2023, 2, 9, 14).timestamp()));

        let back = Event::from_record(record).unwrap();
        assert_eq!(back.id(), Some("e1"));
        assert_eq!(back.title(), "dentist");
        assert_eq!(back.start(), Some(&date(2023, 2, 9, 14)));
        assert!(!back.is_all_day());
    }

    #[test]
    fn all_day_events_serialize_null_times() {
        let event = Event::new("holiday", "", date(2023, 2, 9, 0));
        assert!(event.is_all_day());
        let value = serde_json::to_value(event.to_record("e1")).unwrap();
        assert!(value.get("start").unwrap().is_null());
        assert!(value.get("end").unwrap().is_null());
    }
}
