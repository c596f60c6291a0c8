//! Events calendar: date-keyed events and month-grid arithmetic.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::wire;

/// An event stored by the backend under `/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD`.  Longer ISO strings are cut down on read.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    pub fn day(&self) -> Option<NaiveDate> {
        parse_day(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub fn validate_new_event(title: &str, date: &str, description: &str) -> Result<NewEvent> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Invalid("Event title is required.".into()));
    }
    let day = parse_day(date.trim())
        .ok_or_else(|| Error::Invalid(format!("Invalid date {date:?}, expected YYYY-MM-DD.")))?;
    let description = description.trim();
    Ok(NewEvent {
        title: title.to_string(),
        date: day.format("%Y-%m-%d").to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
    })
}

/// Group events by day; events with an unreadable date are dropped.
pub fn events_by_date(events: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut map: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for ev in events {
        if let Some(day) = ev.day() {
            map.entry(day).or_default().push(ev.clone());
        }
    }
    map
}

/// Layout of one month in a Monday-first grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st (0 = month starts on Monday).
    pub leading_blanks: u32,
    pub days: u32,
}

impl MonthGrid {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::Invalid(format!("invalid month {year}-{month}")))?;
        let (ny, nm) = next_month(year, month);
        let days = NaiveDate::from_ymd_opt(ny, nm, 1)
            .map(|next| next.signed_duration_since(first).num_days() as u32)
            .unwrap_or(31);
        Ok(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_monday(),
            days,
        })
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn label(&self) -> String {
        format!("{} {}", month_label(self.month), self.year)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn month_label(m: u32) -> &'static str {
    match m {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str, date: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.into(),
            title: format!("event {id}"),
            date: date.into(),
            description: None,
        }
    }

    #[test]
    fn test_month_grid() {
        // June 2024 starts on a Saturday.
        let g = MonthGrid::new(2024, 6).unwrap();
        assert_eq!(g.leading_blanks, 5);
        assert_eq!(g.days, 30);
        assert_eq!(MonthGrid::new(2024, 2).unwrap().days, 29);
        assert_eq!(MonthGrid::new(2023, 2).unwrap().days, 28);
        assert_eq!(MonthGrid::new(2024, 12).unwrap().days, 31);
        assert!(MonthGrid::new(2024, 13).is_err());
        assert_eq!(g.label(), "June 2024");
    }

    #[test]
    fn test_month_navigation_wraps() {
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(prev_month(2025, 1), (2024, 12));
        assert_eq!(next_month(2024, 3), (2024, 4));
    }

    #[test]
    fn test_group_by_date() {
        let events = vec![
            ev("1", "2024-06-03"),
            ev("2", "2024-06-03T09:00:00.000Z"),
            ev("3", "2024-06-10"),
            ev("4", "garbage"),
        ];
        let map = events_by_date(&events);
        assert_eq!(map.len(), 2);
        let d = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(map[&d].len(), 2);
    }

    #[test]
    fn test_validate_new_event() {
        let e = validate_new_event(" Sampling ", "2024-06-03", "").unwrap();
        assert_eq!(e.title, "Sampling");
        assert_eq!(e.description, None);
        assert!(validate_new_event("", "2024-06-03", "").is_err());
        assert!(validate_new_event("x", "03/06/2024", "").is_err());
    }

    #[test]
    fn test_event_numeric_id() {
        let e: CalendarEvent =
            serde_json::from_str(r#"{"id": 3, "title": "t", "date": "2024-01-01"}"#).unwrap();
        assert_eq!(e.id, "3");
    }
}
