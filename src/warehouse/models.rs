//! Row models for the warehouse tables.

use crate::records::Level;
use chrono::{DateTime, Datelike, Timelike};

/// Row of the songs dimension table.
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: f64,
}

/// Row of the artists dimension table.
#[derive(Clone, Debug, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Row of the time dimension table. All derived columns are pure UTC
/// functions of the millisecond timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeEntry {
    pub timestamp: i64,
    pub hour: u32,
    pub day: u32,
    /// ISO week number.
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Day of week, Monday = 0.
    pub weekday: u32,
}

impl TimeEntry {
    /// Derive the time dimension row for a millisecond epoch timestamp.
    ///
    /// Returns `None` when the timestamp is outside the representable
    /// date range.
    pub fn from_timestamp_ms(timestamp: i64) -> Option<Self> {
        let dt = DateTime::from_timestamp_millis(timestamp)?;
        Some(TimeEntry {
            timestamp,
            hour: dt.hour(),
            day: dt.day(),
            week: dt.iso_week().week(),
            month: dt.month(),
            year: dt.year(),
            weekday: dt.weekday().num_days_from_monday(),
        })
    }
}

/// Row of the users dimension table.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: Level,
}

/// Row of the songplays fact table.
#[derive(Clone, Debug, PartialEq)]
pub struct SongPlay {
    pub timestamp: i64,
    pub user_id: String,
    pub level: Level,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
