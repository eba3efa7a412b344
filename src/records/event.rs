use super::DecodeError;
use serde::{Deserialize, Serialize};

/// Page value of the events that represent an actual song playback.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// Subscription level of a user at the time of an event.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    /// Convert from database string representation
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Level::Free),
            "paid" => Some(Level::Paid),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Level::Free => "free",
            Level::Paid => "paid",
        }
    }
}

/// One line of an activity log file.
///
/// Only `ts` and `page` are required at this stage: non-playback events
/// (login pages, home pages, logged-out traffic) legitimately carry null
/// playback fields, and they are filtered out before those fields are
/// ever needed.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub ts: i64,
    pub page: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// A validated playback event: a `NextSong` log event with every field
/// the fact and dimension rows need.
#[derive(Clone, Debug, PartialEq)]
pub struct Playback {
    pub ts: i64,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: Level,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl LogEvent {
    pub fn is_next_song(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }

    /// Validate this event into a [`Playback`], rejecting events that
    /// lack a field the warehouse rows require.
    pub fn into_playback(self) -> Result<Playback, DecodeError> {
        let ts = self.ts;
        let missing = |field| DecodeError::MissingField { ts, field };
        Ok(Playback {
            ts,
            user_id: self.user_id.ok_or_else(|| missing("userId"))?,
            first_name: self.first_name.ok_or_else(|| missing("firstName"))?,
            last_name: self.last_name.ok_or_else(|| missing("lastName"))?,
            gender: self.gender,
            level: self.level.ok_or_else(|| missing("level"))?,
            song: self.song.ok_or_else(|| missing("song"))?,
            artist: self.artist.ok_or_else(|| missing("artist"))?,
            length: self.length.ok_or_else(|| missing("length"))?,
            session_id: self.session_id.ok_or_else(|| missing("sessionId"))?,
            location: self.location,
            user_agent: self.user_agent,
        })
    }
}

/// Decode one line of an activity log file.
pub fn decode_log_line(line: &str) -> Result<LogEvent, DecodeError> {
    Ok(serde_json::from_str(line)?)
}
