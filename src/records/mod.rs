//! Typed records for the two JSON file families the warehouse ingests.
//!
//! Song metadata files hold one JSON object per file; activity log files
//! hold one JSON object per line. Both are decoded into typed records up
//! front so that malformed or incomplete input fails as a decode error
//! instead of surfacing later as a bad row.

mod event;
mod song;

pub use event::{decode_log_line, Level, LogEvent, Playback, NEXT_SONG_PAGE};
pub use song::{
    decode_song_file, normalize_coordinate, normalize_location, normalize_year, SongRecord,
};

use thiserror::Error;

/// Errors that can occur while decoding input records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("file contains no JSON record")]
    EmptyFile,

    #[error("playback event at ts {ts} is missing required field `{field}`")]
    MissingField { ts: i64, field: &'static str },
}
