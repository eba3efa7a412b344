use super::DecodeError;
use serde::Deserialize;

/// One song metadata file: a single JSON object describing a song and
/// its artist. Unknown fields (e.g. `num_songs`) are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
}

/// Decode the single record of a song metadata file.
///
/// Song files follow the line-delimited framing convention but carry
/// exactly one record, so the first non-empty line is the record.
pub fn decode_song_file(contents: &str) -> Result<SongRecord, DecodeError> {
    let line = contents
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(DecodeError::EmptyFile)?;
    Ok(serde_json::from_str(line)?)
}

/// A year of 0 (or any non-positive value) marks an unknown release year.
pub fn normalize_year(year: i32) -> Option<i32> {
    (year > 0).then_some(year)
}

/// An empty location string marks an unknown location.
pub fn normalize_location(location: Option<String>) -> Option<String> {
    location.filter(|location| !location.is_empty())
}

/// Non-finite coordinates (NaN sentinels upstream) mark unknown coordinates.
pub fn normalize_coordinate(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}
