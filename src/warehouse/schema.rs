//! Database schema for the play warehouse.
//!
//! Star schema:
//! - songs, artists, time, users: dimension tables
//! - songplays: fact table, one row per playback event

/// SQL schema for the warehouse database.
pub const WAREHOUSE_SCHEMA_SQL: &str = r#"
-- Song dimension, one row per song metadata file
CREATE TABLE IF NOT EXISTS songs (
    song_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    artist_id TEXT NOT NULL,
    year INTEGER,
    duration REAL NOT NULL
);

-- Artist dimension, from the same song metadata files
CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT,
    latitude REAL,
    longitude REAL
);

-- Time dimension, one row per distinct playback timestamp
-- (Unix milliseconds; derived columns are UTC)
CREATE TABLE IF NOT EXISTS time (
    timestamp INTEGER PRIMARY KEY,
    hour INTEGER NOT NULL,
    day INTEGER NOT NULL,
    week INTEGER NOT NULL,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL,
    weekday INTEGER NOT NULL
);

-- User dimension; level reflects the latest observed event
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    gender TEXT,
    level TEXT NOT NULL
);

-- Playback facts; song_id/artist_id are NULL when the played track
-- has no match in the dimension tables
CREATE TABLE IF NOT EXISTS songplays (
    songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    level TEXT NOT NULL,
    song_id TEXT,
    artist_id TEXT,
    session_id INTEGER NOT NULL,
    location TEXT,
    user_agent TEXT
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_songs_title_duration ON songs(title, duration);
CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name);
CREATE INDEX IF NOT EXISTS idx_songplays_user ON songplays(user_id);
CREATE INDEX IF NOT EXISTS idx_songplays_timestamp ON songplays(timestamp);
"#;
