//! SQLite store for the play warehouse.
//!
//! The statement contract of the ETL core lives here: five parameterized
//! inserts (one per table) and one lookup select. Conflict clauses carry
//! the idempotence policy, so re-running a batch over the same files is
//! safe: songs, artists and time entries keep the first row, users keep
//! the latest subscription level.

use super::models::{Artist, Song, SongPlay, TimeEntry, User};
use super::schema::WAREHOUSE_SCHEMA_SQL;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const INSERT_SONG_SQL: &str = "\
    INSERT INTO songs (song_id, title, artist_id, year, duration) \
    VALUES (?1, ?2, ?3, ?4, ?5) \
    ON CONFLICT (song_id) DO NOTHING";

const INSERT_ARTIST_SQL: &str = "\
    INSERT INTO artists (artist_id, name, location, latitude, longitude) \
    VALUES (?1, ?2, ?3, ?4, ?5) \
    ON CONFLICT (artist_id) DO NOTHING";

const INSERT_TIME_ENTRY_SQL: &str = "\
    INSERT INTO time (timestamp, hour, day, week, month, year, weekday) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
    ON CONFLICT (timestamp) DO NOTHING";

const INSERT_USER_SQL: &str = "\
    INSERT INTO users (user_id, first_name, last_name, gender, level) \
    VALUES (?1, ?2, ?3, ?4, ?5) \
    ON CONFLICT (user_id) DO UPDATE SET level = excluded.level";

const INSERT_SONG_PLAY_SQL: &str = "\
    INSERT INTO songplays \
    (timestamp, user_id, level, song_id, artist_id, session_id, location, user_agent) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const FIND_SONG_AND_ARTIST_SQL: &str = "\
    SELECT s.song_id, a.artist_id \
    FROM songs s JOIN artists a ON s.artist_id = a.artist_id \
    WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3";

/// Row counts per warehouse table, for the end-of-run summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub songs: i64,
    pub artists: i64,
    pub time_entries: i64,
    pub users: i64,
    pub song_plays: i64,
}

/// Trait for warehouse storage operations.
pub trait WarehouseStore: Send + Sync {
    // ==================== Inserts ====================

    /// Insert a song dimension row.
    fn insert_song(&self, song: &Song) -> Result<()>;

    /// Insert an artist dimension row.
    fn insert_artist(&self, artist: &Artist) -> Result<()>;

    /// Insert a time dimension row.
    fn insert_time_entry(&self, entry: &TimeEntry) -> Result<()>;

    /// Insert a user dimension row, updating the subscription level on
    /// re-insertion.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Insert a playback fact row.
    fn insert_song_play(&self, play: &SongPlay) -> Result<()>;

    // ==================== Lookup ====================

    /// Find the (song_id, artist_id) pair whose title, artist name and
    /// duration match exactly. Zero or one result expected.
    fn find_song_and_artist_ids(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<(String, String)>>;

    // ==================== Per-file transactions ====================

    /// Begin the transaction covering one input file.
    fn begin_file(&self) -> Result<()>;

    /// Commit the current file's transaction.
    fn commit_file(&self) -> Result<()>;

    /// Roll back the current file's transaction.
    fn rollback_file(&self) -> Result<()>;

    // ==================== Stats ====================

    /// Row counts across all warehouse tables.
    fn count_rows(&self) -> Result<RowCounts>;
}

/// SQLite implementation of [`WarehouseStore`].
pub struct SqliteWarehouseStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWarehouseStore {
    /// Open or create a warehouse database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open warehouse database: {:?}", path))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory warehouse database.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.execute_batch(WAREHOUSE_SCHEMA_SQL)
            .context("Failed to apply warehouse schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn count_table(conn: &Connection, table: &str) -> Result<i64> {
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count)
    }
}

impl WarehouseStore for SqliteWarehouseStore {
    fn insert_song(&self, song: &Song) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            INSERT_SONG_SQL,
            params![
                song.song_id,
                song.title,
                song.artist_id,
                song.year,
                song.duration,
            ],
        )?;
        Ok(())
    }

    fn insert_artist(&self, artist: &Artist) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            INSERT_ARTIST_SQL,
            params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude,
            ],
        )?;
        Ok(())
    }

    fn insert_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            INSERT_TIME_ENTRY_SQL,
            params![
                entry.timestamp,
                entry.hour,
                entry.day,
                entry.week,
                entry.month,
                entry.year,
                entry.weekday,
            ],
        )?;
        Ok(())
    }

    fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            INSERT_USER_SQL,
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.gender,
                user.level.as_db_str(),
            ],
        )?;
        Ok(())
    }

    fn insert_song_play(&self, play: &SongPlay) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            INSERT_SONG_PLAY_SQL,
            params![
                play.timestamp,
                play.user_id,
                play.level.as_db_str(),
                play.song_id,
                play.artist_id,
                play.session_id,
                play.location,
                play.user_agent,
            ],
        )?;
        Ok(())
    }

    fn find_song_and_artist_ids(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let result = conn
            .query_row(
                FIND_SONG_AND_ARTIST_SQL,
                params![title, artist_name, duration],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(result)
    }

    fn begin_file(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit_file(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_file(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn count_rows(&self) -> Result<RowCounts> {
        let conn = self.conn.lock().unwrap();
        Ok(RowCounts {
            songs: Self::count_table(&conn, "songs")?,
            artists: Self::count_table(&conn, "artists")?,
            time_entries: Self::count_table(&conn, "time")?,
            users: Self::count_table(&conn, "users")?,
            song_plays: Self::count_table(&conn, "songplays")?,
        })
    }
}
