//! End-to-end tests for the warehouse ETL pipeline.
//!
//! Each test builds a small data tree in a temp directory, runs the
//! batch driver against a file-backed warehouse, then verifies the
//! persisted rows through a separate SQLite connection.

use playvault_etl::{load_event_file, load_song_file, run_batch, SqliteWarehouseStore};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SONG_FULL: &str = r#"{"num_songs":1,"song_id":"SONSKXP12A8C13A2C9","title":"Native Soul","artist_id":"AR0IAWL1187B9A96D0","year":2003,"duration":197.19791,"artist_name":"Danilo Perez","artist_location":"Panama","artist_latitude":8.4177,"artist_longitude":-80.11278}"#;

const SONG_SPARSE: &str = r#"{"song_id":"S1","title":"T","artist_id":"A1","year":0,"duration":1.0,"artist_name":"N","artist_location":"","artist_latitude":null,"artist_longitude":null}"#;

const PLAYBACK_TS: i64 = 1541214747796;

struct Fixture {
    _dir: TempDir,
    db_path: PathBuf,
    song_root: PathBuf,
    log_root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let song_root = dir.path().join("song_data");
        let log_root = dir.path().join("log_data");
        fs::create_dir(&song_root).unwrap();
        fs::create_dir(&log_root).unwrap();
        Fixture {
            db_path: dir.path().join("warehouse.db"),
            song_root,
            log_root,
            _dir: dir,
        }
    }

    fn store(&self) -> SqliteWarehouseStore {
        SqliteWarehouseStore::open(&self.db_path).unwrap()
    }

    fn db(&self) -> Connection {
        Connection::open(&self.db_path).unwrap()
    }
}

fn write_file(root: &Path, name: &str, contents: &str) {
    fs::write(root.join(name), contents).unwrap();
}

fn next_song_line(ts: i64, user_id: &str, level: &str, song: &str, artist: &str, length: f64) -> String {
    format!(
        r#"{{"artist":"{artist}","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":1,"lastName":"Summers","length":{length},"level":"{level}","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"{song}","status":200,"ts":{ts},"userId":"{user_id}"}}"#
    )
}

fn home_line(ts: i64, user_id: &str) -> String {
    format!(
        r#"{{"artist":null,"auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":0,"lastName":"Summers","length":null,"level":"free","location":null,"method":"GET","page":"Home","registration":1540344794796.0,"sessionId":139,"song":null,"status":200,"ts":{ts},"userId":"{user_id}"}}"#
    )
}

// =============================================================================
// Song batch
// =============================================================================

#[test]
fn sparse_song_file_persists_nulls() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "sparse.json", SONG_SPARSE);

    let store = fx.store();
    let report = run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    assert_eq!(report.loaded, 1);
    drop(store);

    let db = fx.db();
    let (year, duration): (Option<i32>, f64) = db
        .query_row(
            "SELECT year, duration FROM songs WHERE song_id = 'S1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(year, None);
    assert_eq!(duration, 1.0);

    let (location, latitude, longitude): (Option<String>, Option<f64>, Option<f64>) = db
        .query_row(
            "SELECT location, latitude, longitude FROM artists WHERE artist_id = 'A1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(location, None);
    assert_eq!(latitude, None);
    assert_eq!(longitude, None);
}

#[test]
fn full_song_file_persists_all_fields() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "full.json", SONG_FULL);

    let store = fx.store();
    run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    drop(store);

    let db = fx.db();
    let year: i32 = db
        .query_row(
            "SELECT year FROM songs WHERE song_id = 'SONSKXP12A8C13A2C9'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(year, 2003);
    let (name, location): (String, String) = db
        .query_row(
            "SELECT name, location FROM artists WHERE artist_id = 'AR0IAWL1187B9A96D0'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "Danilo Perez");
    assert_eq!(location, "Panama");
}

#[test]
fn rerunning_the_song_batch_is_idempotent() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "full.json", SONG_FULL);

    let store = fx.store();
    run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    drop(store);

    let db = fx.db();
    let songs: i64 = db
        .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
        .unwrap();
    let artists: i64 = db
        .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
        .unwrap();
    assert_eq!(songs, 1);
    assert_eq!(artists, 1);
}

// =============================================================================
// Log batch
// =============================================================================

#[test]
fn mixed_log_file_loads_rows_only_for_playback_events() {
    let fx = Fixture::new();
    let lines = [
        home_line(PLAYBACK_TS, "8"),
        next_song_line(PLAYBACK_TS, "8", "free", "You Gotta Be", "Des'ree", 246.30812),
    ];
    write_file(&fx.log_root, "events.json", &lines.join("\n"));

    let store = fx.store();
    let report = run_batch(&store, &fx.log_root, load_event_file, true).unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.stats.song_plays, 1);
    drop(store);

    let db = fx.db();
    let (time_rows, user_rows, play_rows): (i64, i64, i64) = (
        db.query_row("SELECT COUNT(*) FROM time", [], |r| r.get(0))
            .unwrap(),
        db.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap(),
        db.query_row("SELECT COUNT(*) FROM songplays", [], |r| r.get(0))
            .unwrap(),
    );
    assert_eq!((time_rows, user_rows, play_rows), (1, 1, 1));

    // 2018-11-03 01:52:27.796 UTC: Saturday, ISO week 44
    let (hour, day, week, month, year, weekday): (i64, i64, i64, i64, i64, i64) = db
        .query_row(
            "SELECT hour, day, week, month, year, weekday FROM time WHERE timestamp = ?1",
            [PLAYBACK_TS],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                ))
            },
        )
        .unwrap();
    assert_eq!((hour, day, week, month, year, weekday), (1, 3, 44, 11, 2018, 5));
}

#[test]
fn matched_playback_references_the_dimension_pair() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "full.json", SONG_FULL);
    write_file(
        &fx.log_root,
        "events.json",
        &next_song_line(PLAYBACK_TS, "8", "paid", "Native Soul", "Danilo Perez", 197.19791),
    );

    let store = fx.store();
    run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    run_batch(&store, &fx.log_root, load_event_file, true).unwrap();
    drop(store);

    let db = fx.db();
    let (song_id, artist_id, level): (Option<String>, Option<String>, String) = db
        .query_row(
            "SELECT song_id, artist_id, level FROM songplays WHERE user_id = '8'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(song_id.as_deref(), Some("SONSKXP12A8C13A2C9"));
    assert_eq!(artist_id.as_deref(), Some("AR0IAWL1187B9A96D0"));
    assert_eq!(level, "paid");
}

#[test]
fn unmatched_playback_keeps_null_references() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "full.json", SONG_FULL);
    // Same title and artist, different duration: exact-match lookup must miss
    write_file(
        &fx.log_root,
        "events.json",
        &next_song_line(PLAYBACK_TS, "8", "free", "Native Soul", "Danilo Perez", 197.0),
    );

    let store = fx.store();
    run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    run_batch(&store, &fx.log_root, load_event_file, true).unwrap();
    drop(store);

    let db = fx.db();
    let (song_id, artist_id): (Option<String>, Option<String>) = db
        .query_row(
            "SELECT song_id, artist_id FROM songplays WHERE user_id = '8'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(song_id, None);
    assert_eq!(artist_id, None);
}

#[test]
fn user_level_follows_the_latest_event() {
    let fx = Fixture::new();
    let lines = [
        next_song_line(PLAYBACK_TS, "8", "free", "You Gotta Be", "Des'ree", 246.30812),
        next_song_line(PLAYBACK_TS + 60_000, "8", "paid", "You Gotta Be", "Des'ree", 246.30812),
    ];
    write_file(&fx.log_root, "events.json", &lines.join("\n"));

    let store = fx.store();
    run_batch(&store, &fx.log_root, load_event_file, true).unwrap();
    drop(store);

    let db = fx.db();
    let users: i64 = db
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    let level: String = db
        .query_row("SELECT level FROM users WHERE user_id = '8'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(users, 1);
    assert_eq!(level, "paid");
    // Both plays recorded even though the user row was re-inserted
    let plays: i64 = db
        .query_row("SELECT COUNT(*) FROM songplays", [], |r| r.get(0))
        .unwrap();
    assert_eq!(plays, 2);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn failure_aborts_remaining_files_when_continue_is_off() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "a.json", SONG_FULL);
    write_file(&fx.song_root, "b.json", "{ not json");
    write_file(&fx.song_root, "c.json", SONG_SPARSE);

    let store = fx.store();
    let result = run_batch(&store, &fx.song_root, load_song_file, false);
    assert!(result.is_err());
    drop(store);

    // a.json was committed before the failure; b.json and c.json are absent
    let db = fx.db();
    let mut stmt = db.prepare("SELECT song_id FROM songs ORDER BY song_id").unwrap();
    let ids: Vec<String> = stmt
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(ids, vec!["SONSKXP12A8C13A2C9".to_owned()]);
}

#[test]
fn failure_is_recorded_and_skipped_when_continue_is_on() {
    let fx = Fixture::new();
    write_file(&fx.song_root, "a.json", SONG_FULL);
    write_file(&fx.song_root, "b.json", "{ not json");
    write_file(&fx.song_root, "c.json", SONG_SPARSE);

    let store = fx.store();
    let report = run_batch(&store, &fx.song_root, load_song_file, true).unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.loaded, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("b.json"));
    drop(store);

    let db = fx.db();
    let songs: i64 = db
        .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(songs, 2);
}
