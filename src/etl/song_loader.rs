use super::LoadStats;
use crate::records::{
    decode_song_file, normalize_coordinate, normalize_location, normalize_year,
};
use crate::warehouse::{Artist, Song, WarehouseStore};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load one song metadata file: one song row and one artist row.
///
/// Both inserts run unconditionally; the store's conflict clauses keep
/// re-runs over the same file idempotent.
pub fn load_song_file(store: &dyn WarehouseStore, path: &Path) -> Result<LoadStats> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read song file: {}", path.display()))?;
    let record = decode_song_file(&contents)
        .with_context(|| format!("Failed to decode song file: {}", path.display()))?;

    let song = Song {
        song_id: record.song_id.clone(),
        title: record.title,
        artist_id: record.artist_id.clone(),
        year: normalize_year(record.year),
        duration: record.duration,
    };
    store.insert_song(&song)?;

    let artist = Artist {
        artist_id: record.artist_id,
        name: record.artist_name,
        location: normalize_location(record.artist_location),
        latitude: normalize_coordinate(record.artist_latitude),
        longitude: normalize_coordinate(record.artist_longitude),
    };
    store.insert_artist(&artist)?;

    Ok(LoadStats {
        songs: 1,
        artists: 1,
        ..LoadStats::default()
    })
}
