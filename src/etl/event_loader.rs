use super::LoadStats;
use crate::records::decode_log_line;
use crate::warehouse::{SongPlay, TimeEntry, User, WarehouseStore};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load one activity log file: for every `NextSong` event, one time
/// entry, one user row and one playback fact, in the file's natural
/// order. A file with no `NextSong` events loads successfully with
/// zero rows.
pub fn load_event_file(store: &dyn WarehouseStore, path: &Path) -> Result<LoadStats> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file: {}", path.display()))?;

    let mut stats = LoadStats::default();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event = decode_log_line(line)
            .with_context(|| format!("Failed to decode event: {}:{}", path.display(), index + 1))?;
        if !event.is_next_song() {
            continue;
        }
        let playback = event
            .into_playback()
            .with_context(|| format!("Invalid playback event: {}:{}", path.display(), index + 1))?;

        let entry = TimeEntry::from_timestamp_ms(playback.ts)
            .with_context(|| format!("Event timestamp out of range: {}", playback.ts))?;
        store.insert_time_entry(&entry)?;
        stats.time_entries += 1;

        store.insert_user(&User {
            user_id: playback.user_id.clone(),
            first_name: playback.first_name,
            last_name: playback.last_name,
            gender: playback.gender,
            level: playback.level,
        })?;
        stats.users += 1;

        let ids =
            store.find_song_and_artist_ids(&playback.song, &playback.artist, playback.length)?;
        let (song_id, artist_id) = match ids {
            Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
            None => (None, None),
        };
        store.insert_song_play(&SongPlay {
            timestamp: playback.ts,
            user_id: playback.user_id,
            level: playback.level,
            song_id,
            artist_id,
            session_id: playback.session_id,
            location: playback.location,
            user_agent: playback.user_agent,
        })?;
        stats.song_plays += 1;
    }

    Ok(stats)
}
