//! Album suggestions from recent listening.
//!
//! An album is suggested once enough of the user's recent plays came from
//! it while listening in some context (album, playlist, artist page).

use std::collections::HashMap;

use crate::models::{AlbumSummary, PlayHistoryItem, Suggestion};

/// Minimum plays from one album before it is suggested.
pub const DEFAULT_THRESHOLD: usize = 3;
/// How many recent plays are inspected.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Group play events by album and keep those played at least `threshold`
/// times. Albums appear in the order they were first seen.
///
/// Skipped events: no track, local files, no listening context, and
/// compilation albums.
pub fn suggest_albums(history: &[PlayHistoryItem], threshold: usize) -> Vec<Suggestion> {
    let mut order: Vec<AlbumSummary> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for item in history {
        let Some(track) = item.track.as_ref() else {
            continue;
        };
        if track.is_local || item.context.is_none() || track.album.is_compilation() {
            continue;
        }
        let Some(album) = AlbumSummary::from_album(&track.album) else {
            continue;
        };

        let count = counts.entry(album.id.clone()).or_insert(0);
        if *count == 0 {
            order.push(album);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|album| {
            let play_count = counts.get(&album.id).copied().unwrap_or(0);
            (play_count >= threshold).then(|| Suggestion {
                reason: format!("You played tracks from this album {play_count} times recently"),
                play_count,
                album,
            })
        })
        .collect()
}
