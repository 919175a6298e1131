//! Trend scoring
//!
//! Pure functions behind the discovery feed. Everything here is
//! deterministic except the views jitter, which callers pass in.
//!
//! Score = plays + tracks * 5 - age_days * 0.1

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{ContentItem, ContentItemRecord, RankedItem, SubTrack, TrackStats};

/// Bonus per track in a project
pub const TRACK_WEIGHT: f64 = 5.0;

/// Score lost per day of age
pub const AGE_DECAY_PER_DAY: f64 = 0.1;

/// Estimated views per recorded play
pub const VIEWS_PER_PLAY: u64 = 3;

/// Views floor per track
pub const MIN_VIEWS_PER_TRACK: u64 = 10;

/// One download estimated per this many plays
pub const PLAYS_PER_DOWNLOAD: u64 = 10;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Format a length in seconds as `m:ss`. Missing or non-positive → `"0:00"`.
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            let total = secs.floor() as u64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "0:00".to_string(),
    }
}

/// Convert a catalog row into the display model
pub fn normalize_item(record: ContentItemRecord) -> ContentItem {
    ContentItem {
        id: record.id,
        title: record.title,
        owner_id: record.user_id,
        owner: record.owner,
        created_at: record.created_at,
        tracks: record
            .tracks
            .into_iter()
            .map(|track| SubTrack {
                duration: format_duration(track.duration),
                id: track.id,
                title: track.title,
                audio_url: track.audio_url,
                price: track.price,
                allow_download: track.allow_download,
            })
            .collect(),
    }
}

/// Fractional days between `created_at` and `now`, never negative
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).max(0.0)
}

/// Sum of the play counters of every track in `item`
pub fn total_plays(item: &ContentItem, counts: &HashMap<String, u64>) -> u64 {
    item.tracks
        .iter()
        .map(|track| counts.get(&track.id).copied().unwrap_or(0))
        .fold(0u64, u64::saturating_add)
}

pub fn compute_stats(plays: u64, track_count: usize, views_jitter: u64) -> TrackStats {
    let views_floor = (track_count as u64).saturating_mul(MIN_VIEWS_PER_TRACK);
    let views = plays
        .saturating_mul(VIEWS_PER_PLAY)
        .saturating_add(views_jitter)
        .max(views_floor);

    TrackStats {
        plays,
        views,
        downloads: plays / PLAYS_PER_DOWNLOAD,
    }
}

pub fn trend_score(plays: u64, track_count: usize, age_days: f64) -> f64 {
    plays as f64 + track_count as f64 * TRACK_WEIGHT - age_days * AGE_DECAY_PER_DAY
}

/// Score every item. `jitter` is asked once per item for the views term.
pub fn score_items<F>(
    items: Vec<ContentItem>,
    counts: &HashMap<String, u64>,
    now: DateTime<Utc>,
    mut jitter: F,
) -> Vec<RankedItem>
where
    F: FnMut() -> u64,
{
    items
        .into_iter()
        .map(|item| {
            let plays = total_plays(&item, counts);
            let track_count = item.tracks.len();
            let score = trend_score(plays, track_count, age_in_days(item.created_at, now));
            let stats = compute_stats(plays, track_count, jitter());

            RankedItem { item, score, stats }
        })
        .collect()
}

/// Stable sort by score descending, then keep the first `top_n`.
///
/// Equal scores keep their input order (newest first as fetched).
pub fn rank_items(mut scored: Vec<RankedItem>, top_n: usize) -> Vec<RankedItem> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    scored
}
