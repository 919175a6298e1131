use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner profile embedded in a catalog project row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Audio track row as returned by the catalog backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubTrackRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub allow_download: bool,
}

/// Project row with its owner profile and tracks eagerly joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItemRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, rename = "profiles")]
    pub owner: Option<OwnerProfile>,
    #[serde(default, rename = "audio_tracks")]
    pub tracks: Vec<SubTrackRecord>,
}

/// Track with its duration normalized for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTrack {
    pub id: String,
    pub title: String,
    pub audio_url: Option<String>,
    /// `m:ss`, `"0:00"` when the backend has no duration
    pub duration: String,
    pub price: Option<f64>,
    pub allow_download: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerProfile>,
    pub created_at: DateTime<Utc>,
    pub tracks: Vec<SubTrack>,
}

/// Synthesized statistics shown next to a ranked item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    pub plays: u64,
    pub views: u64,
    pub downloads: u64,
}

/// Content item decorated with its trend score, rebuilt on every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub score: f64,
    pub stats: TrackStats,
}
