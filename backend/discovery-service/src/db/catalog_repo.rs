/// Catalog Repository
///
/// Read-only access to the hosted catalog backend (projects, tracks and
/// play counters) over its PostgREST API.
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::CatalogConfig;
use crate::error::{AppError, Result};
use crate::models::ContentItemRecord;

const PROJECT_SELECT: &str = "id,title,user_id,created_at,is_public,\
profiles(username,display_name,avatar_url),\
audio_tracks(id,title,audio_url,duration,price,allow_download)";

/// Keeps `in.(...)` filters well under common URL length limits.
const COUNTER_BATCH_SIZE: usize = 150;

/// Query collaborator used by the trending aggregator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Up to `limit` public items, newest first, with owner and tracks joined.
    async fn list_public_items(&self, limit: usize) -> Result<Vec<ContentItemRecord>>;

    /// Summed play counters per track id. Ids without counters are absent.
    async fn sum_engagement_counters(
        &self,
        track_ids: &HashSet<String>,
    ) -> Result<HashMap<String, u64>>;
}

/// Row of the `track_plays` table
#[derive(Debug, Clone, Deserialize)]
pub struct CounterRow {
    pub track_id: String,
    #[serde(default)]
    pub play_count: Option<i64>,
}

/// Fold counter rows into per-track totals. Negative values count as zero.
pub fn sum_counter_rows(rows: impl IntoIterator<Item = CounterRow>) -> HashMap<String, u64> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for row in rows {
        let value = row.play_count.unwrap_or(0).max(0) as u64;
        let total = totals.entry(row.track_id).or_insert(0);
        *total = total.saturating_add(value);
    }
    totals
}

/// Render ids as a PostgREST `in` filter value: `in.("a","b")`
fn in_filter<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
    let quoted: Vec<String> = ids
        .into_iter()
        .map(|id| format!("\"{}\"", id.replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// PostgREST-backed catalog source
pub struct RestCatalogSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestCatalogSource {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout() + Duration::from_millis(500))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn get_rows<T>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Catalog query on {} failed: {} {}", table, status, body);
            return Err(AppError::DataSource(format!(
                "{} query returned {}",
                table, status
            )));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CatalogSource for RestCatalogSource {
    async fn list_public_items(&self, limit: usize) -> Result<Vec<ContentItemRecord>> {
        let query = [
            ("select", PROJECT_SELECT.to_string()),
            ("is_public", "eq.true".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];

        let items: Vec<ContentItemRecord> = self.get_rows("projects", &query).await?;
        debug!("Fetched {} public projects", items.len());
        Ok(items)
    }

    async fn sum_engagement_counters(
        &self,
        track_ids: &HashSet<String>,
    ) -> Result<HashMap<String, u64>> {
        let ids: Vec<&String> = track_ids.iter().collect();
        let mut rows: Vec<CounterRow> = Vec::new();

        for chunk in ids.chunks(COUNTER_BATCH_SIZE) {
            let query = [
                ("select", "track_id,play_count".to_string()),
                ("track_id", in_filter(chunk.iter().copied())),
            ];
            let mut batch: Vec<CounterRow> = self.get_rows("track_plays", &query).await?;
            rows.append(&mut batch);
        }

        debug!(
            "Fetched {} counter rows for {} tracks",
            rows.len(),
            track_ids.len()
        );
        Ok(sum_counter_rows(rows))
    }
}
